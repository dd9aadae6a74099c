use crate::analyzer::{ChordAnalyzer, ChordCandidate};
use crate::key::KeyContext;
use crate::pitch::Pitch;
use crate::tables::Tables;
use crate::transition::{TransitionAnalyzer, TransitionReport};
use serde::Serialize;

/// One chord slot in a progression: the input notes and the winning
/// interpretation, if any cleared the threshold.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionStep {
    pub index: usize,
    pub notes: Vec<Pitch>,
    pub chord: Option<ChordCandidate>,
}

/// Whole-progression result: per-slot interpretations plus transition
/// reports between consecutive resolved slots.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionReport {
    pub key_name: String,
    pub steps: Vec<ProgressionStep>,
    pub transitions: Vec<TransitionReport>,
}

impl ProgressionReport {
    pub fn resolved(&self) -> usize {
        self.steps.iter().filter(|s| s.chord.is_some()).count()
    }
}

/// Runs the chord analyzer over each slot and the transition analyzer over
/// each adjacent resolved pair. An unresolved slot breaks the transition
/// chain but never aborts the run.
pub struct ProgressionAnalyzer<'t> {
    chords: ChordAnalyzer<'t>,
    transitions: TransitionAnalyzer<'t>,
}

impl ProgressionAnalyzer<'static> {
    pub fn new() -> ProgressionAnalyzer<'static> {
        ProgressionAnalyzer::with_tables(Tables::builtin())
    }
}

impl Default for ProgressionAnalyzer<'static> {
    fn default() -> Self {
        ProgressionAnalyzer::new()
    }
}

impl<'t> ProgressionAnalyzer<'t> {
    pub fn with_tables(tables: &'t Tables) -> ProgressionAnalyzer<'t> {
        ProgressionAnalyzer {
            chords: ChordAnalyzer::with_tables(tables),
            transitions: TransitionAnalyzer::with_tables(tables),
        }
    }

    pub fn analyze(
        &self,
        slots: &[Vec<Pitch>],
        key: &KeyContext,
        threshold: i32,
    ) -> ProgressionReport {
        let mut steps: Vec<ProgressionStep> = Vec::with_capacity(slots.len());
        let mut transitions: Vec<TransitionReport> = Vec::new();
        // Previous resolved slot, while the chain is unbroken
        let mut prev: Option<(ChordCandidate, Vec<Pitch>)> = None;

        for (index, notes) in slots.iter().enumerate() {
            let chord = self.chords.best_interpretation(notes, key, threshold);
            if chord.is_none() {
                log::warn!("no interpretation above {threshold} for slot {index}");
            }

            if let Some(current) = &chord {
                if let Some((prev_chord, prev_notes)) = &prev {
                    transitions.push(self.transitions.analyze(
                        prev_chord.root_pc,
                        &prev_chord.quality,
                        prev_notes,
                        current.root_pc,
                        &current.quality,
                        notes,
                        key,
                    ));
                }
            }

            prev = chord.as_ref().map(|c| (c.clone(), notes.clone()));
            steps.push(ProgressionStep {
                index,
                notes: notes.clone(),
                chord,
            });
        }

        ProgressionReport {
            key_name: key.name().to_string(),
            steps,
            transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::parse_notes;

    fn slots(inputs: &[&str]) -> Vec<Vec<Pitch>> {
        inputs.iter().map(|s| parse_notes(s, 4).unwrap()).collect()
    }

    #[test]
    fn test_two_five_one() {
        let key = KeyContext::new("C").unwrap();
        let slots = slots(&[
            "D3, F3, A3, C4",
            "G2, B3, D4, F4",
            "C3, E3, G3, B3",
        ]);
        let report = ProgressionAnalyzer::new().analyze(&slots, &key, 40);
        assert_eq!(report.resolved(), 3);
        assert_eq!(report.transitions.len(), 2);
        assert_eq!(report.transitions[0].cadence.primary.name, "II-V Progression");
        assert_eq!(
            report.transitions[1].cadence.primary.name,
            "Authentic Cadence"
        );
    }

    #[test]
    fn test_shibamata_progression() {
        // Fm7, G altered dominant, Cm9, EbMaj7 in Eb. The second chord only
        // resolves through the upper-structure search, and every transition
        // still carries a named harmonic motion.
        let key = KeyContext::new("Eb").unwrap();
        let slots = slots(&[
            "F3, Ab3, C4, Eb4",
            "G3, B3, D#4, F4, A#4",
            "C3, Eb3, G3, Bb3, D4",
            "Eb3, G3, Bb3, D4",
        ]);
        let report = ProgressionAnalyzer::new().analyze(&slots, &key, 40);
        assert_eq!(report.resolved(), 4);
        assert_eq!(report.transitions.len(), 3);

        let second = report.steps[1].chord.as_ref().unwrap();
        assert!(second.name.contains("(UST)"), "got {}", second.name);
        assert_eq!(second.quality, "7");
        assert_eq!(second.root_pc, 7);

        for transition in &report.transitions {
            assert!(!transition.cadence.primary.name.is_empty());
        }
        assert_eq!(
            report.transitions[1].cadence.primary.name,
            "Secondary Dominant (III7 -> VIm)"
        );
    }

    #[test]
    fn test_unresolved_slot_breaks_the_chain() {
        // At threshold 70 the two-note slot tops out below the bar, so the
        // only transition is between the last two slots
        let key = KeyContext::new("C").unwrap();
        let slots = slots(&[
            "C4, E4, G4",
            "C4, D4",
            "G3, B3, D4, F4",
            "C4, E4, G4",
        ]);
        let report = ProgressionAnalyzer::new().analyze(&slots, &key, 70);
        assert!(report.steps[1].chord.is_none());
        assert_eq!(report.transitions.len(), 1);
        assert_eq!(
            report.transitions[0].cadence.primary.name,
            "Authentic Cadence"
        );
    }

    #[test]
    fn test_empty_progression() {
        let key = KeyContext::new("C").unwrap();
        let report = ProgressionAnalyzer::new().analyze(&[], &key, 40);
        assert!(report.steps.is_empty());
        assert!(report.transitions.is_empty());
    }
}
