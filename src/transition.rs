use crate::cadence::{CadenceEvaluator, CadenceOutcome};
use crate::degree;
use crate::key::KeyContext;
use crate::pitch::Pitch;
use crate::tables::Tables;
use serde::Serialize;

/// Starting smoothness before displacement penalties and common-tone bonuses.
const SMOOTHNESS_BASE: i32 = 80;

/// One pairing in the voice-leading map. `semitones` is the signed motion;
/// a `from`-only entry disappears, a `to`-only entry appears.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceMove {
    pub from: Option<Pitch>,
    pub to: Option<Pitch>,
    pub semitones: Option<i32>,
}

impl VoiceMove {
    pub fn is_common_tone(&self) -> bool {
        self.semitones == Some(0)
    }

    /// Human-readable motion: "Up M2", "Down m3 + 1 octave", "Common Tone".
    pub fn movement_label(&self) -> String {
        let Some(diff) = self.semitones else {
            return match (&self.from, &self.to) {
                (None, Some(_)) => "Appears".to_string(),
                _ => "Disappears".to_string(),
            };
        };
        if diff == 0 {
            let enharmonic = match (&self.from, &self.to) {
                (Some(a), Some(b)) => a.step != b.step,
                _ => false,
            };
            return if enharmonic {
                "Common Tone (enharmonic)".to_string()
            } else {
                "Common Tone".to_string()
            };
        }

        let direction = if diff > 0 { "Up" } else { "Down" };
        let abs = diff.abs();
        let name = semitone_interval_name(abs % 12);
        if abs / 12 > 0 {
            format!("{direction} {name} + {} octave", abs / 12)
        } else {
            format!("{direction} {name}")
        }
    }
}

fn semitone_interval_name(semitones: i32) -> &'static str {
    match semitones {
        0 => "Octave",
        1 => "m2",
        2 => "M2",
        3 => "m3",
        4 => "M3",
        5 => "P4",
        6 => "Tritone",
        7 => "P5",
        8 => "m6",
        9 => "M6",
        10 => "m7",
        _ => "M7",
    }
}

/// Note-to-note motion map between two chords, with its smoothness score.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceLeading {
    pub moves: Vec<VoiceMove>,
    pub common_tones: usize,
    pub total_movement: i32,
    pub smoothness: i32,
}

/// Pair the notes of chord A against chord B: exact absolute-pitch matches
/// first (common tones, enharmonic spellings included), then each remaining
/// B note greedily takes the nearest remaining A note by semitone distance.
/// The greedy order is part of the scoring contract, not an optimal
/// assignment.
pub fn match_voices(notes_a: &[Pitch], notes_b: &[Pitch]) -> VoiceLeading {
    let mut unmatched_a: Vec<Pitch> = notes_a.to_vec();
    let mut moves: Vec<VoiceMove> = Vec::new();

    // Pass 1: common tones by exact absolute pitch
    let mut leftover_b: Vec<Pitch> = Vec::new();
    for &nb in notes_b {
        if let Some(pos) = unmatched_a
            .iter()
            .position(|na| na.absolute_semitone() == nb.absolute_semitone())
        {
            let na = unmatched_a.remove(pos);
            moves.push(VoiceMove {
                from: Some(na),
                to: Some(nb),
                semitones: Some(0),
            });
        } else {
            leftover_b.push(nb);
        }
    }

    // Pass 2: nearest remaining source note, greedily per destination
    for nb in leftover_b {
        if unmatched_a.is_empty() {
            moves.push(VoiceMove {
                from: None,
                to: Some(nb),
                semitones: None,
            });
            continue;
        }
        let (pos, _) = unmatched_a
            .iter()
            .enumerate()
            .min_by_key(|(_, na)| (na.absolute_semitone() - nb.absolute_semitone()).abs())
            .unwrap();
        let na = unmatched_a.remove(pos);
        moves.push(VoiceMove {
            from: Some(na),
            to: Some(nb),
            semitones: Some(nb.absolute_semitone() - na.absolute_semitone()),
        });
    }

    // Anything left in A simply disappears
    for na in unmatched_a {
        moves.push(VoiceMove {
            from: Some(na),
            to: None,
            semitones: None,
        });
    }

    let common_tones = moves.iter().filter(|m| m.is_common_tone()).count();
    let total_movement: i32 = moves
        .iter()
        .filter_map(|m| m.semitones)
        .map(i32::abs)
        .sum();
    let smoothness = SMOOTHNESS_BASE - total_movement * 2 + common_tones as i32 * 10;

    VoiceLeading {
        moves,
        common_tones,
        total_movement,
        smoothness,
    }
}

/// Full report for one chord-to-chord transition: degree motion, cadence
/// evaluation, voice leading, and the combined score.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionReport {
    pub key_name: String,
    pub chord_a: String,
    pub chord_b: String,
    pub degree_a: String,
    pub degree_b: String,
    pub cadence: CadenceOutcome,
    pub voice_leading: VoiceLeading,
    /// Smoothness plus the cadence bonus.
    pub score: i32,
}

/// Combines the cadence evaluator and voice-leading matcher per chord pair.
pub struct TransitionAnalyzer<'t> {
    cadences: CadenceEvaluator<'t>,
}

impl TransitionAnalyzer<'static> {
    pub fn new() -> TransitionAnalyzer<'static> {
        TransitionAnalyzer::with_tables(Tables::builtin())
    }
}

impl Default for TransitionAnalyzer<'static> {
    fn default() -> Self {
        TransitionAnalyzer::new()
    }
}

impl<'t> TransitionAnalyzer<'t> {
    pub fn with_tables(tables: &'t Tables) -> TransitionAnalyzer<'t> {
        TransitionAnalyzer {
            cadences: CadenceEvaluator::with_tables(tables),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn analyze(
        &self,
        root_a_pc: u8,
        quality_a: &str,
        notes_a: &[Pitch],
        root_b_pc: u8,
        quality_b: &str,
        notes_b: &[Pitch],
        key: &KeyContext,
    ) -> TransitionReport {
        let cadence = self
            .cadences
            .evaluate(root_a_pc, quality_a, root_b_pc, quality_b, key);
        let mut voice_leading = match_voices(notes_a, notes_b);

        // Present high-to-low, the way a score reads
        voice_leading.moves.sort_by_key(|m| {
            std::cmp::Reverse(
                m.to.or(m.from)
                    .map(|p| p.absolute_semitone())
                    .unwrap_or(i32::MIN),
            )
        });

        let score = voice_leading.smoothness + cadence.bonus();
        TransitionReport {
            key_name: key.name().to_string(),
            chord_a: format!("{}{}", key.note_name(root_a_pc), quality_a),
            chord_b: format!("{}{}", key.note_name(root_b_pc), quality_b),
            degree_a: degree::to_degree(root_a_pc, quality_a, key, None),
            degree_b: degree::to_degree(root_b_pc, quality_b, key, None),
            cadence,
            voice_leading,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::parse_notes;

    fn notes(s: &str) -> Vec<Pitch> {
        parse_notes(s, 4).unwrap()
    }

    #[test]
    fn test_identical_chords_are_all_common_tones() {
        let a = notes("C4, E4, G4");
        let vl = match_voices(&a, &a);
        assert_eq!(vl.common_tones, 3);
        assert_eq!(vl.total_movement, 0);
        assert_eq!(vl.smoothness, 80 + 30);
    }

    #[test]
    fn test_enharmonic_common_tone() {
        // Eb4 and D#4 share an absolute pitch: common tone, flagged enharmonic
        let vl = match_voices(&notes("C4, Eb4, G4"), &notes("B3, D#4, G4"));
        assert_eq!(vl.common_tones, 2);
        let enh = vl
            .moves
            .iter()
            .find(|m| m.movement_label().contains("enharmonic"));
        assert!(enh.is_some());
    }

    #[test]
    fn test_common_tones_are_octave_sensitive() {
        // C4 vs C5: same pitch class but different octave, not a common tone
        let vl = match_voices(&notes("C4"), &notes("C5"));
        assert_eq!(vl.common_tones, 0);
        assert_eq!(vl.total_movement, 12);
    }

    #[test]
    fn test_greedy_nearest_matching() {
        // G4 -> A4 (up 2), C4 -> B3 (down 1)
        let vl = match_voices(&notes("C4, G4"), &notes("B3, A4"));
        assert_eq!(vl.total_movement, 3);
        assert_eq!(vl.smoothness, 80 - 6);
        let labels: Vec<String> = vl.moves.iter().map(|m| m.movement_label()).collect();
        assert!(labels.contains(&"Down m2".to_string()));
        assert!(labels.contains(&"Up M2".to_string()));
    }

    #[test]
    fn test_appearing_and_disappearing_notes() {
        let vl = match_voices(&notes("C4, E4, G4, B4"), &notes("C4, E4"));
        let disappears = vl.moves.iter().filter(|m| m.to.is_none()).count();
        assert_eq!(disappears, 2);

        let vl = match_voices(&notes("C4"), &notes("C4, E4, G4"));
        let appears = vl.moves.iter().filter(|m| m.from.is_none()).count();
        assert_eq!(appears, 2);
    }

    #[test]
    fn test_octave_leap_label() {
        let vl = match_voices(&notes("C4"), &notes("E5"));
        assert_eq!(vl.moves[0].movement_label(), "Up M3 + 1 octave");
    }

    #[test]
    fn test_transition_report_combines_scores() {
        // G7 -> C: authentic cadence on top of the voice-leading smoothness
        let key = KeyContext::new("C").unwrap();
        let a = notes("G3, B3, D4, F4");
        let b = notes("C4, E4, G4, C5");
        let report =
            TransitionAnalyzer::new().analyze(7, "7", &a, 0, "Major", &b, &key);
        assert_eq!(report.degree_a, "V7");
        assert_eq!(report.degree_b, "I");
        assert_eq!(report.cadence.primary.name, "Authentic Cadence");
        assert_eq!(report.score, report.voice_leading.smoothness + 30);
    }

    #[test]
    fn test_moves_sorted_high_to_low() {
        let key = KeyContext::new("C").unwrap();
        let report = TransitionAnalyzer::new().analyze(
            0,
            "Major",
            &notes("C4, E4, G4"),
            5,
            "Major",
            &notes("C4, F4, A4"),
            &key,
        );
        let tops: Vec<i32> = report
            .voice_leading
            .moves
            .iter()
            .filter_map(|m| m.to.or(m.from).map(|p| p.absolute_semitone()))
            .collect();
        let mut sorted = tops.clone();
        sorted.sort_by_key(|v| std::cmp::Reverse(*v));
        assert_eq!(tops, sorted);
    }
}
