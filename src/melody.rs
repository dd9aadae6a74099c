//! Melody-over-chord commentary: theoretical avoid-note rules plus an
//! acoustic pass rating the melody against every chord tone by
//! just-intonation ratio.

use crate::interval::{self, Interval};
use crate::pitch::Pitch;
use crate::tables::{ConsonanceTable, Tables};
use serde::Serialize;
use std::fmt;

/// Overall verdict for one melody note over one chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MelodyStatus {
    ChordTone,
    Avoid,
    AvailableTension,
}

impl fmt::Display for MelodyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MelodyStatus::ChordTone => "Chord Tone (most stable)",
            MelodyStatus::Avoid => "Avoid Note (steer clear)",
            MelodyStatus::AvailableTension => "Available Tension (rich color)",
        };
        f.write_str(label)
    }
}

/// Melody measured against one chord tone. The melody is lifted above the
/// chord tone before naming, so the interval always points upward.
#[derive(Debug, Clone, Serialize)]
pub struct MelodyRelation {
    pub chord_note: Pitch,
    /// `None` when the pair has no diatonic interval name.
    pub interval: Option<Interval>,
    pub ratio: Option<(u32, u32)>,
    pub ratio_name: Option<String>,
    pub dissonance: i32,
    pub warning: bool,
    /// Harsh interval accepted anyway, e.g. a b9 over a dominant root.
    pub tolerated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MelodyReport {
    pub melody: Pitch,
    pub chord_quality: String,
    pub status: MelodyStatus,
    pub theory_alert: Option<String>,
    pub acoustic_alerts: Vec<String>,
    pub total_dissonance: i32,
    pub relations: Vec<MelodyRelation>,
}

/// Rates a melody note against an identified chord.
pub struct MelodyAnalyzer<'t> {
    consonance: &'t ConsonanceTable,
}

impl MelodyAnalyzer<'static> {
    pub fn new() -> MelodyAnalyzer<'static> {
        MelodyAnalyzer::with_tables(Tables::builtin())
    }
}

impl Default for MelodyAnalyzer<'static> {
    fn default() -> Self {
        MelodyAnalyzer::new()
    }
}

impl<'t> MelodyAnalyzer<'t> {
    pub fn with_tables(tables: &'t Tables) -> MelodyAnalyzer<'t> {
        MelodyAnalyzer {
            consonance: &tables.consonance,
        }
    }

    pub fn analyze(
        &self,
        melody: Pitch,
        chord_root_pc: u8,
        chord_quality: &str,
        chord_notes: &[Pitch],
    ) -> MelodyReport {
        let quality = if chord_quality == "Minor" {
            "m"
        } else {
            chord_quality
        };
        let melody_pc = melody.pitch_class();
        let root_diff = (i32::from(melody_pc) - i32::from(chord_root_pc)).rem_euclid(12);
        let is_dominant =
            quality.contains('7') && !quality.contains("Maj") && !quality.contains("m7");

        let theory_alert = if root_diff == 5 && (quality.contains("Maj") || quality == "Major") {
            Some("Perfect 4th clashes with the major 3rd below it".to_string())
        } else if root_diff == 8 && quality.contains('m') && !quality.contains("m7b5") {
            Some("b13 clashes with the 5th of a minor chord".to_string())
        } else {
            None
        };

        let mut total_dissonance = 0;
        let mut acoustic_alerts = Vec::new();
        let mut relations = Vec::with_capacity(chord_notes.len());

        for &chord_note in chord_notes {
            // Lift the melody above the chord tone so the interval reads
            // upward from the chord
            let mut lifted = melody;
            while lifted.absolute_semitone() < chord_note.absolute_semitone() {
                lifted.octave += 1;
            }

            let iv = match interval::between(chord_note, lifted) {
                Ok(iv) => iv,
                Err(e) => {
                    log::debug!("no interval name against {chord_note}: {e}");
                    relations.push(MelodyRelation {
                        chord_note,
                        interval: None,
                        ratio: None,
                        ratio_name: None,
                        dissonance: 0,
                        warning: false,
                        tolerated: false,
                    });
                    continue;
                }
            };

            let symbol = iv.to_string();
            let info = self.consonance.get(&symbol);
            let dissonance = info.map_or(0, |i| i.dissonance);
            total_dissonance += dissonance;

            let harsh = dissonance >= 5 || symbol == "m2" || symbol == "m9";
            let tolerated = harsh
                && is_dominant
                && chord_note.pitch_class() == chord_root_pc
                && (symbol == "m2" || symbol == "m9");
            let warning = harsh && !tolerated;
            if warning {
                let ratio = info
                    .map(|i| format!(" ({}:{})", i.ratio.0, i.ratio.1))
                    .unwrap_or_default();
                acoustic_alerts.push(format!("{symbol}{ratio} against {chord_note}"));
            }

            relations.push(MelodyRelation {
                chord_note,
                interval: Some(iv),
                ratio: info.map(|i| i.ratio),
                ratio_name: info.map(|i| i.name.clone()),
                dissonance,
                warning,
                tolerated,
            });
        }

        let is_chord_tone = chord_notes.iter().any(|cn| cn.pitch_class() == melody_pc);
        let status = if is_chord_tone {
            MelodyStatus::ChordTone
        } else if theory_alert.is_some() || !acoustic_alerts.is_empty() {
            MelodyStatus::Avoid
        } else {
            MelodyStatus::AvailableTension
        };

        MelodyReport {
            melody,
            chord_quality: chord_quality.to_string(),
            status,
            theory_alert,
            acoustic_alerts,
            total_dissonance,
            relations,
        }
    }
}
