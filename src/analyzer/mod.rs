pub mod fallback;
pub mod scoring;

pub use scoring::Category;

use crate::interval::{self, Interval, IntervalSet};
use crate::key::KeyContext;
use crate::pitch::{Pitch, parse_note};
use crate::tables::Tables;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// One ranked chord interpretation. Ephemeral: produced per call, filtered
/// by the caller's threshold, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ChordCandidate {
    /// Formatted display name, e.g. "C Maj7 (Closed)" or "Eb m9 / G (Open)".
    pub name: String,
    pub root_pc: u8,
    pub quality: String,
    pub bass_pc: u8,
    pub category: Category,
    /// Confidence on a 0-100 scale.
    pub score: i32,
    pub notes: Vec<Pitch>,
}

/// Closed voicings sit within an octave; anything wider is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Voicing {
    Closed,
    Open,
}

impl fmt::Display for Voicing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Full multi-phase analysis of one note set.
#[derive(Debug, Clone, Serialize)]
pub struct ChordAnalysis {
    pub bass_pc: u8,
    pub bass_name: String,
    pub voicing: Voicing,
    pub notes: Vec<Pitch>,
    candidates: Vec<ChordCandidate>,
}

impl ChordAnalysis {
    /// Candidates of one category, in insertion (phase) order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &ChordCandidate> {
        self.candidates
            .iter()
            .filter(move |c| c.category == category)
    }

    /// All candidates at or above `threshold`, ranked by score descending.
    /// Ties keep insertion order within a category, and categories are
    /// visited in fixed priority order.
    pub fn ranked(&self, threshold: i32) -> Vec<&ChordCandidate> {
        let mut out: Vec<&ChordCandidate> = Vec::new();
        for category in Category::ALL {
            out.extend(self.in_category(category).filter(|c| c.score >= threshold));
        }
        out.sort_by_key(|c| std::cmp::Reverse(c.score));
        out
    }

    /// The single best interpretation, if any cleared the threshold.
    pub fn best(&self, threshold: i32) -> Option<&ChordCandidate> {
        self.ranked(threshold).first().copied()
    }
}

/// The multi-strategy candidate search engine. Holds only shared read-only
/// tables; every call builds fresh collections, so one analyzer may serve
/// concurrent callers.
pub struct ChordAnalyzer<'t> {
    tables: &'t Tables,
}

impl ChordAnalyzer<'static> {
    pub fn new() -> ChordAnalyzer<'static> {
        ChordAnalyzer::with_tables(Tables::builtin())
    }
}

impl Default for ChordAnalyzer<'static> {
    fn default() -> Self {
        ChordAnalyzer::new()
    }
}

impl<'t> ChordAnalyzer<'t> {
    pub fn with_tables(tables: &'t Tables) -> ChordAnalyzer<'t> {
        ChordAnalyzer { tables }
    }

    /// Run all four search phases over a note set. Returns `None` for an
    /// empty input.
    pub fn analyze(&self, notes: &[Pitch], key: &KeyContext) -> Option<ChordAnalysis> {
        if notes.is_empty() {
            return None;
        }

        let mut sorted: Vec<Pitch> = notes.to_vec();
        sorted.sort_by_key(Pitch::absolute_semitone);
        let bass = sorted[0];
        let spread = sorted.last().unwrap().absolute_semitone() - bass.absolute_semitone();

        let input = SearchInput {
            bass,
            bass_name: key.note_name(bass.pitch_class()).to_string(),
            voicing: if spread > 12 {
                Voicing::Open
            } else {
                Voicing::Closed
            },
            input_pcs: sorted.iter().map(Pitch::pitch_class).collect(),
            unique: unique_by_pitch_class(&sorted),
            sorted,
        };

        let mut candidates = Vec::new();
        self.search_dictionary(&input, key, &mut candidates);
        self.search_rootless(&input, key, &mut candidates);
        self.search_upper_structure(&input, key, &mut candidates);
        self.search_fallback(&input, key, &mut candidates);

        log::debug!(
            "{} candidates for [{}]",
            candidates.len(),
            input
                .sorted
                .iter()
                .map(Pitch::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Some(ChordAnalysis {
            bass_pc: input.bass.pitch_class(),
            bass_name: input.bass_name,
            voicing: input.voicing,
            notes: input.sorted,
            candidates,
        })
    }

    /// Convenience wrapper: analyze and keep only the best interpretation.
    pub fn best_interpretation(
        &self,
        notes: &[Pitch],
        key: &KeyContext,
        threshold: i32,
    ) -> Option<ChordCandidate> {
        self.analyze(notes, key)?.best(threshold).cloned()
    }

    /// Phase 1: every present pitch class as a candidate root; exact
    /// dictionary lookup, then an omit-5 retry with a synthesized P5.
    fn search_dictionary(
        &self,
        input: &SearchInput,
        key: &KeyContext,
        out: &mut Vec<ChordCandidate>,
    ) {
        for &(root_pc, cand) in &input.unique {
            let root = dummy_root(cand, input.bass);
            let Some(intervals) = interval_set(root, &input.sorted) else {
                continue;
            };
            let root_name = key.note_name(root_pc);
            let is_root_pos = root_pc == input.bass.pitch_class();

            if let Some(quality) = self.tables.chords.lookup(&intervals) {
                let category = scoring::categorize(
                    is_root_pos,
                    false,
                    quality,
                    root_pc,
                    input.bass.pitch_class(),
                );
                let (score, name) = if category == Category::Special {
                    (75, format!("{quality} on {}", input.bass_name))
                } else if is_root_pos {
                    (80, format!("{root_name} {quality}"))
                } else {
                    let penalty = scoring::inversion_penalty(scoring::bass_interval(
                        root_pc,
                        input.bass.pitch_class(),
                    ));
                    (
                        80 - penalty,
                        format!("{root_name} {quality} / {}", input.bass_name),
                    )
                };
                out.push(input.candidate(root_pc, quality, category, score, name));
                continue;
            }

            // Omit-5 retry at a reduced base score
            if !intervals.contains(&p5()) {
                let mut with_p5 = intervals.clone();
                with_p5.insert(p5());
                if let Some(quality) = self.tables.chords.lookup(&with_p5) {
                    let category = scoring::categorize(
                        is_root_pos,
                        false,
                        quality,
                        root_pc,
                        input.bass.pitch_class(),
                    );
                    let (score, name) = if is_root_pos {
                        (65, format!("{root_name} {quality}(omit5)"))
                    } else {
                        let penalty = scoring::inversion_penalty(scoring::bass_interval(
                            root_pc,
                            input.bass.pitch_class(),
                        ));
                        (
                            65 - penalty,
                            format!("{root_name} {quality}(omit5) / {}", input.bass_name),
                        )
                    };
                    out.push(input.candidate(root_pc, quality, category, score, name));
                }
            }
        }
    }

    /// Phase 2: phantom roots over the absent pitch classes. Only extended
    /// or diminished qualities are meaningful without an audible root.
    fn search_rootless(
        &self,
        input: &SearchInput,
        key: &KeyContext,
        out: &mut Vec<ChordCandidate>,
    ) {
        for phantom_pc in 0..12u8 {
            if input.input_pcs.contains(&phantom_pc) {
                continue;
            }
            let Ok(spelled) = parse_note(key.note_name(phantom_pc), input.bass.octave) else {
                continue;
            };
            let root = dummy_root(spelled, input.bass);

            let Some(mut intervals) = interval_set(root, &input.sorted) else {
                continue;
            };
            intervals.insert(p1());

            let mut is_omit5 = false;
            let mut quality = self.tables.chords.lookup(&intervals);
            if quality.is_none() && !intervals.contains(&p5()) {
                let mut with_p5 = intervals.clone();
                with_p5.insert(p5());
                quality = self.tables.chords.lookup(&with_p5);
                is_omit5 = quality.is_some();
            }

            let Some(quality) = quality else { continue };
            if !["7", "9", "11", "13", "dim"]
                .iter()
                .any(|ext| quality.contains(ext))
            {
                // A rootless plain triad is indistinguishable from noise
                continue;
            }

            let mut score = 30;
            if quality.contains('9') {
                score += 10;
            }
            if quality.contains("11") {
                score += 15;
            }
            if quality.contains("13") {
                score += 20;
            }
            if is_omit5 {
                score -= 10;
            }

            let omit_str = if is_omit5 { "(omit5)" } else { "" };
            let name = format!(
                "{} {quality}{omit_str}(Rootless) / {}",
                key.note_name(phantom_pc),
                input.bass_name
            );
            out.push(input.candidate(phantom_pc, quality, Category::Rootless, score, name));
        }
    }

    /// Phase 3: upper-structure triads and polychords. Needs at least four
    /// distinct pitch classes to split into two structures.
    fn search_upper_structure(
        &self,
        input: &SearchInput,
        key: &KeyContext,
        out: &mut Vec<ChordCandidate>,
    ) {
        if input.input_pcs.len() < 4 {
            return;
        }

        // The fixed upper-triad shape list is the contract; quartal upper
        // structures are deliberately not searched.
        let triads: [(&str, [u8; 3]); 4] = [
            ("Major", [0, 4, 7]),
            ("Minor", [0, 3, 7]),
            ("Aug", [0, 4, 8]),
            ("Dim", [0, 3, 6]),
        ];

        let bottom_root_pc = input.bass.pitch_class();
        let Some(&(_, bottom_cand)) =
            input.unique.iter().find(|(pc, _)| *pc == bottom_root_pc)
        else {
            return;
        };
        let bottom_root = dummy_root(bottom_cand, input.bass);

        for &(top_pc, _) in &input.unique {
            if top_pc == bottom_root_pc {
                continue;
            }

            for (triad_name, shape) in triads {
                let top_triad: BTreeSet<u8> = shape.iter().map(|s| (top_pc + s) % 12).collect();
                if !top_triad.is_subset(&input.input_pcs) {
                    continue;
                }

                let mut bottom_pcs: BTreeSet<u8> =
                    input.input_pcs.difference(&top_triad).copied().collect();
                bottom_pcs.insert(bottom_root_pc);

                let Some(bottom) = bottom_intervals(bottom_root, &bottom_pcs, &input.sorted)
                else {
                    continue;
                };
                let Some(bottom_quality) = lower_quality(&bottom) else {
                    continue;
                };

                let top_name = key.note_name(top_pc);
                let top_chord_name = if triad_name == "Major" {
                    top_name.to_string()
                } else {
                    format!("{top_name} {triad_name}")
                };
                let ust_name = format!(
                    "{top_chord_name} / {}{bottom_quality}",
                    key.note_name(bottom_root_pc)
                );

                let mut score = 70;
                let root_diff = (i32::from(top_pc) - i32::from(bottom_root_pc)).rem_euclid(12);
                if matches!(root_diff, 2 | 3 | 6 | 9) && matches!(triad_name, "Major" | "Minor") {
                    score += 15;
                }
                if matches!(triad_name, "Aug" | "Dim") {
                    score -= 10;
                }

                if out
                    .iter()
                    .filter(|c| c.category == Category::Special)
                    .any(|c| c.name.starts_with(&ust_name))
                {
                    continue;
                }
                out.push(input.candidate(
                    bottom_root_pc,
                    bottom_quality,
                    Category::Special,
                    score,
                    format!("{ust_name} (UST)"),
                ));
            }
        }
    }

    /// Phase 4: rule-based generation for interval sets the dictionary
    /// misses even with a synthesized 5th.
    fn search_fallback(
        &self,
        input: &SearchInput,
        key: &KeyContext,
        out: &mut Vec<ChordCandidate>,
    ) {
        for &(root_pc, cand) in &input.unique {
            let root = dummy_root(cand, input.bass);
            let Some(intervals) = interval_set(root, &input.sorted) else {
                continue;
            };

            if self.tables.chords.lookup(&intervals).is_some() {
                continue;
            }
            if !intervals.contains(&p5()) {
                let mut with_p5 = intervals.clone();
                with_p5.insert(p5());
                if self.tables.chords.lookup(&with_p5).is_some() {
                    continue;
                }
            }

            let root_name = key.note_name(root_pc);
            let is_root_pos = root_pc == input.bass.pitch_class();

            for quality in fallback::generate_names(&intervals) {
                // Keep only tension spellings and marked augmented names
                if !quality.contains('(') && !quality.contains("aug") {
                    continue;
                }
                let category = scoring::categorize(
                    is_root_pos,
                    false,
                    &quality,
                    root_pc,
                    input.bass.pitch_class(),
                );

                let mut score = if is_root_pos { 55 } else { 35 };
                if quality.contains('(') && !quality.contains("omit5") {
                    score += (quality.matches(',').count() as i32 + 1) * 5;
                }

                let name = if is_root_pos {
                    format!("{root_name} {quality}")
                } else {
                    format!("{root_name} {quality} / {}", input.bass_name)
                };

                if out
                    .iter()
                    .filter(|c| c.category == category)
                    .any(|c| c.name.starts_with(&name))
                {
                    continue;
                }
                out.push(ChordCandidate {
                    name: format!("{name} ({}) [generated]", input.voicing),
                    root_pc,
                    quality,
                    bass_pc: input.bass.pitch_class(),
                    category,
                    score,
                    notes: input.sorted.clone(),
                });
            }
        }
    }
}

/// Per-call search context shared by all phases.
struct SearchInput {
    sorted: Vec<Pitch>,
    bass: Pitch,
    bass_name: String,
    voicing: Voicing,
    input_pcs: BTreeSet<u8>,
    /// One representative note per pitch class, ordered by first
    /// occurrence; re-occurrences keep the highest spelling.
    unique: Vec<(u8, Pitch)>,
}

impl SearchInput {
    fn candidate(
        &self,
        root_pc: u8,
        quality: &str,
        category: Category,
        score: i32,
        name: String,
    ) -> ChordCandidate {
        ChordCandidate {
            name: format!("{name} ({})", self.voicing),
            root_pc,
            quality: quality.to_string(),
            bass_pc: self.bass.pitch_class(),
            category,
            score,
            notes: self.sorted.clone(),
        }
    }
}

fn p1() -> Interval {
    "P1".parse().unwrap()
}

fn p5() -> Interval {
    "P5".parse().unwrap()
}

fn unique_by_pitch_class(sorted: &[Pitch]) -> Vec<(u8, Pitch)> {
    let mut unique: Vec<(u8, Pitch)> = Vec::new();
    for &note in sorted {
        let pc = note.pitch_class();
        match unique.iter_mut().find(|(existing, _)| *existing == pc) {
            Some(entry) => entry.1 = note,
            None => unique.push((pc, note)),
        }
    }
    unique
}

/// Place a candidate root spelling at or below the bass note's octave.
fn dummy_root(cand: Pitch, bass: Pitch) -> Pitch {
    let root = Pitch::new(cand.step, cand.alter, bass.octave);
    if root.absolute_semitone() > bass.absolute_semitone() {
        root.octave_down()
    } else {
        root
    }
}

/// Interval labels of every note relative to the root. `None` when some
/// pair has no diatonic name (mixed enharmonic spellings against a phantom
/// or exotic root); that interpretation is skipped rather than mislabeled.
fn interval_set(root: Pitch, notes: &[Pitch]) -> Option<IntervalSet> {
    let mut set = IntervalSet::new();
    for &note in notes {
        match interval::between(root, note) {
            Ok(iv) => {
                set.insert(iv);
            }
            Err(e) => {
                log::debug!("Skipping root {root}: {e}");
                return None;
            }
        }
    }
    Some(set)
}

/// Interval content of the lower structure, with extensions folded back
/// into one octave.
fn bottom_intervals(
    bottom_root: Pitch,
    bottom_pcs: &BTreeSet<u8>,
    sorted: &[Pitch],
) -> Option<IntervalSet> {
    let mut set = IntervalSet::new();
    for &pc in bottom_pcs {
        let note = sorted.iter().find(|n| n.pitch_class() == pc)?;
        match interval::between(bottom_root, *note) {
            Ok(iv) => {
                set.insert(iv.reduced());
            }
            Err(e) => {
                log::debug!("Skipping lower structure on {bottom_root}: {e}");
                return None;
            }
        }
    }
    Some(set)
}

/// Simplified lower-structure quality from its folded interval content.
fn lower_quality(intervals: &IntervalSet) -> Option<&'static str> {
    let has = |s: &str| intervals.contains(&s.parse::<Interval>().unwrap());
    if has("M3") && has("m7") {
        Some("7")
    } else if has("m3") && has("d5") && has("m7") {
        Some("m7b5")
    } else if has("m3") && has("m7") {
        Some("m7")
    } else if has("M3") && has("M7") {
        Some("Maj7")
    } else if has("M3") {
        Some("")
    } else if has("m3") {
        Some("m")
    } else {
        None
    }
}
