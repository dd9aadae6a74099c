use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntervalError {
    /// The fixed (step, semitone) table has no entry for this pair.
    /// The table is exhaustive for diatonic spellings up to double
    /// sharp/flat, so hitting this means the two spellings are not
    /// expressible as a single diatonic interval (e.g. C# against Gb).
    #[error("No interval mapping for step difference {steps} at {semitones} semitones")]
    Unmapped { steps: i32, semitones: i32 },
    #[error("Invalid interval symbol: {0:?}")]
    BadSymbol(String),
}

/// Interval quality, diminished through augmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntervalQuality {
    Dim,
    Min,
    Perfect,
    Maj,
    Aug,
}

impl IntervalQuality {
    fn letter(self) -> char {
        match self {
            IntervalQuality::Dim => 'd',
            IntervalQuality::Min => 'm',
            IntervalQuality::Perfect => 'P',
            IntervalQuality::Maj => 'M',
            IntervalQuality::Aug => 'A',
        }
    }

    fn from_letter(c: char) -> Option<IntervalQuality> {
        match c {
            'd' => Some(IntervalQuality::Dim),
            'm' => Some(IntervalQuality::Min),
            'P' => Some(IntervalQuality::Perfect),
            'M' => Some(IntervalQuality::Maj),
            'A' => Some(IntervalQuality::Aug),
            _ => None,
        }
    }
}

/// A named interval degree, e.g. `m3`, `P5`, `A11`.
/// Degrees run 1-7 plus the octave extensions 9, 11, 13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub degree: u8,
    pub quality: IntervalQuality,
}

impl Interval {
    pub fn new(quality: IntervalQuality, degree: u8) -> Interval {
        Interval { degree, quality }
    }

    /// Fold an extended degree (9/11/13) back into one octave (2/4/6).
    pub fn reduced(self) -> Interval {
        if self.degree > 7 {
            Interval {
                degree: self.degree - 7,
                ..self
            }
        } else {
            self
        }
    }

    /// True for the tension degrees above the octave.
    pub fn is_extension(self) -> bool {
        self.degree > 7
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.quality.letter(), self.degree)
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Interval, IntervalError> {
        let mut chars = s.chars();
        let quality = chars
            .next()
            .and_then(IntervalQuality::from_letter)
            .ok_or_else(|| IntervalError::BadSymbol(s.to_string()))?;
        let degree: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| IntervalError::BadSymbol(s.to_string()))?;
        if !matches!(degree, 1..=7 | 9 | 11 | 13) {
            return Err(IntervalError::BadSymbol(s.to_string()));
        }
        Ok(Interval { degree, quality })
    }
}

impl Serialize for Interval {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Interval, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Canonical order-independent interval collection; the chord dictionary key.
pub type IntervalSet = BTreeSet<Interval>;

/// Fixed (diatonic step difference, chromatic semitones) quality table.
/// Exhaustive for diminished through augmented on degrees 1-7.
fn lookup(step_diff: i32, semitones: i32) -> Option<(IntervalQuality, u8)> {
    use IntervalQuality::*;
    let q = match (step_diff, semitones) {
        (0, 11) => (Dim, 1),
        (0, 0) => (Perfect, 1),
        (0, 1) => (Aug, 1),
        (1, 0) => (Dim, 2),
        (1, 1) => (Min, 2),
        (1, 2) => (Maj, 2),
        (1, 3) => (Aug, 2),
        (2, 2) => (Dim, 3),
        (2, 3) => (Min, 3),
        (2, 4) => (Maj, 3),
        (2, 5) => (Aug, 3),
        (3, 4) => (Dim, 4),
        (3, 5) => (Perfect, 4),
        (3, 6) => (Aug, 4),
        (4, 6) => (Dim, 5),
        (4, 7) => (Perfect, 5),
        (4, 8) => (Aug, 5),
        (5, 7) => (Dim, 6),
        (5, 8) => (Min, 6),
        (5, 9) => (Maj, 6),
        (5, 10) => (Aug, 6),
        (6, 9) => (Dim, 7),
        (6, 10) => (Min, 7),
        (6, 11) => (Maj, 7),
        (6, 0) => (Aug, 7),
        _ => return None,
    };
    Some(q)
}

/// Name the interval from `root` up to `target`, degree-exact: C4-E4 is M3
/// while C4-Fb4 is d4 even though both span four semitones. Degrees 2/4/6
/// become 9/11/13 when the unreduced distance reaches an octave or more;
/// unison/3rd/5th/7th names are indifferent to absolute octave.
pub fn between(root: Pitch, target: Pitch) -> Result<Interval, IntervalError> {
    let step_diff = (target.step.index() - root.step.index()).rem_euclid(7);
    let span = target.absolute_semitone() - root.absolute_semitone();
    let semitones = span.rem_euclid(12);

    let (quality, mut degree) = lookup(step_diff, semitones).ok_or(IntervalError::Unmapped {
        steps: step_diff,
        semitones,
    })?;

    if span >= 12 && matches!(degree, 2 | 4 | 6) {
        degree += 7;
    }

    Ok(Interval { degree, quality })
}
