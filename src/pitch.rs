use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("Invalid note format: {0:?}")]
    InvalidNoteFormat(String),
    #[error("Invalid key name: {0:?}")]
    InvalidKeyName(String),
}

/// The seven diatonic letter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Semitones above C within one octave.
    pub fn base_semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    /// Diatonic position, C=0 .. B=6.
    pub fn index(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 1,
            Step::E => 2,
            Step::F => 3,
            Step::G => 4,
            Step::A => 5,
            Step::B => 6,
        }
    }

    fn from_char(c: char) -> Option<Step> {
        match c.to_ascii_uppercase() {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A spelled pitch: letter name, accidental, octave (C4 = middle C).
/// Two pitches are pitch-equal iff their pitch classes match; they are the
/// same spelled pitch iff all three fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pitch {
    pub step: Step,
    /// Accidental: -2 (bb) ..= 2 (x).
    pub alter: i8,
    pub octave: i32,
}

impl Pitch {
    pub fn new(step: Step, alter: i8, octave: i32) -> Pitch {
        Pitch {
            step,
            alter,
            octave,
        }
    }

    /// Identity modulo octave, 0-11 with C=0.
    pub fn pitch_class(&self) -> u8 {
        (self.step.base_semitone() + i32::from(self.alter)).rem_euclid(12) as u8
    }

    /// Semitones above C0. Used to order notes by height — enharmonic
    /// spellings (D#4 / Eb4) land on the same value.
    pub fn absolute_semitone(&self) -> i32 {
        self.step.base_semitone() + i32::from(self.alter) + self.octave * 12
    }

    /// Same spelling, shifted down one octave.
    pub fn octave_down(&self) -> Pitch {
        Pitch {
            octave: self.octave - 1,
            ..*self
        }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.step, alter_str(self.alter), self.octave)
    }
}

/// Accidental suffix: "x" for double sharp, "bb" for double flat.
pub fn alter_str(alter: i8) -> &'static str {
    match alter {
        -2 => "bb",
        -1 => "b",
        1 => "#",
        2 => "x",
        _ => "",
    }
}

// Note token: letter, optional accidental, optional octave digits.
// e.g. "C4", "Eb3", "fx5", "A#", "Bbb2"
static NOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<step>[A-Ga-g])(?P<alter>bb|b|##|#|x)?(?P<octave>-?\d+)?$").unwrap()
});

fn parse_alter(s: &str) -> i8 {
    match s {
        "bb" => -2,
        "b" => -1,
        "#" => 1,
        "##" | "x" => 2,
        _ => 0,
    }
}

/// Parse a single note token like "C4", "Bb3" or "F#".
/// A token without octave digits gets `default_octave`.
pub fn parse_note(token: &str, default_octave: i32) -> Result<Pitch, NoteError> {
    let token = token.trim();
    let caps = NOTE_RE
        .captures(token)
        .ok_or_else(|| NoteError::InvalidNoteFormat(token.to_string()))?;

    let step = Step::from_char(caps["step"].chars().next().unwrap())
        .ok_or_else(|| NoteError::InvalidNoteFormat(token.to_string()))?;
    let alter = caps.name("alter").map_or(0, |m| parse_alter(m.as_str()));
    let octave = match caps.name("octave") {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| NoteError::InvalidNoteFormat(token.to_string()))?,
        None => default_octave,
    };

    Ok(Pitch::new(step, alter, octave))
}

/// Parse a comma-separated note list ("C4, E4, G4") into pitches.
///
/// Octave digits may be omitted after the first note: each omitted octave
/// continues an implicit ascending line, incrementing the running octave
/// when the pitch class wraps below the previous note's.
pub fn parse_notes(text: &str, default_octave: i32) -> Result<Vec<Pitch>, NoteError> {
    let mut notes = Vec::new();
    let mut running_octave = default_octave;
    let mut prev_pc: Option<u8> = None;

    for token in text.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let has_octave = token.chars().any(|c| c.is_ascii_digit());
        let mut pitch = parse_note(token, running_octave)?;

        if !has_octave {
            if let Some(prev) = prev_pc {
                if pitch.pitch_class() < prev {
                    running_octave += 1;
                    pitch.octave = running_octave;
                }
            }
        } else {
            running_octave = pitch.octave;
        }

        prev_pc = Some(pitch.pitch_class());
        notes.push(pitch);
    }

    Ok(notes)
}
