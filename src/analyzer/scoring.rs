use serde::Serialize;
use std::fmt;

/// Structural category of a chord candidate, in report priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    RootPosition,
    Inversion,
    OnChord,
    Rootless,
    Special,
}

impl Category {
    /// Fixed reporting order.
    pub const ALL: [Category; 5] = [
        Category::RootPosition,
        Category::Inversion,
        Category::OnChord,
        Category::Rootless,
        Category::Special,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::RootPosition => "Root Position",
            Category::Inversion => "Inversion",
            Category::OnChord => "On-Chord",
            Category::Rootless => "Rootless",
            Category::Special => "Special",
        };
        f.write_str(label)
    }
}

/// Quality symbols that are categorically special regardless of voicing.
const SPECIAL_MARKERS: [&str; 4] = ["Quartal", "Quintal", "+6", "Cluster"];

/// Assign the structural category; rules are exclusive, first match wins.
pub fn categorize(
    is_root_position: bool,
    is_rootless: bool,
    quality: &str,
    root_pc: u8,
    bass_pc: u8,
) -> Category {
    if SPECIAL_MARKERS.iter().any(|m| quality.contains(m)) {
        return Category::Special;
    }
    if is_rootless {
        return Category::Rootless;
    }
    if is_root_position {
        return Category::RootPosition;
    }

    let bass_interval = (i32::from(bass_pc) - i32::from(root_pc)).rem_euclid(12);
    // Chord-tone bass (3rd, any 5th, 7th) reads as an inversion; anything
    // else is an on-chord bass.
    if matches!(bass_interval, 3 | 4 | 6 | 7 | 8 | 10 | 11) {
        Category::Inversion
    } else {
        Category::OnChord
    }
}

/// Instability penalty for a non-root bass, keyed by its semitone interval
/// above the root.
pub fn inversion_penalty(bass_interval: i32) -> i32 {
    match bass_interval {
        3 | 4 => 5,   // 3rd in the bass: first inversion, fairly stable
        7 => 10,      // 5th in the bass: second inversion
        10 | 11 => 15, // 7th in the bass: third inversion, wants to move
        6 | 8 => 15,  // altered 5th in the bass
        _ => 20,      // tension in the bass: on-chord
    }
}

/// Semitone interval from root to bass, for penalty lookups.
pub fn bass_interval(root_pc: u8, bass_pc: u8) -> i32 {
    (i32::from(bass_pc) - i32::from(root_pc)).rem_euclid(12)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_wins_over_everything() {
        assert_eq!(
            categorize(true, false, "Quartal(4-note)", 0, 0),
            Category::Special
        );
        assert_eq!(categorize(false, true, "Gr+6", 0, 4), Category::Special);
        assert_eq!(
            categorize(true, false, "Tone Cluster", 0, 0),
            Category::Special
        );
    }

    #[test]
    fn test_rootless_before_position() {
        assert_eq!(categorize(false, true, "m9", 2, 6), Category::Rootless);
    }

    #[test]
    fn test_root_position() {
        assert_eq!(categorize(true, false, "Major", 0, 0), Category::RootPosition);
    }

    #[test]
    fn test_inversion_vs_on_chord() {
        // 3rd in the bass
        assert_eq!(categorize(false, false, "Major", 0, 4), Category::Inversion);
        // 5th in the bass
        assert_eq!(categorize(false, false, "Major", 0, 7), Category::Inversion);
        // 9th in the bass: on-chord
        assert_eq!(categorize(false, false, "9", 0, 2), Category::OnChord);
        // 4th in the bass: on-chord
        assert_eq!(categorize(false, false, "Major", 0, 5), Category::OnChord);
    }

    #[test]
    fn test_penalties() {
        assert_eq!(inversion_penalty(4), 5);
        assert_eq!(inversion_penalty(7), 10);
        assert_eq!(inversion_penalty(10), 15);
        assert_eq!(inversion_penalty(8), 15);
        assert_eq!(inversion_penalty(2), 20);
    }
}
