use crate::key::KeyContext;

/// Semitones above the tonic, mapped to roman numerals with popular-music
/// accidental conventions. The tritone is written #IV (bV is equivalent).
const SEMITONE_TO_DEGREE: [&str; 12] = [
    "I", "bII", "II", "bIII", "III", "IV", "#IV", "V", "bVI", "VI", "bVII", "VII",
];

/// Roman numeral of a bare pitch class within the key.
pub fn roman_of(pitch_class: u8, key: &KeyContext) -> &'static str {
    let diff = (i32::from(pitch_class) - i32::from(key.tonic_pc())).rem_euclid(12) as usize;
    SEMITONE_TO_DEGREE[diff]
}

/// Full degree name for a chord: roman numeral plus quality, with a
/// slash-bass roman appended when the bass differs from the root
/// ("IIm7", "V7 / VII"). A "Major" quality collapses to the bare numeral.
pub fn to_degree(root_pc: u8, quality: &str, key: &KeyContext, bass_pc: Option<u8>) -> String {
    let clean_quality = quality.replace("Major", "");
    let clean_quality = clean_quality.trim();
    let mut degree = format!("{}{}", roman_of(root_pc, key), clean_quality);

    if let Some(bass) = bass_pc {
        if bass != root_pc {
            degree.push_str(&format!(" / {}", roman_of(bass, key)));
        }
    }

    degree
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> KeyContext {
        KeyContext::new(name).unwrap()
    }

    #[test]
    fn test_diatonic_degrees_in_c() {
        let c = key("C");
        assert_eq!(roman_of(0, &c), "I");
        assert_eq!(roman_of(2, &c), "II");
        assert_eq!(roman_of(4, &c), "III");
        assert_eq!(roman_of(5, &c), "IV");
        assert_eq!(roman_of(7, &c), "V");
        assert_eq!(roman_of(9, &c), "VI");
        assert_eq!(roman_of(11, &c), "VII");
    }

    #[test]
    fn test_chromatic_degrees() {
        let c = key("C");
        assert_eq!(roman_of(1, &c), "bII");
        assert_eq!(roman_of(6, &c), "#IV");
        assert_eq!(roman_of(8, &c), "bVI");
        assert_eq!(roman_of(10, &c), "bVII");
    }

    #[test]
    fn test_transposed_key() {
        let eb = key("Eb");
        assert_eq!(roman_of(3, &eb), "I");
        assert_eq!(roman_of(5, &eb), "II");
        assert_eq!(roman_of(7, &eb), "III");
        assert_eq!(roman_of(10, &eb), "V");
        assert_eq!(roman_of(0, &eb), "VI");
    }

    #[test]
    fn test_quality_suffix() {
        let c = key("C");
        assert_eq!(to_degree(7, "7", &c, None), "V7");
        assert_eq!(to_degree(2, "m7", &c, None), "IIm7");
        // Major triads collapse to the bare numeral
        assert_eq!(to_degree(0, "Major", &c, None), "I");
    }

    #[test]
    fn test_slash_bass() {
        let c = key("C");
        assert_eq!(to_degree(7, "7", &c, Some(11)), "V7 / VII");
        // Bass equal to root adds nothing
        assert_eq!(to_degree(7, "7", &c, Some(7)), "V7");
    }
}
