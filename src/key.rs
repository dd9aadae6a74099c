use crate::pitch::{NoteError, Pitch, parse_note};

/// Keys whose pitch classes are spelled with flats.
const FLAT_KEYS: &[&str] = &[
    "F", "Bb", "Eb", "Ab", "Db", "Gb", "Cb", "Dm", "Gm", "Cm", "Fm", "Bbm", "Ebm", "Abm",
];

/// Keys where pitch class 11 is spelled Cb rather than B.
const CB_KEYS: &[&str] = &["Gb", "Cb", "Ebm", "Abm"];

/// Keys where pitch class 5 is spelled E# rather than F.
const ES_KEYS: &[&str] = &["F#", "D#m"];

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Enharmonic spelling policy and tonic for one key, built once per
/// analysis call from a key name string ("C", "Eb", "F#m").
#[derive(Debug, Clone)]
pub struct KeyContext {
    name: String,
    tonic_pc: u8,
    use_flats: bool,
}

impl KeyContext {
    pub fn new(key_name: &str) -> Result<KeyContext, NoteError> {
        let name = key_name.trim().to_string();
        let tonic = tonic_token(&name);
        let pitch: Pitch =
            parse_note(&tonic, 4).map_err(|_| NoteError::InvalidKeyName(name.clone()))?;
        Ok(KeyContext {
            use_flats: FLAT_KEYS.contains(&name.as_str()),
            tonic_pc: pitch.pitch_class(),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tonic_pc(&self) -> u8 {
        self.tonic_pc
    }

    /// Spell a pitch class as a note name under this key's policy.
    pub fn note_name(&self, pitch_class: u8) -> &'static str {
        let pc = (pitch_class % 12) as usize;
        if self.use_flats {
            if pc == 11 && CB_KEYS.contains(&self.name.as_str()) {
                return "Cb";
            }
            FLAT_NAMES[pc]
        } else {
            if pc == 5 && ES_KEYS.contains(&self.name.as_str()) {
                return "E#";
            }
            SHARP_NAMES[pc]
        }
    }
}

/// Strip minor-mode suffixes from a key name, leaving the tonic token.
/// "F#m" -> "F#", "Eb Minor" -> "Eb".
fn tonic_token(key_name: &str) -> String {
    key_name
        .trim()
        .trim_end_matches("Minor")
        .trim_end_matches("minor")
        .trim_end_matches('m')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharp_key_spelling() {
        let ctx = KeyContext::new("C").unwrap();
        assert_eq!(ctx.note_name(1), "C#");
        assert_eq!(ctx.note_name(10), "A#");
        assert_eq!(ctx.note_name(5), "F");
    }

    #[test]
    fn test_flat_key_spelling() {
        let ctx = KeyContext::new("Eb").unwrap();
        assert_eq!(ctx.note_name(1), "Db");
        assert_eq!(ctx.note_name(10), "Bb");
        assert_eq!(ctx.note_name(11), "B");
    }

    #[test]
    fn test_cb_exception() {
        let ctx = KeyContext::new("Gb").unwrap();
        assert_eq!(ctx.note_name(11), "Cb");
        let ctx = KeyContext::new("Abm").unwrap();
        assert_eq!(ctx.note_name(11), "Cb");
    }

    #[test]
    fn test_es_exception() {
        let ctx = KeyContext::new("F#").unwrap();
        assert_eq!(ctx.note_name(5), "E#");
        // Plain sharp keys keep F
        let ctx = KeyContext::new("G").unwrap();
        assert_eq!(ctx.note_name(5), "F");
    }

    #[test]
    fn test_tonic_pc() {
        assert_eq!(KeyContext::new("C").unwrap().tonic_pc(), 0);
        assert_eq!(KeyContext::new("Eb").unwrap().tonic_pc(), 3);
        assert_eq!(KeyContext::new("F#m").unwrap().tonic_pc(), 6);
        assert_eq!(KeyContext::new("Bbm").unwrap().tonic_pc(), 10);
    }

    #[test]
    fn test_minor_keys_use_flats() {
        let ctx = KeyContext::new("Cm").unwrap();
        assert_eq!(ctx.note_name(3), "Eb");
        assert_eq!(ctx.note_name(8), "Ab");
    }

    #[test]
    fn test_invalid_key() {
        assert!(KeyContext::new("H").is_err());
        assert!(KeyContext::new("").is_err());
    }
}
