//! Rule-based chord-name generation for interval sets absent from the
//! dictionary. Derives plausible tension spellings from the raw interval
//! content (3rd/5th/7th skeleton plus collected tensions) instead of
//! giving up on untabulated combinations.

use crate::interval::{Interval, IntervalSet};

fn has(intervals: &IntervalSet, symbol: &str) -> bool {
    intervals.contains(&symbol.parse::<Interval>().unwrap())
}

/// Tension symbols in reporting order, paired with their chord-name token.
const TENSIONS: [(&str, &str); 7] = [
    ("m9", "b9"),
    ("M9", "9"),
    ("A9", "#9"),
    ("P11", "11"),
    ("A11", "#11"),
    ("m13", "b13"),
    ("M13", "13"),
];

/// Generate zero or more plausible quality spellings for an untabulated
/// interval set. Callers keep only names carrying parenthesized tensions
/// or an `aug` marking, so plain-triad guesses never flood the results.
pub fn generate_names(intervals: &IntervalSet) -> Vec<String> {
    let major_third = has(intervals, "M3");
    let minor_third = has(intervals, "m3");
    let min7 = has(intervals, "m7");
    let maj7 = has(intervals, "M7");
    let dim7 = has(intervals, "d7");
    let aug5 = has(intervals, "A5");
    let dim5 = has(intervals, "d5");
    let has_fifth = has(intervals, "P5") || aug5 || dim5;
    let sus4 = !major_third && !minor_third && has(intervals, "P4");

    // Base skeleton from 3rd + 7th (+ altered 5th)
    let base: &str = if major_third && aug5 {
        if min7 {
            "aug7"
        } else if maj7 {
            "augM7"
        } else {
            "aug"
        }
    } else if major_third && min7 {
        "7"
    } else if major_third && maj7 {
        "Maj7"
    } else if minor_third && dim5 && dim7 {
        "dim7"
    } else if minor_third && dim5 && min7 {
        "m7b5"
    } else if minor_third && min7 {
        "m7"
    } else if minor_third && maj7 {
        "mM7"
    } else if sus4 && min7 {
        "7sus4"
    } else if major_third {
        ""
    } else if minor_third {
        "m"
    } else if sus4 {
        "sus4"
    } else {
        // No recognizable skeleton: nothing plausible to say
        return Vec::new();
    };

    let mut tokens: Vec<&str> = Vec::new();
    if dim5 && major_third {
        tokens.push("b5");
    }
    for (symbol, token) in TENSIONS {
        if has(intervals, symbol) {
            tokens.push(token);
        }
    }

    let mut name = base.to_string();
    if !tokens.is_empty() {
        name.push_str(&format!("({})", tokens.join(",")));
    }
    if !has_fifth && !name.is_empty() && base != "7sus4" && base != "sus4" {
        name.push_str("(omit5)");
    }

    let mut names = Vec::new();
    if !name.is_empty() {
        names.push(name);
    }

    // An augmented 5th under a dominant 7th also reads as a #5 tension
    if major_third && aug5 && min7 {
        let mut alt_tokens = vec!["#5"];
        alt_tokens.extend(tokens.iter().copied());
        names.push(format!("7({})", alt_tokens.join(",")));
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(symbols: &[&str]) -> IntervalSet {
        symbols
            .iter()
            .map(|s| s.parse::<Interval>().unwrap())
            .collect()
    }

    #[test]
    fn test_aug_dominant_with_sharp_nine() {
        // G B D# F A# — the aug7(#9) sonority, not in the dictionary
        let names = generate_names(&set(&["P1", "M3", "A5", "m7", "A9"]));
        assert_eq!(names[0], "aug7(#9)");
        assert!(names.contains(&"7(#5,#9)".to_string()));
    }

    #[test]
    fn test_stacked_tensions() {
        let names = generate_names(&set(&["P1", "M3", "P5", "m7", "m9", "M13"]));
        assert_eq!(names[0], "7(b9,13)");
    }

    #[test]
    fn test_minor_with_sharp_eleven() {
        let names = generate_names(&set(&["P1", "m3", "P5", "m7", "A11"]));
        assert_eq!(names[0], "m7(#11)");
    }

    #[test]
    fn test_omitted_fifth_marker() {
        let names = generate_names(&set(&["P1", "M3", "m7", "m13"]));
        assert_eq!(names[0], "7(b13)(omit5)");
    }

    #[test]
    fn test_plain_triad_has_no_tension_name() {
        // A bare major triad has no tension name at all; a minor triad
        // generates a plain "m" that the caller's tension/aug filter drops
        let names = generate_names(&set(&["P1", "M3", "P5"]));
        assert!(names.is_empty());

        let names = generate_names(&set(&["P1", "m3", "P5"]));
        assert_eq!(names, vec!["m"]);
    }

    #[test]
    fn test_no_skeleton_yields_nothing() {
        let names = generate_names(&set(&["P1", "M2", "M6"]));
        assert!(names.is_empty());
    }
}
