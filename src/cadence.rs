use crate::degree;
use crate::key::KeyContext;
use crate::tables::{CadenceRule, Tables};
use serde::Serialize;

/// One matched harmonic-motion rule.
#[derive(Debug, Clone, Serialize)]
pub struct CadenceMatch {
    pub name: String,
    pub bonus: i32,
}

/// Result of evaluating a chord-to-chord motion: the strongest match plus
/// every other rule that also fit, in descending bonus order.
#[derive(Debug, Clone, Serialize)]
pub struct CadenceOutcome {
    pub from_degree: String,
    pub to_degree: String,
    pub primary: CadenceMatch,
    pub alternates: Vec<CadenceMatch>,
}

impl CadenceOutcome {
    pub fn bonus(&self) -> i32 {
        self.primary.bonus
    }
}

/// Matches root/quality transitions against the cadence rule table, with a
/// generic root-motion fallback when nothing in the table fits.
pub struct CadenceEvaluator<'t> {
    rules: &'t [CadenceRule],
}

impl CadenceEvaluator<'static> {
    pub fn new() -> CadenceEvaluator<'static> {
        CadenceEvaluator::with_tables(Tables::builtin())
    }
}

impl Default for CadenceEvaluator<'static> {
    fn default() -> Self {
        CadenceEvaluator::new()
    }
}

impl<'t> CadenceEvaluator<'t> {
    pub fn with_tables(tables: &'t Tables) -> CadenceEvaluator<'t> {
        CadenceEvaluator {
            rules: &tables.cadences,
        }
    }

    /// Evaluate the motion from one identified chord to the next. Every
    /// matching rule is collected; the highest bonus wins and the rest are
    /// kept as alternates.
    pub fn evaluate(
        &self,
        from_root_pc: u8,
        from_quality: &str,
        to_root_pc: u8,
        to_quality: &str,
        key: &KeyContext,
    ) -> CadenceOutcome {
        let from_degree = degree::roman_of(from_root_pc, key);
        let to_degree = degree::roman_of(to_root_pc, key);
        let from_q = normalize_quality(from_quality);
        let to_q = normalize_quality(to_quality);

        let mut matches: Vec<CadenceMatch> = self
            .rules
            .iter()
            .filter(|rule| rule_applies(rule, from_degree, &from_q, to_degree, &to_q))
            .map(|rule| CadenceMatch {
                name: rule.name.clone(),
                bonus: rule.bonus,
            })
            .collect();

        // Highest bonus first; equal bonuses keep table order
        matches.sort_by_key(|m| std::cmp::Reverse(m.bonus));

        let primary = if matches.is_empty() {
            generic_fallback(from_root_pc, &from_q, to_root_pc)
        } else {
            matches.remove(0)
        };

        log::debug!(
            "{from_degree} -> {to_degree}: {} (+{}), {} alternate(s)",
            primary.name,
            primary.bonus,
            matches.len()
        );

        CadenceOutcome {
            from_degree: from_degree.to_string(),
            to_degree: to_degree.to_string(),
            primary,
            alternates: matches,
        }
    }
}

/// Fold spelled-out triad qualities onto the compact symbols the rule
/// table speaks ("Major" -> "", "Minor" -> "m").
fn normalize_quality(quality: &str) -> String {
    match quality {
        "Major" => String::new(),
        "Minor" => "m".to_string(),
        "Dim" => "dim".to_string(),
        "Aug" => "aug".to_string(),
        other => other.to_string(),
    }
}

fn rule_applies(
    rule: &CadenceRule,
    from_degree: &str,
    from_quality: &str,
    to_degree: &str,
    to_quality: &str,
) -> bool {
    if rule.from_degree != from_degree || rule.to_degree != to_degree {
        return false;
    }
    // Exact membership on the source quality
    if !rule.from_quality.iter().any(|q| q == from_quality) {
        return false;
    }
    // Substring predicates on the destination quality
    if !rule.to_quality_include.is_empty()
        && !rule
            .to_quality_include
            .iter()
            .any(|q| to_quality.contains(q.as_str()))
    {
        return false;
    }
    if rule
        .to_quality_exclude
        .iter()
        .any(|q| to_quality.contains(q.as_str()))
    {
        return false;
    }
    true
}

/// True for dominant-function symbols: a 7th chord that is neither a major
/// 7th nor a minor 7th flavor.
fn is_dominant_function(quality: &str) -> bool {
    quality.contains('7') && !quality.contains("Maj") && !quality.contains("m7")
}

/// Fixed bonuses for root motion when no rule matched. Always named, so a
/// transition report is never silent about its harmonic motion.
fn generic_fallback(from_root_pc: u8, from_quality: &str, to_root_pc: u8) -> CadenceMatch {
    let down = (i32::from(from_root_pc) - i32::from(to_root_pc)).rem_euclid(12);
    if down == 7 {
        if is_dominant_function(from_quality) {
            CadenceMatch {
                name: "Dominant Motion (Down a 5th)".to_string(),
                bonus: 15,
            }
        } else {
            CadenceMatch {
                name: "Strong Root Motion (Down a 5th)".to_string(),
                bonus: 10,
            }
        }
    } else if down == 2 || down == 10 {
        CadenceMatch {
            name: "Stepwise Root Motion".to_string(),
            bonus: 5,
        }
    } else {
        CadenceMatch {
            name: "Unclassified Motion".to_string(),
            bonus: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> KeyContext {
        KeyContext::new(name).unwrap()
    }

    #[test]
    fn test_authentic_cadence() {
        // G7 -> C major in C
        let outcome = CadenceEvaluator::new().evaluate(7, "7", 0, "Major", &key("C"));
        assert_eq!(outcome.from_degree, "V");
        assert_eq!(outcome.to_degree, "I");
        assert_eq!(outcome.primary.name, "Authentic Cadence");
        assert_eq!(outcome.primary.bonus, 30);
    }

    #[test]
    fn test_authentic_cadence_transposed() {
        // Bb7 -> Eb in Eb
        let outcome = CadenceEvaluator::new().evaluate(10, "7", 3, "Maj7", &key("Eb"));
        assert_eq!(outcome.primary.name, "Authentic Cadence");
    }

    #[test]
    fn test_minor_destination_blocks_authentic() {
        // G7 -> Cm: excluded by the rule, falls back to root motion
        let outcome = CadenceEvaluator::new().evaluate(7, "7", 0, "m7", &key("C"));
        assert_eq!(outcome.primary.name, "Dominant Motion (Down a 5th)");
        assert_eq!(outcome.primary.bonus, 15);
    }

    #[test]
    fn test_multiple_matches_keep_alternates() {
        // Bb7 -> CMaj7 in C: backdoor resolution is tabulated twice
        let outcome = CadenceEvaluator::new().evaluate(10, "7", 0, "Maj7", &key("C"));
        assert_eq!(outcome.primary.bonus, 25);
        assert!(!outcome.alternates.is_empty());
        let names: Vec<&str> = std::iter::once(outcome.primary.name.as_str())
            .chain(outcome.alternates.iter().map(|m| m.name.as_str()))
            .collect();
        assert!(names.contains(&"Backdoor Resolution"));
        assert!(names.contains(&"Mixolydian Backdoor (bVII7 -> I)"));
    }

    #[test]
    fn test_two_five() {
        let outcome = CadenceEvaluator::new().evaluate(2, "m7", 7, "7", &key("C"));
        assert_eq!(outcome.primary.name, "II-V Progression");
        assert_eq!(outcome.primary.bonus, 25);
    }

    #[test]
    fn test_plain_triad_quality_normalization() {
        // F major triad -> C major triad: plagal, via "Major" -> ""
        let outcome = CadenceEvaluator::new().evaluate(5, "Major", 0, "Major", &key("C"));
        assert_eq!(outcome.primary.name, "Plagal Cadence");

        // Dm -> G7 two-five with a plain minor triad
        let outcome = CadenceEvaluator::new().evaluate(2, "Minor", 7, "7", &key("C"));
        assert_eq!(outcome.primary.name, "II-V Progression");
    }

    #[test]
    fn test_deceptive_cadence() {
        let outcome = CadenceEvaluator::new().evaluate(7, "7", 9, "m7", &key("C"));
        assert_eq!(outcome.primary.name, "Deceptive Cadence");
    }

    #[test]
    fn test_generic_fallback_whole_step() {
        // Fm7 -> G-something in Eb: II -> III has no rule, up a whole step
        let outcome = CadenceEvaluator::new().evaluate(5, "m7", 7, "7", &key("Eb"));
        assert_eq!(outcome.primary.name, "Stepwise Root Motion");
        assert_eq!(outcome.primary.bonus, 5);
    }

    #[test]
    fn test_generic_fallback_is_never_nameless() {
        // VI -> I in Eb: no rule, no notable root motion
        let outcome = CadenceEvaluator::new().evaluate(0, "m9", 3, "Maj7", &key("Eb"));
        assert!(!outcome.primary.name.is_empty());
        assert_eq!(outcome.primary.bonus, 0);
    }

    #[test]
    fn test_secondary_dominant() {
        // E7 -> Am in C
        let outcome = CadenceEvaluator::new().evaluate(4, "7", 9, "m7", &key("C"));
        assert_eq!(outcome.primary.name, "Secondary Dominant (III7 -> VIm)");
    }
}
