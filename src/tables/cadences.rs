use crate::tables::TableError;
use serde::Deserialize;

/// One harmonic-motion rule. `from_quality` is an exact-membership set;
/// the `to_quality_*` lists are substring predicates on the destination
/// quality symbol. The table is a list, not a map — several rules may
/// match the same transition.
#[derive(Debug, Clone, Deserialize)]
pub struct CadenceRule {
    pub from_degree: String,
    pub from_quality: Vec<String>,
    pub to_degree: String,
    #[serde(default)]
    pub to_quality_include: Vec<String>,
    #[serde(default)]
    pub to_quality_exclude: Vec<String>,
    pub name: String,
    pub bonus: i32,
}

#[derive(Debug, Deserialize)]
struct CadenceFile {
    cadence: Vec<CadenceRule>,
}

pub fn from_toml_str(text: &str) -> Result<Vec<CadenceRule>, TableError> {
    let file: CadenceFile = toml::from_str(text)?;
    Ok(file.cadence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::Tables;

    #[test]
    fn test_builtin_rules_shape() {
        let rules = &Tables::builtin().cadences;
        let authentic = rules
            .iter()
            .find(|r| r.name == "Authentic Cadence")
            .unwrap();
        assert_eq!(authentic.from_degree, "V");
        assert_eq!(authentic.to_degree, "I");
        assert_eq!(authentic.bonus, 30);
        assert!(authentic.from_quality.contains(&"7".to_string()));
    }

    #[test]
    fn test_multiple_rules_same_degrees() {
        // bVII7 -> I is covered by two distinct rules by design
        let rules = &Tables::builtin().cadences;
        let count = rules
            .iter()
            .filter(|r| r.from_degree == "bVII" && r.to_degree == "I")
            .count();
        assert!(count >= 2);
    }

    #[test]
    fn test_optional_predicates_default_empty() {
        let rules = from_toml_str(
            r#"
            [[cadence]]
            from_degree = "V"
            from_quality = ["7"]
            to_degree = "I"
            name = "test"
            bonus = 10
            "#,
        )
        .unwrap();
        assert!(rules[0].to_quality_include.is_empty());
        assert!(rules[0].to_quality_exclude.is_empty());
    }
}
