use crate::tables::TableError;
use serde::Deserialize;
use std::collections::HashMap;

/// Acoustic data for one interval: just-intonation frequency ratio and a
/// 0-6 dissonance weight.
#[derive(Debug, Clone, Deserialize)]
pub struct IntervalInfo {
    pub name: String,
    pub ratio: (u32, u32),
    pub dissonance: i32,
}

#[derive(Debug, Deserialize)]
struct ConsonanceEntry {
    symbol: String,
    #[serde(flatten)]
    info: IntervalInfo,
}

#[derive(Debug, Deserialize)]
struct ConsonanceFile {
    interval: Vec<ConsonanceEntry>,
}

/// Read-only ratio/dissonance lookup keyed by interval symbol.
/// Coverage is intentionally partial; unknown symbols return `None`.
#[derive(Debug, Clone, Default)]
pub struct ConsonanceTable {
    map: HashMap<String, IntervalInfo>,
}

impl ConsonanceTable {
    pub fn from_toml_str(text: &str) -> Result<ConsonanceTable, TableError> {
        let file: ConsonanceFile = toml::from_str(text)?;
        let map = file
            .interval
            .into_iter()
            .map(|e| (e.symbol, e.info))
            .collect();
        Ok(ConsonanceTable { map })
    }

    pub fn get(&self, symbol: &str) -> Option<&IntervalInfo> {
        self.map.get(symbol)
    }

    pub fn dissonance(&self, symbol: &str) -> i32 {
        self.map.get(symbol).map_or(0, |i| i.dissonance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::Tables;

    #[test]
    fn test_ratios() {
        let table = &Tables::builtin().consonance;
        assert_eq!(table.get("P5").unwrap().ratio, (3, 2));
        assert_eq!(table.get("M3").unwrap().ratio, (5, 4));
    }

    #[test]
    fn test_dissonance_ordering() {
        let table = &Tables::builtin().consonance;
        assert!(table.dissonance("m2") > table.dissonance("M3"));
        assert!(table.dissonance("m9") > table.dissonance("M9"));
        assert_eq!(table.dissonance("P1"), 0);
    }

    #[test]
    fn test_unknown_symbol() {
        let table = &Tables::builtin().consonance;
        assert!(table.get("d3").is_none());
        assert_eq!(table.dissonance("d3"), 0);
    }
}
