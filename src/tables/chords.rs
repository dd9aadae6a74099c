use crate::interval::{Interval, IntervalSet};
use crate::tables::TableError;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ChordEntry {
    intervals: Vec<Interval>,
    quality: String,
}

#[derive(Debug, Deserialize)]
struct ChordFile {
    chord: Vec<ChordEntry>,
}

/// Immutable mapping from a canonical interval set to a quality symbol.
/// The `BTreeSet` key makes lookups order-independent.
#[derive(Debug, Clone, Default)]
pub struct ChordDictionary {
    map: HashMap<IntervalSet, String>,
}

impl ChordDictionary {
    pub fn from_toml_str(text: &str) -> Result<ChordDictionary, TableError> {
        let file: ChordFile = toml::from_str(text)?;
        let mut map = HashMap::with_capacity(file.chord.len());
        for entry in file.chord {
            let key: IntervalSet = entry.intervals.into_iter().collect();
            if let Some(old) = map.insert(key, entry.quality) {
                log::warn!("Duplicate interval set in chord table, replacing {old:?}");
            }
        }
        Ok(ChordDictionary { map })
    }

    pub fn lookup(&self, intervals: &IntervalSet) -> Option<&str> {
        self.map.get(intervals).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
