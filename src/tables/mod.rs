pub mod cadences;
pub mod chords;
pub mod consonance;

pub use cadences::CadenceRule;
pub use chords::ChordDictionary;
pub use consonance::ConsonanceTable;

use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Table parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to read table file: {0}")]
    Io(#[from] std::io::Error),
}

/// All static lookup tables, loaded once and shared read-only across
/// analysis calls. The built-in set ships as embedded TOML; any table can
/// be swapped for a user-supplied file without touching the engine.
#[derive(Debug, Clone)]
pub struct Tables {
    pub chords: ChordDictionary,
    pub cadences: Vec<CadenceRule>,
    pub consonance: ConsonanceTable,
}

static BUILTIN: LazyLock<Tables> = LazyLock::new(|| Tables {
    chords: ChordDictionary::from_toml_str(include_str!("chords.toml"))
        .expect("embedded chord table is valid"),
    cadences: cadences::from_toml_str(include_str!("cadences.toml"))
        .expect("embedded cadence table is valid"),
    consonance: ConsonanceTable::from_toml_str(include_str!("consonance.toml"))
        .expect("embedded consonance table is valid"),
});

impl Tables {
    /// The compiled-in tables, parsed once at first use.
    pub fn builtin() -> &'static Tables {
        &BUILTIN
    }

    /// Built-in tables with individual files overridden where given.
    pub fn with_overrides(
        chord_table: Option<&Path>,
        cadence_table: Option<&Path>,
    ) -> Result<Tables, TableError> {
        let mut tables = Tables::builtin().clone();
        if let Some(path) = chord_table {
            let text = std::fs::read_to_string(path)?;
            tables.chords = ChordDictionary::from_toml_str(&text)?;
            log::info!(
                "Loaded chord dictionary from {} ({} entries)",
                path.display(),
                tables.chords.len()
            );
        }
        if let Some(path) = cadence_table {
            let text = std::fs::read_to_string(path)?;
            tables.cadences = cadences::from_toml_str(&text)?;
            log::info!(
                "Loaded cadence rules from {} ({} rules)",
                path.display(),
                tables.cadences.len()
            );
        }
        Ok(tables)
    }
}
