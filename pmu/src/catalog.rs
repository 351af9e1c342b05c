use std::{fs::File, io::BufReader, path::Path};

use pmu_data::{EventTableDesc, PmuEvent};

use crate::Error;

include!(concat!(env!("OUT_DIR"), "/events.rs"));

/// Names of the architecture tables compiled into this crate.
pub fn known_architectures() -> &'static [&'static str] {
    ARCHITECTURES
}

/// Canonical form of an event code used for comparisons.
///
/// Codes are case-insensitive, and perf's raw event syntax `rNN` is the same
/// event as `0xNN`.
pub fn normalize_code(code: &str) -> String {
    let upper = code.to_uppercase();
    match upper.strip_prefix('R') {
        Some(hex) if hex.chars().all(|c| c.is_ascii_hexdigit()) => format!("0X{hex}"),
        _ => upper,
    }
}

struct Entry {
    key: String,
    event: PmuEvent,
}

/// Read-only table of event descriptors.
///
/// Generic events are searched before architecture specific ones, and the
/// first match wins.
pub struct Catalog {
    entries: Vec<Entry>,
    unknown: PmuEvent,
}

impl Catalog {
    pub fn from_tables(generic: Vec<PmuEvent>, arch: Vec<PmuEvent>) -> Self {
        let entries = generic
            .into_iter()
            .chain(arch)
            .map(|event| Entry {
                key: event.code.to_uppercase(),
                event,
            })
            .collect();

        Catalog {
            entries,
            unknown: PmuEvent::unknown(),
        }
    }

    pub fn for_arch(arch: &str) -> Result<Self, Error> {
        let table = architecture_table(arch)
            .ok_or_else(|| Error::UnknownArchitecture(arch.to_string()))?;

        Ok(Catalog::from_tables(generic_table(), table))
    }

    /// Catalog with the generic table only.
    pub fn generic() -> Self {
        Catalog::from_tables(generic_table(), vec![])
    }

    /// Appends a table described by a JSON file. Its entries are searched
    /// after every table already in the catalog.
    pub fn with_table_file(mut self, path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|source| Error::TableRead {
            path: path.to_owned(),
            source,
        })?;
        let table: EventTableDesc =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::TableParse {
                path: path.to_owned(),
                source,
            })?;

        log::debug!(
            "loaded {} events from table '{}' ({})",
            table.events.len(),
            table.name,
            path.display()
        );

        self.entries.extend(table.events.into_iter().map(|event| Entry {
            key: event.code.to_uppercase(),
            event,
        }));

        Ok(self)
    }

    /// Never fails: codes missing from every table resolve to the
    /// `UnknownEvent` sentinel.
    pub fn lookup(&self, code: &str) -> &PmuEvent {
        let key = normalize_code(code);

        match self.entries.iter().find(|entry| entry.key == key) {
            Some(entry) => &entry.event,
            None => {
                log::debug!("event code '{code}' is not in the catalog");
                &self.unknown
            }
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &PmuEvent> {
        self.entries.iter().map(|entry| &entry.event)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(code: &str, name: &str) -> PmuEvent {
        PmuEvent {
            code: code.to_string(),
            name: name.to_string(),
            brief_description: String::new(),
            public_description: String::new(),
        }
    }

    #[test]
    fn raw_codes_are_normalized() {
        assert_eq!(normalize_code("r10"), "0X10");
        assert_eq!(normalize_code("R1b"), "0X1B");
        assert_eq!(normalize_code("0x10"), "0X10");
        assert_eq!(normalize_code("cycles"), "CYCLES");
        assert_eq!(normalize_code("ref-cycles"), "REF-CYCLES");
        assert_eq!(normalize_code("r"), "0X");
    }

    #[test]
    fn generic_entries_take_precedence() {
        let catalog = Catalog::from_tables(
            vec![event("0x11", "generic-cycles")],
            vec![event("0x11", "CPU_CYCLES")],
        );
        assert_eq!(catalog.lookup("0x11").name, "generic-cycles");
    }

    #[test]
    fn first_match_within_table_wins() {
        let catalog =
            Catalog::from_tables(vec![], vec![event("0x01", "FIRST"), event("0X01", "SECOND")]);
        assert_eq!(catalog.lookup("r01").name, "FIRST");
    }

    #[test]
    fn empty_catalog_is_total() {
        let catalog = Catalog::from_tables(vec![], vec![]);
        assert!(catalog.is_empty());
        assert!(catalog.lookup("cycles").is_unknown());
    }

    #[test]
    fn builtin_tables_are_compiled_in() {
        assert!(known_architectures().contains(&pmu_data::ARM_CORTEX_A53));
        assert!(known_architectures().contains(&pmu_data::ARM_CORTEX_A57));
        assert!(!generic_table().is_empty());
    }
}
