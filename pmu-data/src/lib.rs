use serde::{Deserialize, Serialize};

// Well-known event tables
pub const GENERIC: &str = "generic";
pub const ARM_CORTEX_A53: &str = "cortex-a53";
pub const ARM_CORTEX_A57: &str = "cortex-a57";

pub const UNKNOWN_EVENT: &str = "UnknownEvent";

/// A single countable event, as described by `perf list` or a PMU reference
/// manual. `code` is either a symbolic name (`cycles`) or a raw `0x` hex code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmuEvent {
    #[serde(rename = "EventCode")]
    pub code: String,
    #[serde(rename = "EventName")]
    pub name: String,
    #[serde(rename = "BriefDescription")]
    pub brief_description: String,
    #[serde(rename = "PublicDescription")]
    pub public_description: String,
}

impl PmuEvent {
    pub fn unknown() -> Self {
        PmuEvent {
            code: UNKNOWN_EVENT.to_string(),
            name: UNKNOWN_EVENT.to_string(),
            brief_description: UNKNOWN_EVENT.to_string(),
            public_description: UNKNOWN_EVENT.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.code == UNKNOWN_EVENT
    }

    /// Symbolic events are shown by name only, raw events as `NAME (0xNN)`.
    pub fn display_name(&self) -> String {
        if self.code == self.name {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.code)
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Searched first, regardless of the selected architecture.
    Generic,
    Architecture,
}

impl Default for TableKind {
    fn default() -> Self {
        TableKind::Architecture
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventTableDesc {
    pub name: String,
    #[serde(default)]
    pub kind: TableKind,
    #[serde(default)]
    pub description: Option<String>,
    pub events: Vec<PmuEvent>,
}
