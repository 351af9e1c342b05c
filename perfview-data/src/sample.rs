use serde::{Deserialize, Serialize};

/// Share of one hotspot's samples attributed to a single event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSample {
    #[serde(rename = "name")]
    pub event_code: String,
    /// Percentage in `[0, 100]`.
    pub rate: f64,
    #[serde(rename = "total", default)]
    pub total_count: u64,
    /// Annotation dump recorded for this event, relative to the bench output
    /// directory.
    #[serde(rename = "file", default)]
    pub source_file: String,
}

impl EventSample {
    pub fn new(event_code: &str, rate: f64, total_count: u64) -> Self {
        EventSample {
            event_code: event_code.to_string(),
            rate,
            total_count,
            source_file: String::new(),
        }
    }
}

/// Event samples recorded for one hotspot.
///
/// The first event is the reference event (cycles by convention); event
/// tables compare every other rate against it, so the runner must keep it in
/// front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotEvents {
    pub name: String,
    pub events: Vec<EventSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchResult {
    pub name: String,
    #[serde(default)]
    pub hotspots: Vec<HotspotEvents>,
}
