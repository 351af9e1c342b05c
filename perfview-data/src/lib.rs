use serde::{Deserialize, Serialize};
use thiserror::Error;

mod sample;

pub use sample::{BenchResult, EventSample, HotspotEvents};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Benchmark index {index} is out of range ({count} benchmarks recorded)")]
    BenchOutOfRange { index: usize, count: usize },
    #[error("Hotspot index {index} is out of range for '{bench}' ({count} hotspots recorded)")]
    HotspotOutOfRange {
        bench: String,
        index: usize,
        count: usize,
    },
    #[error("Failed to parse bench results")]
    Parse(#[from] serde_json::Error),
}

/// Results of a profiling run, one entry per benchmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchResults {
    pub benches: Vec<BenchResult>,
}

impl BenchResults {
    pub fn from_json(data: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn bench(&self, index: usize) -> Result<&BenchResult, Error> {
        self.benches.get(index).ok_or(Error::BenchOutOfRange {
            index,
            count: self.benches.len(),
        })
    }

    pub fn hotspot(
        &self,
        bench_index: usize,
        hotspot_index: usize,
    ) -> Result<(&BenchResult, &HotspotEvents), Error> {
        let bench = self.bench(bench_index)?;
        let hotspot = bench
            .hotspots
            .get(hotspot_index)
            .ok_or_else(|| Error::HotspotOutOfRange {
                bench: bench.name.clone(),
                index: hotspot_index,
                count: bench.hotspots.len(),
            })?;

        Ok((bench, hotspot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = r#"
    [
        {
            "name": "Richards",
            "hotspots": [
                {
                    "name": "Richards.schedule",
                    "events": [
                        { "name": "cycles", "rate": 42.5, "total": 120000, "file": "Richards/cycles.annotate" },
                        { "name": "r10", "rate": 71.0, "total": 311 }
                    ]
                }
            ]
        }
    ]
    "#;

    #[test]
    fn bench_results_parse_from_json() {
        let results = BenchResults::from_json(RESULTS).expect("failed to parse results");
        assert_eq!(results.benches.len(), 1);

        let (bench, hotspot) = results.hotspot(0, 0).expect("hotspot");
        assert_eq!(bench.name, "Richards");
        assert_eq!(hotspot.events.len(), 2);
        assert_eq!(hotspot.events[0].event_code, "cycles");
        assert_eq!(hotspot.events[0].source_file, "Richards/cycles.annotate");
        assert_eq!(hotspot.events[1].total_count, 311);
        assert!(hotspot.events[1].source_file.is_empty());
    }

    #[test]
    fn out_of_range_indices_are_reported() {
        let results = BenchResults::from_json(RESULTS).unwrap();

        assert!(matches!(
            results.hotspot(3, 0),
            Err(Error::BenchOutOfRange { index: 3, count: 1 })
        ));
        assert!(matches!(
            results.hotspot(0, 1),
            Err(Error::HotspotOutOfRange { index: 1, count: 1, .. })
        ));
    }
}
