use perfview_data::EventSample;
use pmu::Catalog;
use serde::Serialize;

use crate::severity::HotThreshold;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    pub event_code: String,
    pub display_name: String,
    pub description: String,
    pub rate: f64,
    pub total_count: u64,
    pub source_file: String,
    pub hot: bool,
    /// Built from the reference sample.
    pub reference: bool,
}

/// Events of one hotspot, highest rate first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTable {
    pub reference_rate: f64,
    pub threshold: HotThreshold,
    /// Rates above this value are flagged hot.
    pub boundary: f64,
    pub rows: Vec<EventRow>,
}

impl EventTable {
    pub fn hot_rows(&self) -> impl Iterator<Item = &EventRow> {
        self.rows.iter().filter(|row| row.hot)
    }
}

fn checked_rate(sample: &EventSample) -> f64 {
    let rate = sample.rate;
    if rate.is_nan() {
        log::warn!("event '{}' has no valid rate", sample.event_code);
        return 0.0;
    }
    if !(0.0..=100.0).contains(&rate) {
        log::warn!(
            "rate {rate} of event '{}' is outside [0, 100]",
            sample.event_code
        );
    }
    rate.clamp(0.0, 100.0)
}

/// Ranks the event samples of a hotspot and flags the ones that stand out.
///
/// `samples[0]` is the reference event (cycles by convention): its rate is
/// what every other rate is compared against, whatever its name is. Callers
/// must keep the recorded order.
pub fn build_event_table(
    samples: &[EventSample],
    catalog: &Catalog,
    threshold: HotThreshold,
) -> EventTable {
    let rates = samples.iter().map(checked_rate).collect::<Vec<_>>();
    let reference_rate = rates.first().copied().unwrap_or(0.0);

    let mut rows = samples
        .iter()
        .zip(rates)
        .enumerate()
        .map(|(position, (sample, rate))| {
            let event = catalog.lookup(&sample.event_code);

            EventRow {
                event_code: sample.event_code.clone(),
                display_name: event.display_name(),
                description: event.public_description.clone(),
                rate,
                total_count: sample.total_count,
                source_file: sample.source_file.clone(),
                hot: threshold.is_hot(rate, reference_rate),
                reference: position == 0,
            }
        })
        .collect::<Vec<_>>();

    // sort_by is stable, equal rates keep the recorded order
    rows.sort_by(|a, b| b.rate.total_cmp(&a.rate));

    EventTable {
        reference_rate,
        threshold,
        boundary: threshold.boundary(reference_rate),
        rows,
    }
}
