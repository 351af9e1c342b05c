use serde::Serialize;

/// Number of severity tiers used for triage.
pub const SEVERITY_LEVELS: u8 = 4;

pub const DEFAULT_THRESHOLD: u32 = 2;

/// Severity tier in `0..SEVERITY_LEVELS`, 0 being the coldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SeverityBucket(u8);

impl SeverityBucket {
    pub const COLD: SeverityBucket = SeverityBucket(0);
    pub const HOTTEST: SeverityBucket = SeverityBucket(SEVERITY_LEVELS - 1);

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn is_cold(self) -> bool {
        self == Self::COLD
    }

    /// Buckets `value` relative to `max_value`.
    ///
    /// A zero (or otherwise unusable) maximum always yields the cold bucket.
    pub fn proportional(value: f64, max_value: f64) -> Self {
        if max_value.is_nan() || max_value <= 0.0 || !value.is_finite() {
            return Self::COLD;
        }

        let scaled = (value / max_value * SEVERITY_LEVELS as f64).floor();
        let level = scaled.clamp(0.0, (SEVERITY_LEVELS - 1) as f64);
        SeverityBucket(level as u8)
    }
}

/// Flags events whose rate stands out against the reference event.
///
/// With reference rate `R` and threshold `T`, an event is hot when its rate
/// exceeds `(R / 100)^(1 / T) * 100`. Larger thresholds relax the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HotThreshold(u32);

impl HotThreshold {
    pub fn new(threshold: u32) -> Self {
        HotThreshold(threshold.max(1))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn boundary(self, reference_rate: f64) -> f64 {
        (reference_rate / 100.0).powf(1.0 / self.0 as f64) * 100.0
    }

    pub fn is_hot(self, rate: f64, reference_rate: f64) -> bool {
        rate > self.boundary(reference_rate)
    }
}

impl Default for HotThreshold {
    fn default() -> Self {
        HotThreshold(DEFAULT_THRESHOLD)
    }
}
