use latcheck_common::{LatencyQuery, LatencyReport, RegionSummary, Result};
use tracing::debug;

use crate::config::{P95, STAT_DECIMALS};
use crate::stats::{mean, percentile, round_to};
use crate::telemetry::TelemetryRecord;

/// Groups telemetry by requested region and summarizes each group.
/// Borrows the records; aggregation never mutates them.
pub struct RegionAggregator<'a> {
    records: &'a [TelemetryRecord],
}

impl<'a> RegionAggregator<'a> {
    pub fn new(records: &'a [TelemetryRecord]) -> Self {
        Self { records }
    }

    /// Build a report with one entry per requested region, including regions
    /// nothing matched. Fails only when the region list is empty.
    pub fn aggregate(&self, query: &LatencyQuery) -> Result<LatencyReport> {
        query.validate()?;

        let mut report = LatencyReport::default();
        for region in &query.regions {
            if report.regions.contains_key(region) {
                continue;
            }
            let summary = self.summarize(region, query.threshold_ms);
            debug!(region = %region, samples = summary.samples, breaches = summary.breaches, "summarized region");
            report.regions.insert(region.clone(), summary);
        }
        Ok(report)
    }

    /// Summary for a single region, matched case-insensitively.
    pub fn summarize(&self, region: &str, threshold_ms: f64) -> RegionSummary {
        let wanted = region.to_lowercase();
        let matched: Vec<&TelemetryRecord> =
            self.records.iter().filter(|r| r.region.to_lowercase() == wanted).collect();

        let latencies: Vec<f64> = matched.iter().filter_map(|r| r.latency_ms).collect();
        let uptimes: Vec<f64> = matched.iter().filter_map(|r| r.uptime_pct).collect();

        let rounded = |v: Option<f64>| v.map(|x| round_to(x, STAT_DECIMALS));

        RegionSummary {
            avg_latency: rounded(mean(&latencies)),
            p95_latency: rounded(percentile(&latencies, P95)),
            avg_uptime: rounded(mean(&uptimes)),
            breaches: latencies.iter().filter(|&&v| v > threshold_ms).count() as u64,
            samples: matched.len() as u64,
        }
    }
}
