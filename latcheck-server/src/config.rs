/// Percentile reported as `p95_latency`.
pub const P95: f64 = 0.95;

/// Decimal places kept on every reported statistic.
pub const STAT_DECIMALS: i32 = 3;

/// Route served by the aggregation handler.
pub const CHECK_LATENCY_PATH: &str = "/check-latency";

/// Address the binary binds to when `--address` is not given.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";

/// Telemetry file the binary reads when `--telemetry` is not given.
pub const DEFAULT_TELEMETRY_PATH: &str = "telemetry.json";
