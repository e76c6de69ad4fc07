use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// One telemetry sample. Only `region` is required; numeric fields that are
/// absent stay `None` and are left out of the statistic they feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    #[serde(default)]
    pub region: String,
    #[serde(default, deserialize_with = "or_absent", skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub uptime_pct: Option<f64>,
    #[serde(default, deserialize_with = "or_absent", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl TelemetryRecord {
    pub fn new(region: impl Into<String>, latency_ms: f64, uptime_pct: f64) -> Self {
        Self {
            region: region.into(),
            latency_ms: Some(latency_ms),
            uptime_pct: Some(uptime_pct),
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

/// Accepts a JSON number or a numeric string (`"129.7"`); `null` reads as absent.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Numeric>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Numeric::Number(v)) => Ok(Some(v)),
        Some(Numeric::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a number, got {:?}", s))),
    }
}

/// For fields aggregation never reads: a value of the wrong type reads as
/// absent instead of rejecting the whole record.
fn or_absent<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to read telemetry file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("telemetry is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("telemetry must be a JSON array of records")]
    NotAnArray,
}

/// Immutable telemetry collection, loaded once and shared by every request.
/// Cloning is cheap: all clones point at the same records.
#[derive(Debug, Clone)]
pub struct TelemetrySet {
    records: Arc<[TelemetryRecord]>,
}

impl TelemetrySet {
    pub fn new(records: Vec<TelemetryRecord>) -> Self {
        Self { records: records.into() }
    }

    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decode a JSON array of records. Elements that do not decode as a record
    /// are skipped with a warning; the rest of the array is kept.
    pub fn from_json_str(json: &str) -> Result<Self, TelemetryError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Array(items) = value else {
            return Err(TelemetryError::NotAnArray);
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<TelemetryRecord>(item) {
                Ok(record) => records.push(record),
                Err(error) => warn!(index, %error, "skipping undecodable telemetry record"),
            }
        }
        Ok(Self::new(records))
    }

    pub fn from_path(path: &Path) -> Result<Self, TelemetryError> {
        let json = std::fs::read_to_string(path)
            .map_err(|source| TelemetryError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&json)
    }

    /// Load `path`, or fall back to the embedded sample if it cannot be read or parsed.
    pub fn load_or_fallback(path: &Path) -> Self {
        match Self::from_path(path) {
            Ok(set) => {
                info!(path = %path.display(), records = set.len(), "loaded telemetry");
                set
            }
            Err(error) => {
                warn!(%error, "using embedded telemetry sample");
                Self::embedded_sample()
            }
        }
    }

    /// Small built-in dataset served when no telemetry file is available.
    pub fn embedded_sample() -> Self {
        let sample = |region: &str, service: &str, latency_ms: f64, uptime_pct: f64, timestamp: i64| {
            TelemetryRecord {
                region: region.to_string(),
                service: Some(service.to_string()),
                latency_ms: Some(latency_ms),
                uptime_pct: Some(uptime_pct),
                timestamp: Some(timestamp),
            }
        };
        Self::new(vec![
            sample("apac", "support", 129.73, 98.345, 20250301),
            sample("apac", "payments", 147.85, 98.423, 20250301),
            sample("apac", "catalog", 160.1, 99.0, 20250302),
            sample("emea", "support", 170.5, 97.9, 20250301),
            sample("emea", "payments", 180.2, 99.2, 20250302),
            sample("emea", "catalog", 200.0, 96.5, 20250303),
        ])
    }
}
