//! Metric unit scaling and the reason sentence.

use std::fmt;

use crate::reading::extract_reading;

const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;

/// Display rule for a metric, chosen by metric name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Bytes shown as GB (2^30).
    Gigabytes,
    /// Seconds shown as milliseconds.
    Milliseconds,
    Percent,
    Plain,
}

impl MetricUnit {
    pub fn for_metric(metric_name: &str) -> Self {
        match metric_name {
            "FreeableMemory" | "FreeLocalStorage" => Self::Gigabytes,
            "WriteLatency" | "ReadLatency" => Self::Milliseconds,
            "CPUUtilization" => Self::Percent,
            _ => Self::Plain,
        }
    }

    fn scale(self, value: f64) -> f64 {
        match self {
            Self::Gigabytes => value / BYTES_PER_GIB,
            Self::Milliseconds => value * 1000.0,
            Self::Percent | Self::Plain => value,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Gigabytes => " GB",
            Self::Milliseconds => " ms",
            Self::Percent => " %",
            Self::Plain => "",
        }
    }

    /// Render `value` with two decimals and the unit suffix.
    pub fn format(self, value: f64) -> String {
        format!("{:.2}{}", self.scale(value), self.suffix())
    }
}

/// Direction of the current value relative to the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Below,
    /// Equal values and NaN also land here.
    AtOrAbove,
}

impl Comparison {
    pub fn between(current: f64, threshold: f64) -> Self {
        if current < threshold {
            Self::Below
        } else {
            Self::AtOrAbove
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Below => f.write_str("<"),
            Self::AtOrAbove => f.write_str(">"),
        }
    }
}

/// `Current value <current> <cmp> threshold value <threshold>` for a known reading.
pub fn format_comparison(metric_name: &str, current: f64, threshold: f64) -> String {
    let unit = MetricUnit::for_metric(metric_name);
    format!(
        "Current value {} {} threshold value {}",
        unit.format(current),
        Comparison::between(current, threshold),
        unit.format(threshold)
    )
}

/// Build the reason line for a chat message.
///
/// Never fails: a reason without a reading, or a reading that cannot be
/// converted, is described in the returned text instead.
pub fn format_reason(metric_name: &str, reason_text: &str, threshold: f64) -> String {
    match extract_reading(reason_text) {
        Ok(Some(current)) => format_comparison(metric_name, current, threshold),
        Ok(None) => format!("could not parse reason: {reason_text}"),
        Err(e) => {
            tracing::warn!(error = %e, reason = reason_text, "failed to convert reason reading");
            format!("error parsing reason: {e}")
        }
    }
}
