//! Selection policies over upstream time series.
//!
//! Open-Meteo returns column-oriented blocks (`hourly`, `daily`) where every
//! variable is an array aligned with the block's `time` array. NASA POWER
//! returns a map from `YYYYMMDDHH` keys to values. Both are normalised into a
//! [`TimeSeries`] before any policy is applied.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde_json::Value;

/// NASA POWER marks missing samples with -999.
const NASA_FILL_VALUE: f64 = -999.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("missing data: block `{0}` not present in upstream payload")]
    MissingBlock(String),
    #[error("missing data: series `{0}` absent or empty")]
    MissingSeries(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub name: String,
    /// Chronologically ascending; may be empty when the block carries no `time`.
    pub times: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// A value picked by [`TimeSeries::current_reading`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub index: usize,
    pub timestamp: Option<String>,
    pub value: f64,
    /// False when the slot label was not found and the last index was used.
    pub exact_match: bool,
}

fn numeric(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

impl TimeSeries {
    /// Reads `series` from an Open-Meteo block such as `hourly` or `daily`.
    pub fn from_block(payload: &Value, block: &str, series: &str) -> Result<Self, SeriesError> {
        let block_value = payload
            .get(block)
            .filter(|b| b.is_object())
            .ok_or_else(|| SeriesError::MissingBlock(block.to_string()))?;

        let values: Vec<Option<f64>> = block_value
            .get(series)
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(numeric).collect())
            .unwrap_or_default();
        if values.is_empty() {
            return Err(SeriesError::MissingSeries(series.to_string()));
        }

        let times = block_value
            .get("time")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { name: series.to_string(), times, values })
    }

    /// Reads `properties.parameter.<series>` from a NASA POWER payload.
    pub fn from_nasa_power(payload: &Value, series: &str) -> Result<Self, SeriesError> {
        let parameters = payload
            .pointer("/properties/parameter")
            .filter(|p| p.is_object())
            .ok_or_else(|| SeriesError::MissingBlock("properties.parameter".to_string()))?;

        let map = parameters
            .get(series)
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| SeriesError::MissingSeries(series.to_string()))?;

        let mut entries: Vec<(&String, &Value)> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let (times, values) = entries
            .into_iter()
            .map(|(k, v)| (k.clone(), numeric(v).filter(|x| *x > NASA_FILL_VALUE)))
            .unzip();

        Ok(Self { name: series.to_string(), times, values })
    }

    /// Last finite value scanning from the end, or `None` if every entry is null.
    pub fn latest_valid(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }

    /// Sum of the first `n` entries (fewer if the series is shorter).
    /// Any null inside the window makes the whole sum "no value".
    pub fn windowed_sum(&self, n: usize) -> Option<f64> {
        let window = &self.values[..n.min(self.values.len())];
        if window.is_empty() {
            return None;
        }
        window.iter().copied().sum::<Option<f64>>()
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().flatten().copied().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().flatten().copied().reduce(f64::min)
    }

    /// Index of `slot` in `times`, falling back to the last index.
    /// Returns `(index, exact_match)`.
    pub fn current_index(&self, slot: &str) -> Option<(usize, bool)> {
        if self.values.is_empty() {
            return None;
        }
        match self.times.iter().position(|t| t == slot) {
            Some(i) if i < self.values.len() => Some((i, true)),
            _ => Some((self.values.len() - 1, false)),
        }
    }

    /// Value for the current slot.
    ///
    /// A zero or missing value at the slot is treated as "not reported yet":
    /// the most recent earlier non-zero value is used instead. A zero is only
    /// returned when nothing earlier is non-zero.
    pub fn current_reading(&self, slot: &str) -> Option<Reading> {
        let (index, exact_match) = self.current_index(slot)?;
        let non_zero = |i: &usize| matches!(self.values[*i], Some(v) if v != 0.0);

        let picked = (0..=index).rev().find(non_zero).unwrap_or(index);
        let value = self.values[picked]?;

        Some(Reading {
            index: picked,
            timestamp: self.times.get(picked).cloned(),
            value,
            exact_match,
        })
    }
}

fn local_time(now: DateTime<Utc>, utc_offset_seconds: i32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(utc_offset_seconds).unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset)
}

/// Current hourly slot label in the location's timezone, formatted the way
/// Open-Meteo formats its `time` arrays.
pub fn open_meteo_slot(now: DateTime<Utc>, utc_offset_seconds: i32) -> String {
    local_time(now, utc_offset_seconds).format("%Y-%m-%dT%H:00").to_string()
}

/// Today's date at the location.
pub fn local_date(now: DateTime<Utc>, utc_offset_seconds: i32) -> NaiveDate {
    local_time(now, utc_offset_seconds).date_naive()
}

/// Current slot label for NASA POWER hourly data requested in UTC.
pub fn nasa_power_slot(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H").to_string()
}

/// `utc_offset_seconds` from an Open-Meteo payload, UTC when absent.
pub fn utc_offset_seconds(payload: &Value) -> i32 {
    payload
        .get("utc_offset_seconds")
        .and_then(Value::as_i64)
        .and_then(|s| i32::try_from(s).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn series(values: Vec<Option<f64>>) -> TimeSeries {
        let times = (0..values.len()).map(|h| format!("2025-06-21T{:02}:00", h)).collect();
        TimeSeries { name: "x".into(), times, values }
    }

    #[test]
    fn test_from_block_reads_aligned_series() {
        let payload = json!({
            "hourly": {
                "time": ["2025-06-21T00:00", "2025-06-21T01:00", "2025-06-21T02:00"],
                "temperature_2m": [12.5, null, "n/a"]
            }
        });
        let ts = TimeSeries::from_block(&payload, "hourly", "temperature_2m").unwrap();
        assert_eq!(ts.times.len(), 3);
        assert_eq!(ts.values, vec![Some(12.5), None, None]);
    }

    #[test]
    fn test_missing_block_and_empty_series_are_errors() {
        let payload = json!({ "hourly": { "time": [], "precipitation": [] } });
        assert_eq!(
            TimeSeries::from_block(&payload, "daily", "precipitation"),
            Err(SeriesError::MissingBlock("daily".into()))
        );
        assert_eq!(
            TimeSeries::from_block(&payload, "hourly", "precipitation"),
            Err(SeriesError::MissingSeries("precipitation".into()))
        );
        assert_eq!(
            TimeSeries::from_block(&payload, "hourly", "windspeed_10m"),
            Err(SeriesError::MissingSeries("windspeed_10m".into()))
        );
    }

    #[test]
    fn test_all_null_is_no_value_not_error() {
        let payload = json!({ "hourly": { "time": ["a", "b"], "soil_moisture_0_1cm": [null, null] } });
        let ts = TimeSeries::from_block(&payload, "hourly", "soil_moisture_0_1cm").unwrap();
        assert_eq!(ts.latest_valid(), None);
    }

    #[test]
    fn test_latest_valid_skips_trailing_nulls() {
        let ts = series(vec![Some(1.0), Some(2.0), None, None]);
        assert_eq!(ts.latest_valid(), Some(2.0));
    }

    #[test]
    fn test_windowed_sum_requires_numeric_window() {
        let ts = series(vec![Some(1.0), Some(2.5), None, Some(4.0)]);
        assert_eq!(ts.windowed_sum(1), Some(1.0));
        assert_eq!(ts.windowed_sum(2), Some(3.5));
        assert_eq!(ts.windowed_sum(3), None);
        assert_eq!(ts.windowed_sum(0), None);
    }

    #[test]
    fn test_windowed_sum_shorter_series_uses_what_exists() {
        let ts = series(vec![Some(1.0), Some(2.0)]);
        assert_eq!(ts.windowed_sum(24), Some(3.0));
    }

    #[test]
    fn test_min_max_ignore_nulls() {
        let ts = series(vec![Some(14.0), None, Some(-2.0), Some(31.5)]);
        assert_eq!(ts.max(), Some(31.5));
        assert_eq!(ts.min(), Some(-2.0));
    }

    #[test]
    fn test_current_index_exact_and_fallback() {
        let ts = series(vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(ts.current_index("2025-06-21T01:00"), Some((1, true)));
        assert_eq!(ts.current_index("2031-01-01T00:00"), Some((2, false)));
    }

    #[test]
    fn test_current_reading_rescans_past_zero() {
        let ts = series(vec![Some(0.0), Some(350.0), Some(410.0), Some(0.0), None]);
        let r = ts.current_reading("2025-06-21T04:00").unwrap();
        assert_eq!(r.index, 2);
        assert_eq!(r.value, 410.0);
        assert_eq!(r.timestamp.as_deref(), Some("2025-06-21T02:00"));
        assert!(r.exact_match);
    }

    #[test]
    fn test_current_reading_keeps_genuine_zero() {
        let ts = series(vec![Some(0.0), Some(0.0), Some(0.0)]);
        let r = ts.current_reading("2025-06-21T01:00").unwrap();
        assert_eq!(r.index, 1);
        assert_eq!(r.value, 0.0);
    }

    #[test]
    fn test_current_reading_all_missing_is_none() {
        let ts = series(vec![None, None]);
        assert_eq!(ts.current_reading("2025-06-21T01:00"), None);
    }

    #[test]
    fn test_nasa_power_sorted_and_fill_filtered() {
        let payload = json!({
            "properties": { "parameter": { "ALLSKY_SFC_SW_DWN": {
                "2025062112": 640.2,
                "2025062110": 410.0,
                "2025062111": -999.0
            } } }
        });
        let ts = TimeSeries::from_nasa_power(&payload, "ALLSKY_SFC_SW_DWN").unwrap();
        assert_eq!(ts.times, vec!["2025062110", "2025062111", "2025062112"]);
        assert_eq!(ts.values, vec![Some(410.0), None, Some(640.2)]);
    }

    #[test]
    fn test_nasa_power_missing_parameter() {
        let payload = json!({ "properties": { "parameter": {} } });
        assert!(matches!(
            TimeSeries::from_nasa_power(&payload, "ALLSKY_SFC_SW_DWN"),
            Err(SeriesError::MissingSeries(_))
        ));
        assert!(matches!(
            TimeSeries::from_nasa_power(&json!({}), "ALLSKY_SFC_SW_DWN"),
            Err(SeriesError::MissingBlock(_))
        ));
    }

    #[test]
    fn test_slot_labels() {
        let now = Utc.with_ymd_and_hms(2025, 6, 21, 22, 45, 10).unwrap();
        // IST is +05:30 → 04:15 next day
        assert_eq!(open_meteo_slot(now, 19800), "2025-06-22T04:00");
        assert_eq!(open_meteo_slot(now, 0), "2025-06-21T22:00");
        assert_eq!(nasa_power_slot(now), "2025062122");
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 6, 21, 22, 45, 10).unwrap();
        assert_eq!(local_date(now, 19800), NaiveDate::from_ymd_opt(2025, 6, 22).unwrap());
        // UTC-07:00 is still the 21st
        assert_eq!(local_date(now, -25200), NaiveDate::from_ymd_opt(2025, 6, 21).unwrap());
        assert_eq!(local_date(now, 0), NaiveDate::from_ymd_opt(2025, 6, 21).unwrap());
    }

    #[test]
    fn test_utc_offset_defaults_to_zero() {
        assert_eq!(utc_offset_seconds(&json!({ "utc_offset_seconds": 19800 })), 19800);
        assert_eq!(utc_offset_seconds(&json!({})), 0);
    }
}
