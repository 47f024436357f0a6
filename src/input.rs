//! Forecast input files: JSON arrays of `{"time": …, "value": …}` points.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{core::series::Series, prelude::*};

#[derive(Deserialize)]
struct PointModel {
    time: DateTime<Utc>,
    value: f64,
}

/// Read a forecast series, sorting and de-duplicating the points.
pub fn read_series<V: Copy + From<f64>>(path: &Path) -> Result<Series<V>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    parse_series(&json).with_context(|| format!("failed to parse `{}`", path.display()))
}

fn parse_series<V: Copy + From<f64>>(json: &str) -> Result<Series<V>> {
    let points: Vec<PointModel> = serde_json::from_str(json)?;
    Ok(Series::from_points(
        points.into_iter().map(|point| (point.time, V::from(point.value))),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::power::Kilowatts;

    #[test]
    fn test_parse_series() {
        let series: Series<Kilowatts> = parse_series(
            r#"[
                {"time": "2026-01-05T11:00:00Z", "value": 7.5},
                {"time": "2026-01-05T10:00:00+02:00", "value": 5.0}
            ]"#,
        )
        .unwrap();

        let points: Vec<_> = series.iter().collect();
        assert_eq!(points.len(), 2);
        // 10:00+02:00 is 08:00 UTC and sorts first:
        assert_eq!(points[0].1, Kilowatts::from(5.0));
        assert_eq!(points[1].1, Kilowatts::from(7.5));
    }

    #[test]
    fn test_parse_series_rejects_garbage() {
        assert!(parse_series::<Kilowatts>("[{\"time\": 42}]").is_err());
    }
}
