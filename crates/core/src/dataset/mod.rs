//! In-memory dataset store and the per-selection series window.
//!
//! A [`Dataset`] holds every row that was ingested. Selecting a subject and a
//! metric produces a [`SeriesWindow`]: the time-sorted, timestamp-unique view
//! the playback engine walks through.

use std::{cmp::Ordering, collections::BTreeMap, io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::{mapping::ValueRange, CognifyError, Result};

mod csv_source;

const DEFAULT_NOMINAL_STEP: f64 = 10.0;

/// Subject assigned to rows of files that carry no subject column.
pub const DEFAULT_SUBJECT: &str = "all";

/// A single cell of a metric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    Number(f64),
    Category(String),
}

impl MetricValue {
    /// Interprets a raw cell. Empty cells carry no value at all.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Some(Self::Number(number)),
            _ => Some(Self::Category(trimmed.to_string())),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: f64,
    pub subject: String,
    pub values: BTreeMap<String, MetricValue>,
}

impl DataPoint {
    pub fn new(timestamp: f64, subject: impl Into<String>) -> Self {
        Self {
            timestamp,
            subject: subject.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, metric: impl Into<String>, value: MetricValue) -> Self {
        self.values.insert(metric.into(), value);
        self
    }
}

/// Numeric value of `metric` on `point`.
///
/// Returns `None` when the metric is missing, categorical, or not finite.
pub fn metric_value(point: &DataPoint, metric: &str) -> Option<f64> {
    point.values.get(metric).and_then(MetricValue::as_number)
}

/// Every ingested row plus the metric columns in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<DataPoint>,
    metrics: Vec<String>,
}

impl Dataset {
    pub fn new(rows: Vec<DataPoint>, metrics: Vec<String>) -> Self {
        Self { rows, metrics }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        csv_source::read(reader)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn rows(&self) -> &[DataPoint] {
        &self.rows
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted, de-duplicated subject names.
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self.rows.iter().map(|row| row.subject.clone()).collect();
        subjects.sort();
        subjects.dedup();
        subjects
    }

    pub fn row_count(&self, subject: &str) -> usize {
        self.rows.iter().filter(|row| row.subject == subject).count()
    }

    /// Builds the playback window for one subject and metric.
    pub fn window(&self, subject: &str, metric: &str) -> Result<SeriesWindow> {
        if !self.metrics.iter().any(|known| known == metric) {
            return Err(CognifyError::UnknownSelection {
                kind: "metric",
                name: metric.to_string(),
            });
        }
        if !self.rows.iter().any(|row| row.subject == subject) {
            return Err(CognifyError::UnknownSelection {
                kind: "subject",
                name: subject.to_string(),
            });
        }

        let points = self
            .rows
            .iter()
            .filter(|row| row.subject == subject && row.values.contains_key(metric))
            .cloned()
            .collect();

        Ok(SeriesWindow::new(metric, points))
    }
}

/// Time-sorted view over the active subject and metric.
#[derive(Debug, Clone, Default)]
pub struct SeriesWindow {
    metric: String,
    points: Vec<DataPoint>,
}

impl SeriesWindow {
    /// Sorts `points` by timestamp and keeps the last point of every
    /// duplicated timestamp. Points with a non-finite timestamp are dropped.
    pub fn new(metric: impl Into<String>, points: Vec<DataPoint>) -> Self {
        let mut points: Vec<DataPoint> = points
            .into_iter()
            .filter(|point| point.timestamp.is_finite())
            .collect();
        // Stable sort keeps file order inside equal timestamps.
        points.sort_by(|a, b| a.timestamp.partial_cmp(&b.timestamp).unwrap_or(Ordering::Equal));

        let mut unique: Vec<DataPoint> = Vec::with_capacity(points.len());
        for point in points {
            let duplicate = unique
                .last()
                .is_some_and(|last| last.timestamp == point.timestamp);
            if duplicate {
                unique.pop();
            }
            unique.push(point);
        }

        Self {
            metric: metric.into(),
            points: unique,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Shifts every timestamp so the first point sits at zero.
    pub fn rebased(mut self) -> Self {
        if let Some(origin) = self.points.first().map(|point| point.timestamp) {
            for point in &mut self.points {
                point.timestamp -= origin;
            }
        }
        self
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point_at(&self, index: usize) -> Option<&DataPoint> {
        self.points.get(index)
    }

    /// Timestamp of the last point, or zero for an empty window.
    pub fn max_time(&self) -> f64 {
        self.points
            .last()
            .map(|point| point.timestamp.max(0.0))
            .unwrap_or(0.0)
    }

    pub fn timestamp_range(&self) -> Option<(f64, f64)> {
        Some((self.points.first()?.timestamp, self.points.last()?.timestamp))
    }

    /// Spacing between the first two points, used as the native sample step.
    pub fn nominal_step(&self) -> f64 {
        match self.points.as_slice() {
            [first, second, ..] => second.timestamp - first.timestamp,
            _ => DEFAULT_NOMINAL_STEP,
        }
    }

    /// Index of the point whose timestamp is nearest to `time`.
    pub fn index_at(&self, time: f64) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }
        if !time.is_finite() {
            return Some(0);
        }

        match self
            .points
            .binary_search_by(|point| point.timestamp.partial_cmp(&time).unwrap_or(Ordering::Equal))
        {
            Ok(index) => Some(index),
            Err(0) => Some(0),
            Err(index) if index >= self.points.len() => Some(self.points.len() - 1),
            Err(index) => {
                let before = time - self.points[index - 1].timestamp;
                let after = self.points[index].timestamp - time;
                Some(if after < before { index } else { index - 1 })
            }
        }
    }

    pub fn value_at(&self, time: f64) -> Option<f64> {
        let point = self.point_at(self.index_at(time)?)?;
        metric_value(point, &self.metric)
    }

    /// Minimum and maximum of the finite numeric values of the metric.
    pub fn value_range(&self) -> Option<ValueRange> {
        self.points
            .iter()
            .filter_map(|point| metric_value(point, &self.metric))
            .fold(None, |range: Option<ValueRange>, value| match range {
                None => Some(ValueRange::new(value, value)),
                Some(range) => Some(ValueRange::new(range.min.min(value), range.max.max(value))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: f64, value: f64) -> DataPoint {
        DataPoint::new(timestamp, "s1").with_value("hr", MetricValue::Number(value))
    }

    #[test]
    fn window_sorts_and_keeps_last_duplicate() {
        let window = SeriesWindow::new(
            "hr",
            vec![point(20.0, 3.0), point(0.0, 1.0), point(10.0, 2.0), point(10.0, 9.0)],
        );

        let stamps: Vec<f64> = window.points().iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![0.0, 10.0, 20.0]);
        assert_eq!(window.value_at(10.0), Some(9.0));
        assert_eq!(window.max_time(), 20.0);
        assert_eq!(window.nominal_step(), 10.0);
    }

    #[test]
    fn empty_window_defaults() {
        let window = SeriesWindow::empty();
        assert_eq!(window.max_time(), 0.0);
        assert_eq!(window.nominal_step(), 10.0);
        assert_eq!(window.index_at(5.0), None);
        assert!(window.value_range().is_none());
    }

    #[test]
    fn index_at_picks_nearest_point() {
        let points = vec![point(0.0, 1.0), point(10.0, 2.0), point(20.0, 3.0)];
        let window = SeriesWindow::new("hr", points);

        assert_eq!(window.index_at(-4.0), Some(0));
        assert_eq!(window.index_at(4.0), Some(0));
        assert_eq!(window.index_at(5.0), Some(0));
        assert_eq!(window.index_at(6.0), Some(1));
        assert_eq!(window.index_at(500.0), Some(2));
    }

    #[test]
    fn categorical_and_missing_metrics_have_no_value() {
        let categorical =
            DataPoint::new(0.0, "s1").with_value("mood", MetricValue::Category("calm".into()));

        assert_eq!(metric_value(&categorical, "mood"), None);
        assert_eq!(metric_value(&categorical, "hr"), None);
        assert_eq!(MetricValue::parse(" 72.5 "), Some(MetricValue::Number(72.5)));
        assert_eq!(MetricValue::parse("NaN"), Some(MetricValue::Category("NaN".into())));
        assert_eq!(MetricValue::parse("   "), None);
    }

    #[test]
    fn value_range_skips_non_numeric_cells() {
        let mut points = vec![point(0.0, 60.0), point(1.0, 90.0)];
        let missing = MetricValue::Category("n/a".into());
        points.push(DataPoint::new(2.0, "s1").with_value("hr", missing));
        let window = SeriesWindow::new("hr", points);

        let range = window.value_range().unwrap();
        assert_eq!((range.min, range.max), (60.0, 90.0));
    }

    #[test]
    fn rebased_window_starts_at_zero() {
        let window =
            SeriesWindow::new("hr", vec![point(1_000.0, 1.0), point(1_030.0, 2.0)]).rebased();
        assert_eq!(window.timestamp_range(), Some((0.0, 30.0)));
        assert_eq!(window.max_time(), 30.0);
    }

    #[test]
    fn dataset_window_rejects_unknown_selection() {
        let dataset = Dataset::new(vec![point(0.0, 1.0)], vec!["hr".into()]);

        assert!(matches!(
            dataset.window("s2", "hr"),
            Err(CognifyError::UnknownSelection { kind: "subject", .. })
        ));
        assert!(matches!(
            dataset.window("s1", "eda"),
            Err(CognifyError::UnknownSelection { kind: "metric", .. })
        ));
        assert_eq!(dataset.window("s1", "hr").unwrap().len(), 1);
    }
}
