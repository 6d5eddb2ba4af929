use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::{DataPoint, Dataset, MetricValue, DEFAULT_SUBJECT};
use crate::{CognifyError, Result};

const TIME_COLUMNS: &[&str] = &["timestamp", "time", "t", "seconds", "elapsed"];
const SUBJECT_COLUMNS: &[&str] = &["subject", "participant", "driver", "id", "user"];

/// Role of every header column after inference.
#[derive(Debug)]
struct Columns {
    time: usize,
    subject: Option<usize>,
    metrics: Vec<(usize, String)>,
}

impl Columns {
    fn infer(headers: &StringRecord) -> Result<Self> {
        if headers.is_empty() || headers.iter().all(|name| name.is_empty()) {
            return Err(CognifyError::InvalidInput("csv file has no header row"));
        }

        let find = |candidates: &[&str]| {
            headers
                .iter()
                .position(|name| candidates.iter().any(|c| name.eq_ignore_ascii_case(c)))
        };

        let time = find(TIME_COLUMNS).unwrap_or(0);
        let subject = find(SUBJECT_COLUMNS).filter(|&index| index != time);
        let metrics = headers
            .iter()
            .enumerate()
            .filter(|(index, name)| *index != time && Some(*index) != subject && !name.is_empty())
            .map(|(index, name)| (index, name.to_string()))
            .collect();

        Ok(Self {
            time,
            subject,
            metrics,
        })
    }

    fn point(&self, record: &StringRecord) -> Option<DataPoint> {
        let timestamp = record.get(self.time)?.trim().parse::<f64>().ok()?;
        if !timestamp.is_finite() {
            return None;
        }

        let subject = self
            .subject
            .and_then(|index| record.get(index))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SUBJECT);

        let mut point = DataPoint::new(timestamp, subject);
        for (index, name) in &self.metrics {
            if let Some(value) = record.get(*index).and_then(MetricValue::parse) {
                point.values.insert(name.clone(), value);
            }
        }
        Some(point)
    }
}

pub(super) fn read<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::infer(reader.headers()?)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        match columns.point(&record) {
            Some(point) => rows.push(point),
            // Header is line 1, so the first record is line 2.
            None => tracing::warn!(line = line + 2, "skipping row without a numeric timestamp"),
        }
    }

    if rows.is_empty() {
        return Err(CognifyError::InvalidInput("csv file has no usable data rows"));
    }

    let metrics = columns.metrics.into_iter().map(|(_, name)| name).collect();
    Ok(Dataset::new(rows, metrics))
}
