//! Bounded time-series history for charting.
//!
//! Successive accepted metrics snapshots are folded into a capped FIFO of
//! [`HistoryPoint`]s. Each point is sparse: an entity missing from a
//! snapshot simply has no keys in that point (absent means "no data",
//! never zero), and older points are left untouched.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use chrono::Local;
use serde::Serialize;

/// Default number of historical points to keep (matches the dashboard's
/// 30-point charts).
pub const DEFAULT_HISTORY_POINTS: usize = 30;

/// One measured quantity set, keyed per entity.
///
/// Implemented by snapshot types whose per-entity numeric fields should be
/// charted over time.
pub trait MetricSample {
    /// Key identifying the entity (e.g. the pod name).
    fn entity_key(&self) -> &str;

    /// The numeric fields to chart, as `(field name, value)` pairs.
    fn values(&self) -> Vec<(&'static str, f64)>;
}

/// One time-stamped point of the series.
///
/// Value keys are namespaced `{entity}_{field}` so entities chart
/// independently without collision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    /// Wall-clock stamp (HH:MM:SS) taken when the snapshot was observed.
    pub timestamp: String,
    /// Sparse mapping from namespaced key to value.
    pub values: BTreeMap<String, f64>,
}

/// Bounded FIFO of history points.
///
/// Insertion is append-then-trim-from-front; the buffer always holds the
/// most recent points in chronological order and never exceeds capacity.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a point, evicting from the front if over capacity.
    pub fn push(&mut self, point: HistoryPoint) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The buffer contents, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    /// Owned copy of the buffer contents, oldest first.
    pub fn to_vec(&self) -> Vec<HistoryPoint> {
        self.points.iter().cloned().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_POINTS)
    }
}

/// Folds accepted metrics snapshots into a [`HistoryBuffer`].
///
/// Single writer, multiple readers: `observe` is called once per accepted
/// snapshot from the metrics poller, while any number of consumers take
/// consistent copies with [`snapshot`](TimeSeriesAggregator::snapshot).
/// The buffer is consumed as a value, not a stream.
#[derive(Debug)]
pub struct TimeSeriesAggregator {
    buffer: Mutex<HistoryBuffer>,
}

impl TimeSeriesAggregator {
    /// Create an aggregator keeping at most `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(HistoryBuffer::new(capacity)),
        }
    }

    /// Record one accepted snapshot as a new history point.
    pub fn observe<S: MetricSample>(&self, samples: &[S]) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.observe_at(timestamp, samples);
    }

    fn observe_at<S: MetricSample>(&self, timestamp: String, samples: &[S]) {
        let mut values = BTreeMap::new();
        for sample in samples {
            for (field, value) in sample.values() {
                values.insert(format!("{}_{}", sample.entity_key(), field), value);
            }
        }

        let mut buffer = self.buffer.lock().unwrap();
        buffer.push(HistoryPoint { timestamp, values });
    }

    /// Number of points currently held.
    pub fn len(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().unwrap().is_empty()
    }

    /// A consistent copy of the whole series, oldest first.
    pub fn snapshot(&self) -> Vec<HistoryPoint> {
        self.buffer.lock().unwrap().to_vec()
    }
}

impl Default for TimeSeriesAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_POINTS)
    }
}
