//! Time-series folding of accepted snapshots.
//!
//! Point-in-time metrics snapshots have no temporal depth on their own;
//! this module folds them into a bounded, keyed series usable for charting.
//!
//! ```text
//! MetricsSnapshot (accepted by the metrics Poller)
//!        │
//!        ▼
//! TimeSeriesAggregator::observe()
//!        │
//!        └──▶ HistoryBuffer (FIFO, ≤ N points, sparse entity keys)
//! ```

mod history;

pub use history::{
    HistoryBuffer, HistoryPoint, MetricSample, TimeSeriesAggregator, DEFAULT_HISTORY_POINTS,
};
