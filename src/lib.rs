//! # pulsecheck
//!
//! Client-side data synchronization for the PulseCheck Kubernetes dashboard.
//!
//! This crate keeps a set of remote cluster resources (overview, pods,
//! metrics, nodes, pod detail, logs) continuously fresh by polling a
//! PulseCheck backend, arbitrating out-of-order completions, and folding
//! metrics into a bounded time series suitable for charting.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Dashboard / PodView                   │
//! │  ┌──────────┐     ┌──────────┐     ┌───────────────────────┐ │
//! │  │   sync   │────▶│   data   │     │ ResourceState<T> per  │ │
//! │  │ (Poller) │     │(history) │     │ resource, read by the │ │
//! │  └────┬─────┘     └──────────┘     │ presentation layer    │ │
//! │       │                            └───────────────────────┘ │
//! │       ▼                                                      │
//! │  ┌──────────┐                                                │
//! │  │   api    │◀── HTTP (reqwest) ── PulseCheck backend        │
//! │  │ (client) │                                                │
//! │  └──────────┘                                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`api`]**: Typed HTTP client for the backend's JSON endpoints and the
//!   [`ApiError`] taxonomy
//! - **[`sync`]**: The polling core - [`Poller`] fetch loops with sequence
//!   arbitration over [`ResourceState`], plus error merging
//! - **[`data`]**: [`TimeSeriesAggregator`] folding accepted metrics
//!   snapshots into a bounded [`HistoryBuffer`]
//! - **[`dashboard`]**: [`Dashboard`] and [`PodView`], wiring pollers
//!   together per page
//! - **[`settings`]**: [`Settings`] loaded from TOML and environment
//!
//! ## Guarantees
//!
//! - **Monotonic state**: a consumer never observes a snapshot older than
//!   one it has already observed, even when fetches complete out of order
//! - **Stop is final**: after [`Poller::stop`] returns, no in-flight result
//!   mutates state
//! - **Stale over blank**: a failed fetch surfaces an error but keeps the
//!   last accepted snapshot in place
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the cluster's main-page resources
//! pulsecheck --url http://localhost:8000
//!
//! # Watch one pod's detail and logs
//! pulsecheck --pod web-7f9c --tail 50
//!
//! # One-shot export of the current state as JSON
//! pulsecheck --export state.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use pulsecheck::{ApiClient, Dashboard, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let client = ApiClient::builder().endpoint(&settings.api_url).build();
//! let dashboard = Dashboard::start(client, &settings);
//!
//! // Poll states from wherever rendering happens.
//! let pods = dashboard.pods();
//! if pods.loading {
//!     println!("loading...");
//! }
//!
//! dashboard.stop();
//! # });
//! ```
//!
//! ### A single poller
//!
//! ```no_run
//! use std::time::Duration;
//! use pulsecheck::{ApiClient, Poller};
//!
//! # tokio_test::block_on(async {
//! let client = ApiClient::builder().endpoint("http://localhost:8000").build();
//! let poller = Poller::start(
//!     "nodes",
//!     move || {
//!         let client = client.clone();
//!         async move { client.nodes().await }
//!     },
//!     Duration::from_secs(10),
//! );
//! # });
//! ```

pub mod api;
pub mod dashboard;
pub mod data;
pub mod settings;
pub mod sync;

// Re-export main types for convenience
pub use api::{
    ApiClient, ApiClientBuilder, ApiError, ClusterOverview, ContainerPort, ContainerSpec,
    Health, MetricsSnapshot, NodeCounts, NodeInfo, NodeList, PodCounts, PodDetail, PodEvent,
    PodList, PodLogs, PodMetrics, PodSummary,
};
pub use dashboard::{Dashboard, PodView};
pub use data::{
    HistoryBuffer, HistoryPoint, MetricSample, TimeSeriesAggregator, DEFAULT_HISTORY_POINTS,
};
pub use settings::{Intervals, Settings};
pub use sync::{first_error, MergedError, Poller, ResourceState};
