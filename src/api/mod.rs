//! Backend API surface.
//!
//! The PulseCheck backend exposes a family of read-only snapshot endpoints;
//! this module provides the typed [`ApiClient`] for calling them and the
//! payload types they return. From the synchronization core's point of view
//! each endpoint is an opaque asynchronous producer of one JSON snapshot;
//! authentication, caching, and the cluster logic behind them live on the
//! backend.

mod client;
mod error;
mod types;

pub use client::{ApiClient, ApiClientBuilder};
pub use error::ApiError;
pub use types::{
    ClusterOverview, ContainerPort, ContainerSpec, Health, MetricsSnapshot, NodeCounts,
    NodeInfo, NodeList, PodCounts, PodDetail, PodEvent, PodList, PodLogs, PodMetrics,
    PodSummary,
};
