//! Composition of pollers into the dashboard's resource set.
//!
//! A [`Dashboard`] owns one poller per main-page resource (cluster summary,
//! pods, metrics, nodes) plus the metrics history; a [`PodView`] owns the
//! pod-detail page's pair (detail, logs). Pollers are fully independent:
//! each keeps its own cadence and error, and stopping one never disturbs
//! another's timer. Presentation reads state through the accessors here and
//! never talks to the network itself.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::api::{
    ApiClient, ClusterOverview, MetricsSnapshot, NodeList, PodDetail, PodList, PodLogs,
};
use crate::data::{HistoryPoint, TimeSeriesAggregator};
use crate::settings::Settings;
use crate::sync::{first_error, MergedError, Poller, ResourceState};

/// Forward a metrics poller's accepted snapshots into the aggregator.
///
/// The task ends on its own once the poller is dropped and the channel
/// closes.
fn attach_history(
    poller: &Poller<MetricsSnapshot>,
    history: Arc<TimeSeriesAggregator>,
) -> JoinHandle<()> {
    let mut rx = poller.updates();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if let Some(snapshot) = snapshot {
                history.observe(&snapshot.metrics);
            }
        }
    })
}

/// The main page's polled resources.
///
/// # Example
///
/// ```rust,no_run
/// use pulsecheck::{ApiClient, Dashboard, Settings};
///
/// # tokio_test::block_on(async {
/// let client = ApiClient::builder().endpoint("http://localhost:8000").build();
/// let dashboard = Dashboard::start(client, &Settings::default());
///
/// // ... later, from the render loop:
/// let cluster = dashboard.cluster();
/// if let Some(overview) = cluster.data {
///     println!("{} pods", overview.pods.total);
/// }
/// if let Some(err) = dashboard.current_error() {
///     eprintln!("Connection issue: {}", err);
/// }
///
/// dashboard.stop();
/// # });
/// ```
pub struct Dashboard {
    cluster: Poller<ClusterOverview>,
    pods: Poller<PodList>,
    metrics: Poller<MetricsSnapshot>,
    nodes: Poller<NodeList>,
    history: Arc<TimeSeriesAggregator>,
    history_task: JoinHandle<()>,
}

impl Dashboard {
    /// Start all four pollers with the configured cadences. Each dispatches
    /// its first fetch immediately.
    pub fn start(client: ApiClient, settings: &Settings) -> Self {
        let cluster = {
            let client = client.clone();
            Poller::start(
                "cluster",
                move || {
                    let client = client.clone();
                    async move { client.cluster().await }
                },
                settings.intervals.cluster(),
            )
        };

        let pods = {
            let client = client.clone();
            Poller::start(
                "pods",
                move || {
                    let client = client.clone();
                    async move { client.pods().await }
                },
                settings.intervals.pods(),
            )
        };

        let metrics = {
            let client = client.clone();
            Poller::start(
                "metrics",
                move || {
                    let client = client.clone();
                    async move { client.metrics().await }
                },
                settings.intervals.metrics(),
            )
        };

        let nodes = Poller::start(
            "nodes",
            move || {
                let client = client.clone();
                async move { client.nodes().await }
            },
            settings.intervals.nodes(),
        );

        let history = Arc::new(TimeSeriesAggregator::new(settings.history_points));
        let history_task = attach_history(&metrics, Arc::clone(&history));

        Self {
            cluster,
            pods,
            metrics,
            nodes,
            history,
            history_task,
        }
    }

    pub fn cluster(&self) -> ResourceState<ClusterOverview> {
        self.cluster.state()
    }

    pub fn pods(&self) -> ResourceState<PodList> {
        self.pods.state()
    }

    pub fn metrics(&self) -> ResourceState<MetricsSnapshot> {
        self.metrics.state()
    }

    pub fn nodes(&self) -> ResourceState<NodeList> {
        self.nodes.state()
    }

    /// The metrics history, oldest point first.
    pub fn history(&self) -> Vec<HistoryPoint> {
        self.history.snapshot()
    }

    /// The single error to display, if any resource is currently failing.
    ///
    /// Precedence: cluster, then pods, then metrics, then nodes.
    pub fn current_error(&self) -> Option<MergedError> {
        first_error(&[
            ("cluster", self.cluster.error()),
            ("pods", self.pods.error()),
            ("metrics", self.metrics.error()),
            ("nodes", self.nodes.error()),
        ])
    }

    /// Stop every poller. Idempotent; in-flight results are discarded.
    pub fn stop(&self) {
        self.cluster.stop();
        self.pods.stop();
        self.metrics.stop();
        self.nodes.stop();
        self.history_task.abort();
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The pod-detail page's polled resources: detail plus tailing logs.
pub struct PodView {
    detail: Poller<PodDetail>,
    logs: Poller<PodLogs>,
}

impl PodView {
    /// Start polling one pod's detail and logs.
    pub fn start(client: ApiClient, pod: &str, settings: &Settings) -> Self {
        let detail = {
            let client = client.clone();
            let pod = pod.to_string();
            Poller::start(
                "pod-detail",
                move || {
                    let client = client.clone();
                    let pod = pod.clone();
                    async move { client.pod(&pod).await }
                },
                settings.intervals.pod_detail(),
            )
        };

        let logs = {
            let pod = pod.to_string();
            let tail = settings.log_tail;
            Poller::start(
                "pod-logs",
                move || {
                    let client = client.clone();
                    let pod = pod.clone();
                    async move { client.logs(&pod, tail).await }
                },
                settings.intervals.logs(),
            )
        };

        Self { detail, logs }
    }

    pub fn detail(&self) -> ResourceState<PodDetail> {
        self.detail.state()
    }

    pub fn logs(&self) -> ResourceState<PodLogs> {
        self.logs.state()
    }

    /// Detail errors take precedence over log errors.
    pub fn current_error(&self) -> Option<MergedError> {
        first_error(&[
            ("pod-detail", self.detail.error()),
            ("pod-logs", self.logs.error()),
        ])
    }

    pub fn stop(&self) {
        self.detail.stop();
        self.logs.stop();
    }
}
