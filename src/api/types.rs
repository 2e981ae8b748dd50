//! Payload types for the PulseCheck backend API.
//!
//! These types match the JSON emitted by the backend's read-only snapshot
//! endpoints field for field. Each endpoint returns one point-in-time
//! snapshot; none of them carry incremental or streaming semantics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::MetricSample;

/// Response of `/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    /// False when the backend is up but has no working cluster client.
    pub kubernetes_connected: bool,
    pub cluster: String,
}

/// Cluster-wide summary returned by `/api/cluster`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterOverview {
    pub cluster_name: String,
    pub nodes: NodeCounts,
    pub pods: PodCounts,
    pub namespaces: u64,
}

/// Node totals within a [`ClusterOverview`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCounts {
    pub total: u64,
    pub ready: u64,
}

/// Pod totals within a [`ClusterOverview`], broken down by phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodCounts {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
}

/// Response of `/api/pods`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodList {
    pub pods: Vec<PodSummary>,
    pub count: usize,
}

/// One row of the pod table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodSummary {
    pub name: String,
    pub namespace: String,
    pub status: String,
    /// Ready ratio as reported by the backend (e.g. "1/1").
    pub ready: String,
    pub restarts: u64,
    pub age: String,
    pub node: Option<String>,
    pub ip: Option<String>,
    pub created_at: Option<String>,
}

/// Response of `/api/pods/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodDetail {
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub node: Option<String>,
    pub ip: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
    pub containers: Vec<ContainerSpec>,
    pub events: Vec<PodEvent>,
}

/// Container entry within a [`PodDetail`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
}

/// Exposed port of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerPort {
    #[serde(rename = "containerPort")]
    pub container_port: u16,
    pub protocol: Option<String>,
}

/// Recent event attached to a pod.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodEvent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<String>,
}

/// Response of `/api/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub metrics: Vec<PodMetrics>,
    pub count: usize,
}

/// CPU and memory usage for one pod, aggregated over its containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodMetrics {
    pub pod: String,
    /// Human-readable CPU string (e.g. "12m").
    pub cpu: String,
    pub cpu_millicores: u64,
    /// Human-readable memory string (e.g. "48Mi").
    pub memory: String,
    pub memory_mb: u64,
}

impl MetricSample for PodMetrics {
    fn entity_key(&self) -> &str {
        &self.pod
    }

    fn values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("cpu", self.cpu_millicores as f64),
            ("mem", self.memory_mb as f64),
        ]
    }
}

/// Response of `/api/nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeList {
    pub nodes: Vec<NodeInfo>,
    pub count: usize,
}

/// One node of the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub status: String,
    pub roles: Vec<String>,
    pub version: String,
    pub os: String,
    pub container_runtime: Option<String>,
    #[serde(default)]
    pub conditions: BTreeMap<String, String>,
}

/// Response of `/api/pods/{name}/logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodLogs {
    pub pod: String,
    pub container: Option<String>,
    /// Tail length that was requested.
    pub lines: u32,
    /// Newline-delimited log text.
    pub logs: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_health() {
        let json = r#"{
            "status": "ok",
            "kubernetes_connected": false,
            "cluster": "kind-pulsecheck"
        }"#;

        let health: Health = serde_json::from_str(json).unwrap();
        assert_eq!(health.status, "ok");
        assert!(!health.kubernetes_connected);
        assert_eq!(health.cluster, "kind-pulsecheck");
    }

    #[test]
    fn deserialize_cluster_overview() {
        let json = r#"{
            "cluster_name": "kind-pulsecheck",
            "nodes": { "total": 3, "ready": 2 },
            "pods": {
                "total": 12,
                "by_status": { "Running": 10, "Pending": 1, "Failed": 1 }
            },
            "namespaces": 5
        }"#;

        let overview: ClusterOverview = serde_json::from_str(json).unwrap();
        assert_eq!(overview.cluster_name, "kind-pulsecheck");
        assert_eq!(overview.nodes.total, 3);
        assert_eq!(overview.nodes.ready, 2);
        assert_eq!(overview.pods.by_status.get("Running"), Some(&10));
        assert_eq!(overview.namespaces, 5);
    }

    #[test]
    fn deserialize_pod_list() {
        let json = r#"{
            "pods": [{
                "name": "web-7d4b9c",
                "namespace": "default",
                "status": "Running",
                "ready": "1/1",
                "restarts": 2,
                "age": "3h",
                "node": "worker-1",
                "ip": "10.244.0.5",
                "created_at": "2026-08-29T10:00:00+00:00"
            }],
            "count": 1
        }"#;

        let list: PodList = serde_json::from_str(json).unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.pods[0].name, "web-7d4b9c");
        assert_eq!(list.pods[0].ready, "1/1");
        assert_eq!(list.pods[0].restarts, 2);
    }

    #[test]
    fn deserialize_pod_detail_with_nulls() {
        // A pending pod may have no node, IP, or labels yet.
        let json = r#"{
            "name": "pending-pod",
            "namespace": "default",
            "status": "Pending",
            "node": null,
            "ip": null,
            "labels": null,
            "containers": [{
                "name": "app",
                "image": "nginx:1.27",
                "ports": [{ "containerPort": 80, "protocol": "TCP" }]
            }],
            "events": [{
                "type": "Warning",
                "reason": "FailedScheduling",
                "message": "0/3 nodes are available",
                "timestamp": null
            }]
        }"#;

        let detail: PodDetail = serde_json::from_str(json).unwrap();
        assert!(detail.node.is_none());
        assert_eq!(detail.containers[0].ports[0].container_port, 80);
        assert_eq!(detail.events[0].kind.as_deref(), Some("Warning"));
    }

    #[test]
    fn deserialize_metrics() {
        let json = r#"{
            "metrics": [{
                "pod": "web-7d4b9c",
                "cpu": "12m",
                "cpu_millicores": 12,
                "memory": "48Mi",
                "memory_mb": 48
            }],
            "count": 1
        }"#;

        let snapshot: MetricsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.metrics[0].cpu_millicores, 12);
        assert_eq!(snapshot.metrics[0].memory_mb, 48);
    }

    #[test]
    fn pod_metrics_sample_values() {
        let m = PodMetrics {
            pod: "web".to_string(),
            cpu: "12m".to_string(),
            cpu_millicores: 12,
            memory: "48Mi".to_string(),
            memory_mb: 48,
        };
        assert_eq!(m.entity_key(), "web");
        assert_eq!(m.values(), vec![("cpu", 12.0), ("mem", 48.0)]);
    }

    #[test]
    fn deserialize_node_list() {
        let json = r#"{
            "nodes": [{
                "name": "control-plane",
                "status": "Ready",
                "roles": ["control-plane"],
                "version": "v1.31.0",
                "os": "linux/amd64",
                "container_runtime": "containerd://1.7.18",
                "conditions": { "Ready": "True", "MemoryPressure": "False" }
            }],
            "count": 1
        }"#;

        let list: NodeList = serde_json::from_str(json).unwrap();
        assert_eq!(list.nodes[0].status, "Ready");
        assert_eq!(list.nodes[0].conditions.get("Ready").unwrap(), "True");
    }

    #[test]
    fn deserialize_pod_logs() {
        let json = r#"{
            "pod": "web-7d4b9c",
            "container": null,
            "lines": 100,
            "logs": "line one\nline two\n"
        }"#;

        let logs: PodLogs = serde_json::from_str(json).unwrap();
        assert_eq!(logs.lines, 100);
        assert_eq!(logs.logs.lines().count(), 2);
    }
}
