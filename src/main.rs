use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pulsecheck::{ApiClient, Dashboard, PodView, Settings};

#[derive(Parser, Debug)]
#[command(name = "pulsecheck")]
#[command(about = "Console watcher for a PulseCheck Kubernetes dashboard backend")]
struct Args {
    /// Base URL of the backend (overrides config and environment)
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watch a single pod's detail and logs instead of the cluster overview
    #[arg(short, long, conflicts_with = "export")]
    pod: Option<String>,

    /// Log tail length (used with --pod)
    #[arg(long, requires = "pod")]
    tail: Option<u32>,

    /// Poll once, write the combined state as JSON to this file, and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// How often to print a status line, in seconds
    #[arg(short, long, default_value = "5")]
    refresh: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    if let Some(url) = args.url {
        settings.api_url = url;
    }
    if let Some(tail) = args.tail {
        settings.log_tail = tail;
    }

    let client = ApiClient::builder().endpoint(&settings.api_url).build();
    info!(url = %settings.api_url, "connecting");

    // A failed health check is worth a warning, not an exit; the pollers
    // keep trying and surface errors per resource.
    match client.health().await {
        Ok(health) if health.kubernetes_connected => {
            info!(cluster = %health.cluster, "backend healthy");
        }
        Ok(health) => {
            warn!(cluster = %health.cluster, "backend up but not connected to the cluster");
        }
        Err(err) => warn!(%err, "backend health check failed"),
    }

    if let Some(path) = args.export {
        return export_once(client, &path).await;
    }

    if let Some(pod) = args.pod {
        return watch_pod(client, &pod, &settings, args.refresh).await;
    }

    watch_dashboard(client, &settings, args.refresh).await
}

/// Print a status line for the main-page resources until interrupted.
async fn watch_dashboard(client: ApiClient, settings: &Settings, refresh: u64) -> Result<()> {
    let dashboard = Dashboard::start(client, settings);
    let mut status = tokio::time::interval(Duration::from_secs(refresh.max(1)));
    status.tick().await;

    loop {
        tokio::select! {
            _ = status.tick() => print_dashboard(&dashboard),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    dashboard.stop();
    info!("stopped");
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    let cluster = dashboard.cluster();
    let pods = dashboard.pods();
    let nodes = dashboard.nodes();

    if let Some(err) = dashboard.current_error() {
        println!("! {}", err);
    }

    match (&cluster.data, &pods.data, &nodes.data) {
        (Some(overview), Some(pods), Some(nodes)) => {
            println!(
                "{}: {}/{} nodes ready, {} pods ({} running), {} namespaces, {} metric points",
                overview.cluster_name,
                nodes.nodes.iter().filter(|n| n.status == "Ready").count(),
                nodes.count,
                pods.count,
                overview.pods.by_status.get("Running").copied().unwrap_or(0),
                overview.namespaces,
                dashboard.history().len(),
            );
        }
        _ if cluster.loading => println!("loading..."),
        _ => {}
    }
}

/// Print one pod's status and fresh log lines until interrupted.
async fn watch_pod(client: ApiClient, pod: &str, settings: &Settings, refresh: u64) -> Result<()> {
    let view = PodView::start(client, pod, settings);
    let mut status = tokio::time::interval(Duration::from_secs(refresh.max(1)));
    status.tick().await;

    let mut printed_lines = 0usize;
    loop {
        tokio::select! {
            _ = status.tick() => {
                if let Some(err) = view.current_error() {
                    println!("! {}", err);
                }
                if let Some(detail) = view.detail().data {
                    println!(
                        "{}/{}: {} on {}",
                        detail.namespace,
                        detail.name,
                        detail.status,
                        detail.node.as_deref().unwrap_or("<unscheduled>"),
                    );
                }
                if let Some(logs) = view.logs().data {
                    // Only print lines not seen on a previous tick. The tail
                    // window slides, so this undercounts after rotation; good
                    // enough for a console watcher.
                    let lines: Vec<&str> = logs.logs.lines().collect();
                    for line in lines.iter().skip(printed_lines.min(lines.len())) {
                        println!("  {}", line);
                    }
                    printed_lines = lines.len();
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    view.stop();
    info!("stopped");
    Ok(())
}

/// Fetch every main-page resource once and write them as one JSON document.
async fn export_once(client: ApiClient, path: &PathBuf) -> Result<()> {
    let (cluster, pods, metrics, nodes) = tokio::join!(
        client.cluster(),
        client.pods(),
        client.metrics(),
        client.nodes(),
    );

    let cluster = cluster.context("fetching cluster overview")?;
    let pods = pods.context("fetching pods")?;
    let metrics = metrics.context("fetching metrics")?;
    let nodes = nodes.context("fetching nodes")?;

    let export = serde_json::json!({
        "cluster": cluster,
        "pods": pods,
        "metrics": metrics,
        "nodes": nodes,
    });
    std::fs::write(path, serde_json::to_string_pretty(&export)?)
        .with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), "state exported");
    Ok(())
}
