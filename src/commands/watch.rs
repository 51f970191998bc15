use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::AppContext;
use crate::models::Metric;
use crate::services::chart_service::BubbleChart;
use crate::services::refresh_service::{RefreshError, RefreshOutcome, Refresher};

/// Refresh every `interval` seconds and redraw one chart handle in place.
/// A tick that lands while the previous refresh is still running is
/// dropped; a failed refresh is logged and the chart keeps its last data.
pub async fn execute(
    ctx: &AppContext,
    metric: Metric,
    output: &Path,
    interval: u64,
    rotate: bool,
    count: Option<u64>,
) -> Result<(), String> {
    if interval == 0 {
        return Err("❌ Interval must be at least one second".to_string());
    }
    info!(
        "👀 Watching: every {}s, metric={}, rotate={}, output={}",
        interval,
        metric,
        rotate,
        output.display()
    );

    let mut options = ctx.config.chart;
    options.metric = metric;
    let mut chart = BubbleChart::create(options);
    let mut current = metric;
    let mut renders: u64 = 0;

    let (tx, mut rx) = mpsc::channel::<Result<RefreshOutcome, RefreshError>>(4);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                break;
            }
            _ = ticker.tick() => {
                spawn_refresh(ctx.refresher.clone(), tx.clone());
            }
            Some(result) = rx.recv() => {
                let outcome = match result {
                    Ok(outcome) => outcome,
                    Err(RefreshError::InFlight) => {
                        warn!("Skipping tick, previous refresh still running");
                        continue;
                    }
                    Err(e) => {
                        error!("❌ Refresh cycle failed: {}", e);
                        continue;
                    }
                };

                let drawn = if chart.is_rendered() {
                    if rotate {
                        current = next_metric(current);
                    }
                    chart.update(&outcome.records, current)
                } else {
                    chart.render(&outcome.records)
                };

                if let Err(e) = drawn.and_then(|_| chart.save(output)) {
                    error!("❌ Failed to draw chart: {}", e);
                    continue;
                }

                renders += 1;
                info!("🖼️ Render #{}: {} bubbles by {}", renders, outcome.records.len(), current);

                if count.map_or(false, |limit| renders >= limit) {
                    break;
                }
            }
        }
    }

    chart.dispose();
    Ok(())
}

fn spawn_refresh(refresher: Arc<Refresher>, tx: mpsc::Sender<Result<RefreshOutcome, RefreshError>>) {
    tokio::spawn(async move {
        let result = refresher.refresh().await;
        let _ = tx.send(result).await;
    });
}

/// The metric after `metric`, wrapping around
pub fn next_metric(metric: Metric) -> Metric {
    let position = Metric::ALL.iter().position(|m| *m == metric).unwrap_or(0);
    Metric::ALL[(position + 1) % Metric::ALL.len()]
}
