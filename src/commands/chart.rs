use std::path::Path;

use tracing::info;

use super::AppContext;
use crate::models::Metric;
use crate::services::chart_service::BubbleChart;

/// Fetch once, lay out by `metric` and write the chart to `output`
pub async fn execute(
    ctx: &AppContext,
    metric: Metric,
    output: &Path,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(), String> {
    info!("🎨 Chart command: metric={} output={}", metric, output.display());

    let mut options = ctx.config.chart;
    options.metric = metric;
    if let Some(width) = width {
        options.width = width;
    }
    if let Some(height) = height {
        options.height = height;
    }
    if options.width == 0 || options.height == 0 {
        return Err("❌ Chart width and height must be positive".to_string());
    }

    let outcome = ctx.refresher.refresh().await.map_err(|e| format!("❌ {}", e))?;

    let mut chart = BubbleChart::create(options);
    let result = chart
        .render(&outcome.records)
        .and_then(|_| chart.save(output))
        .map_err(|e| format!("❌ {}", e));
    chart.dispose();
    result?;

    info!(
        "✅ Wrote {} bubbles to {} (data fetched {})",
        outcome.records.len(),
        output.display(),
        outcome.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}
