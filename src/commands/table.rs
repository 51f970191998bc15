use std::cmp::Ordering;

use super::AppContext;
use crate::models::{Metric, PoolMetric, TokenRecord};
use crate::utils::{format_currency_short, Align, Table};

/// Fetch once and print records sorted by `metric`, largest first
pub async fn execute(ctx: &AppContext, metric: Metric, limit: Option<usize>) -> Result<(), String> {
    tracing::info!("📊 Table command: metric={} limit={:?}", metric, limit);

    let outcome = ctx.refresher.refresh().await.map_err(|e| format!("❌ {}", e))?;
    let mut records = outcome.records;
    sort_by_metric(&mut records, metric);
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    println!("{}", render(&records, metric));
    Ok(())
}

pub fn sort_by_metric(records: &mut [TokenRecord], metric: Metric) {
    records.sort_by(|a, b| {
        metric
            .value(b)
            .partial_cmp(&metric.value(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}

pub fn render(records: &[TokenRecord], metric: Metric) -> String {
    let with_volume = records.iter().any(|r| r.aggregates.contains_key(&PoolMetric::VolumeUsd24));

    let mut headers = vec!["Symbol", metric.label(), "24H %", "7D %", "Pools"];
    if with_volume {
        headers.push("Pool Volume 24H");
    }
    let mut table = Table::new(&headers);
    for column in 1..headers.len() {
        table = table.align(column, Align::Right);
    }

    for record in records {
        let change24 = record.change_display(PoolMetric::Change24);
        let change_week = record.change_display(PoolMetric::ChangeWeek);
        let pools = record.pool_count.to_string();
        let volume = record
            .pool_volume_24h()
            .map(format_currency_short)
            .unwrap_or_else(|| "n/a".to_string());

        let mut row = vec![
            record.symbol.as_str(),
            metric.display(record),
            change24.as_str(),
            change_week.as_str(),
            pools.as_str(),
        ];
        if with_volume {
            row.push(volume.as_str());
        }
        table.add_row(&row);
    }

    table.render()
}
