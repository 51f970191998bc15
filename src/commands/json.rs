use super::AppContext;

/// Fetch once and print the derived records
pub async fn execute(ctx: &AppContext, pretty: bool) -> Result<(), String> {
    let outcome = ctx.refresher.refresh().await.map_err(|e| format!("❌ {}", e))?;

    let json = if pretty {
        serde_json::to_string_pretty(&outcome.records)
    } else {
        serde_json::to_string(&outcome.records)
    }
    .map_err(|e| format!("❌ Failed to serialize records: {}", e))?;

    println!("{}", json);
    Ok(())
}
