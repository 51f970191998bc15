pub mod chart;
pub mod table;
pub mod json;
pub mod watch;

use std::sync::Arc;

use crate::cli::Command;
use crate::config::Config;
use crate::services::refresh_service::Refresher;

/// What every command needs: settings and the shared refresher
pub struct AppContext {
    pub config: Config,
    pub refresher: Arc<Refresher>,
}

pub async fn handle_command(ctx: &AppContext, command: Command) -> Result<(), String> {
    match command {
        Command::Chart { metric, output, width, height } => {
            chart::execute(ctx, metric, &output, width, height).await
        }
        Command::Table { metric, limit } => table::execute(ctx, metric, limit).await,
        Command::Json { pretty } => json::execute(ctx, pretty).await,
        Command::Watch { metric, output, interval, rotate, count } => {
            watch::execute(ctx, metric, &output, interval, rotate, count).await
        }
    }
}
