use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::debug;

use crate::models::{Metric, PoolMetric, TokenRecord};
use crate::services::layout_service;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Chart has been disposed")]
    Disposed,
    #[error("Chart has not been rendered yet")]
    NotRendered,
    #[error("Unsupported output format '{0}'. Use .svg or .png")]
    UnsupportedFormat(String),
    #[error("Drawing failed: {0}")]
    Backend(String),
    #[error("Chart file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Canvas size, bubble spacing and the metric the first render sizes by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub padding: f64,
    pub metric: Metric,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            width: 960,
            height: 500,
            padding: 1.5,
            metric: Metric::MarketCap,
        }
    }
}

/// A laid-out bubble with everything needed to draw it
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub symbol: String,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    /// Secondary text under the symbol
    pub label: String,
    pub tooltip: String,
}

impl Bubble {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (x - self.x).powi(2) + (y - self.y).powi(2) <= self.r * self.r
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartState {
    Created,
    Rendered,
    Disposed,
}

/// Bubble chart surface.
///
/// Lifecycle is `create` -> `render` -> `update`* -> `dispose`. The chart
/// keeps the current layout so it can be exported or hit-tested for
/// tooltips at any point after `render`.
#[derive(Debug)]
pub struct BubbleChart {
    options: ChartOptions,
    state: ChartState,
    metric: Metric,
    bubbles: Vec<Bubble>,
}

impl BubbleChart {
    pub fn create(options: ChartOptions) -> Self {
        BubbleChart {
            metric: options.metric,
            options,
            state: ChartState::Created,
            bubbles: Vec::new(),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn is_rendered(&self) -> bool {
        self.state == ChartState::Rendered
    }

    /// First draw: bubbles sized by the configured metric, labelled with
    /// their 24h change
    pub fn render(&mut self, records: &[TokenRecord]) -> Result<(), ChartError> {
        self.ensure_alive()?;
        let metric = self.options.metric;
        self.bubbles = self.layout(records, metric, |r| {
            format!("24H: {}", r.change_percent(PoolMetric::Change24))
        });
        self.metric = metric;
        self.state = ChartState::Rendered;
        debug!("Rendered {} bubbles by {}", self.bubbles.len(), metric);
        Ok(())
    }

    /// Re-layout with fresh records and switch the sizing metric. Labels
    /// show the metric's display string.
    pub fn update(&mut self, records: &[TokenRecord], metric: Metric) -> Result<(), ChartError> {
        self.ensure_alive()?;
        if self.state != ChartState::Rendered {
            return Err(ChartError::NotRendered);
        }
        self.bubbles = self.layout(records, metric, |r| metric.display(r).to_string());
        self.metric = metric;
        debug!("Updated {} bubbles by {}", self.bubbles.len(), metric);
        Ok(())
    }

    /// Release the layout. Every later call fails with `Disposed`.
    pub fn dispose(&mut self) {
        self.bubbles.clear();
        self.state = ChartState::Disposed;
    }

    /// Tooltip of the bubble under a canvas point
    pub fn tooltip_at(&self, x: f64, y: f64) -> Option<&str> {
        self.bubbles
            .iter()
            .find(|b| b.contains(x, y))
            .map(|b| b.tooltip.as_str())
    }

    pub fn to_svg(&self) -> Result<String, ChartError> {
        self.ensure_drawable()?;
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size()).into_drawing_area();
            draw_bubbles(&root, &self.bubbles)?;
        }
        Ok(svg)
    }

    /// Render as PNG bytes
    pub fn to_png(&self) -> Result<Vec<u8>, ChartError> {
        self.ensure_drawable()?;

        // BitMapBackend encodes on present(), so go through a temporary file
        let temp_file = std::env::temp_dir().join(format!(
            "token_bubbles_{}_{}.png",
            std::process::id(),
            chrono::Utc::now().timestamp_millis()
        ));
        {
            let root = BitMapBackend::new(&temp_file, self.size()).into_drawing_area();
            draw_bubbles(&root, &self.bubbles)?;
        }

        let image_data = std::fs::read(&temp_file)?;
        let _ = std::fs::remove_file(&temp_file);
        Ok(image_data)
    }

    /// Write the chart to `path`, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<(), ChartError> {
        self.ensure_drawable()?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "svg" => {
                let root = SVGBackend::new(path, self.size()).into_drawing_area();
                draw_bubbles(&root, &self.bubbles)
            }
            "png" => {
                let root = BitMapBackend::new(path, self.size()).into_drawing_area();
                draw_bubbles(&root, &self.bubbles)
            }
            _ => Err(ChartError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.options.width, self.options.height)
    }

    fn ensure_alive(&self) -> Result<(), ChartError> {
        match self.state {
            ChartState::Disposed => Err(ChartError::Disposed),
            _ => Ok(()),
        }
    }

    fn ensure_drawable(&self) -> Result<(), ChartError> {
        match self.state {
            ChartState::Disposed => Err(ChartError::Disposed),
            ChartState::Created => Err(ChartError::NotRendered),
            ChartState::Rendered => Ok(()),
        }
    }

    fn layout<F>(&self, records: &[TokenRecord], metric: Metric, label: F) -> Vec<Bubble>
    where
        F: Fn(&TokenRecord) -> String,
    {
        layout_service::pack_records(
            records,
            metric,
            self.options.width as f64,
            self.options.height as f64,
            self.options.padding,
        )
        .into_iter()
        .map(|c| {
            let record = &records[c.index];
            Bubble {
                symbol: record.symbol.clone(),
                x: c.x,
                y: c.y,
                r: c.r,
                label: label(record),
                tooltip: tooltip(record),
            }
        })
        .collect()
    }
}

/// Hover text for one record
pub fn tooltip(record: &TokenRecord) -> String {
    format!(
        "Currency: {}\nMarket Capitalization: {}\n24H Change: {}\n7D Change: {}",
        record.symbol,
        record.market_cap_clean,
        record.change_percent(PoolMetric::Change24),
        record.change_percent(PoolMetric::ChangeWeek),
    )
}

fn draw_bubbles<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, bubbles: &[Bubble]) -> Result<(), ChartError> {
    root.fill(&WHITE)
        .map_err(|e| ChartError::Backend(format!("Failed to fill canvas: {}", e)))?;

    let centered = Pos::new(HPos::Center, VPos::Center);

    for bubble in bubbles {
        let (x, y) = (bubble.x.round() as i32, bubble.y.round() as i32);

        root.draw(&Circle::new((x, y), bubble.r.round() as i32, BLACK.filled()))
            .map_err(|e| ChartError::Backend(format!("Failed to draw bubble {}: {}", bubble.symbol, e)))?;

        let symbol_size = (bubble.r / 5.0).max(1.0);
        let symbol_style = ("sans-serif", symbol_size).into_font().color(&WHITE).pos(centered);
        let symbol_y = y + (symbol_size * 0.2).round() as i32;
        root.draw(&Text::new(bubble.symbol.clone(), (x, symbol_y), symbol_style))
            .map_err(|e| ChartError::Backend(format!("Failed to draw label {}: {}", bubble.symbol, e)))?;

        let label_size = (bubble.r / 7.0).max(1.0);
        let label_style = ("sans-serif", label_size).into_font().color(&WHITE).pos(centered);
        let label_y = y + (label_size * 1.8).round() as i32;
        root.draw(&Text::new(bubble.label.clone(), (x, label_y), label_style))
            .map_err(|e| ChartError::Backend(format!("Failed to draw label {}: {}", bubble.symbol, e)))?;
    }

    root.present()
        .map_err(|e| ChartError::Backend(format!("Failed to render chart: {}", e)))?;
    Ok(())
}
