//! Season-trend charts.
//!
//! The pipeline hands a [`TrendSeries`] to a [`ChartSink`]; what comes back
//! is either an in-memory document or the path of a saved file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{CourtsideError, Result};
use crate::models::TrendSeries;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

const CHART_WIDTH: u32 = 640;
const CHART_HEIGHT: u32 = 360;

#[derive(Debug, Clone, PartialEq)]
pub enum ChartArtifact {
    Inline(Value),
    File(PathBuf),
}

#[async_trait]
pub trait ChartSink: Send + Sync {
    async fn publish(&self, series: &TrendSeries) -> Result<ChartArtifact>;
}

/// Renders line charts as Vega-Lite v5 documents.
#[derive(Debug, Clone, Default)]
pub struct VegaLiteChart {
    output_dir: Option<PathBuf>,
}

impl VegaLiteChart {
    /// Charts stay in memory.
    pub fn in_memory() -> Self {
        Self { output_dir: None }
    }

    /// Charts are written under `dir`, which is created on first use.
    pub fn to_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(dir.into()),
        }
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn render(&self, series: &TrendSeries) -> Value {
        let values: Vec<Value> = series
            .points
            .iter()
            .map(|point| json!({ "season": point.season, "value": point.value }))
            .collect();

        let mut y_axis = json!({
            "field": "value",
            "type": "quantitative",
            "title": series.stat.label_ja(),
        });
        if series.stat.is_percentage() {
            y_axis["axis"] = json!({ "format": ".1%" });
        }

        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": series.title(),
            "width": CHART_WIDTH,
            "height": CHART_HEIGHT,
            "data": { "values": values },
            "mark": { "type": "line", "point": true },
            "encoding": {
                "x": { "field": "season", "type": "ordinal", "title": "シーズン", "sort": null },
                "y": y_axis,
            },
        })
    }

    /// Write the chart to `<output_dir>/<player>_<stat>.vl.json`.
    pub async fn save(&self, series: &TrendSeries) -> Result<PathBuf> {
        let dir = self.output_dir.as_deref().ok_or_else(|| {
            CourtsideError::Config("Chart output directory is not configured".to_string())
        })?;
        if series.is_empty() {
            return Err(CourtsideError::Validation(format!(
                "No seasons to plot for {}",
                series.player_name
            )));
        }

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name(series));
        let body = serde_json::to_vec_pretty(&self.render(series))?;
        tokio::fs::write(&path, body).await?;

        tracing::info!(path = %path.display(), points = series.points.len(), "Chart saved");
        Ok(path)
    }
}

fn file_name(series: &TrendSeries) -> String {
    let slug: String = series
        .player_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{slug}_{}.vl.json", series.stat.column().to_lowercase())
}

#[async_trait]
impl ChartSink for VegaLiteChart {
    async fn publish(&self, series: &TrendSeries) -> Result<ChartArtifact> {
        match self.output_dir {
            Some(_) => self.save(series).await.map(ChartArtifact::File),
            None => Ok(ChartArtifact::Inline(self.render(series))),
        }
    }
}
