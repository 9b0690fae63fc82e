//! Usage: Image export of the dashboard summary (SVG layout rasterized to PNG).

use super::DashboardSummary;
use crate::shared::error::{AppError, AppResult};
use crate::shared::html::escape;
use resvg::{tiny_skia, usvg};
use std::sync::{Arc, OnceLock};

const WIDTH: u32 = 800;
const PADDING: u32 = 32;
const HEADER_HEIGHT: u32 = 96;
const STATS_HEIGHT: u32 = 140;
const ACTIVITY_HEIGHT: u32 = 72;
const SECTION_TITLE_HEIGHT: u32 = 48;

// Device pixel ratio of the exported raster.
const SCALE: f32 = 2.0;

pub const CONTENT_TYPE: &str = "image/png";

static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// `strava-data-YYYY-MM-DD.png` for the given UTC date.
pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("strava-data-{}.png", date.format("%Y-%m-%d"))
}

fn system_fonts() -> Arc<usvg::fontdb::Database> {
    Arc::clone(FONTS.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts for image export");
        Arc::new(db)
    }))
}

/// Rasterize an SVG document to PNG bytes. Text without a matching system font is skipped.
pub fn rasterize_png(svg: &str) -> AppResult<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb = system_fonts();
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| AppError::with_source("EXPORT_RENDER", "export svg is invalid", e))?;

    let size = tree.size().to_int_size();
    let width = (size.width() as f32 * SCALE).ceil() as u32;
    let height = (size.height() as f32 * SCALE).ceil() as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        AppError::new(
            "EXPORT_RENDER",
            format!("cannot allocate {width}x{height} image"),
        )
    })?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(SCALE, SCALE),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|e| AppError::with_source("EXPORT_RENDER", "png encoding failed", e))
}

pub fn render_png(summary: &DashboardSummary) -> AppResult<Vec<u8>> {
    rasterize_png(&render_svg(summary))
}

fn text(x: u32, y: u32, size: u32, weight: u32, fill: &str, content: &str) -> String {
    format!(
        "<text x=\"{x}\" y=\"{y}\" font-family=\"system-ui, sans-serif\" font-size=\"{size}\" font-weight=\"{weight}\" fill=\"{fill}\">{}</text>",
        escape(content)
    )
}

pub fn render_svg(summary: &DashboardSummary) -> String {
    let cards = summary.stat_cards();
    let rows = summary.activity_rows();

    let mut body = String::new();
    let mut y = PADDING;

    if let Some(name) = summary.athlete_name() {
        body.push_str(&text(PADDING, y + 40, 30, 700, "#1f2937", &name));
        body.push_str(&text(PADDING, y + 68, 14, 400, "#6b7280", "Strava Athlete"));
        y += HEADER_HEIGHT;
    }

    if let Some(cards) = &cards {
        body.push_str(&text(PADDING, y + 28, 22, 700, "#1f2937", "Total statistics"));
        y += SECTION_TITLE_HEIGHT;
        let card_width = (WIDTH - 2 * PADDING - 3 * 12) / 4;
        for (idx, card) in cards.iter().enumerate() {
            let x = PADDING + idx as u32 * (card_width + 12);
            body.push_str(&format!(
                "<rect x=\"{x}\" y=\"{y}\" width=\"{card_width}\" height=\"80\" rx=\"8\" fill=\"#fff7ed\" stroke=\"#fed7aa\"/>"
            ));
            body.push_str(&text(x + 12, y + 28, 12, 400, "#6b7280", card.label));
            body.push_str(&text(x + 12, y + 60, 20, 700, "#fc4c02", &card.value));
        }
        y += STATS_HEIGHT - SECTION_TITLE_HEIGHT;
    }

    body.push_str(&text(PADDING, y + 28, 22, 700, "#1f2937", "Recent activities"));
    y += SECTION_TITLE_HEIGHT;
    if rows.is_empty() {
        body.push_str(&text(PADDING, y + 20, 14, 400, "#6b7280", "No activities found"));
        y += ACTIVITY_HEIGHT / 2;
    }
    for row in &rows {
        body.push_str(&format!(
            "<rect x=\"{PADDING}\" y=\"{y}\" width=\"{}\" height=\"{}\" rx=\"8\" fill=\"#ffffff\" stroke=\"#e5e7eb\"/>",
            WIDTH - 2 * PADDING,
            ACTIVITY_HEIGHT - 8
        ));
        body.push_str(&text(PADDING + 12, y + 24, 16, 600, "#1f2937", &row.name));
        let detail = format!(
            "{} · {} · {} · {}",
            row.distance, row.moving_time, row.elevation, row.average_speed
        );
        body.push_str(&text(PADDING + 12, y + 44, 13, 400, "#374151", &detail));
        let meta = [row.date.as_str(), row.kind.as_str()]
            .into_iter()
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(" • ");
        body.push_str(&text(PADDING + 12, y + 58, 11, 400, "#6b7280", &meta));
        y += ACTIVITY_HEIGHT;
    }

    let height = y + PADDING;
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{height}\" viewBox=\"0 0 {WIDTH} {height}\">\
<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>{body}</svg>"
    )
}
