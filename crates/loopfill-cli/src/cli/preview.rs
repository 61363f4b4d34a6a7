//! PNG preview of a fill result, rendered through the SVG output.

use anyhow::{Context, Result, anyhow};
use tiny_skia::Pixmap;

use loopfill::FillResult;

use super::common::result_to_svg;

/// Longest side of the preview image in pixels.
const PREVIEW_SIZE: f32 = 1200.0;

/// Render `result` to a PNG file.
pub fn save_preview(result: &FillResult, include_boundaries: bool, png_path: &str) -> Result<()> {
    let pixmap = render_preview(result, include_boundaries)?;
    pixmap.save_png(png_path).with_context(|| format!("failed to write preview {}", png_path))?;
    log::info!("wrote preview {} ({}x{})", png_path, pixmap.width(), pixmap.height());
    Ok(())
}

pub fn render_preview(result: &FillResult, include_boundaries: bool) -> Result<Pixmap> {
    let svg = result_to_svg(result, include_boundaries);
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default()).context("preview SVG did not parse")?;

    let size = tree.size();
    let scale = PREVIEW_SIZE / size.width().max(size.height());
    let width = (size.width() * scale).round().max(1.0) as u32;
    let height = (size.height() * scale).round().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| anyhow!("could not create {}x{} pixmap", width, height))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let transform = tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}
