use std::path::Path;

use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{PlotError, Result};

/// Draw onto a white `width x height` canvas and save it as PNG at `path`.
///
/// Nothing is written when `draw` fails.
pub(super) fn render_png<F>(path: &Path, (width, height): (u32, u32), draw: F) -> Result<()>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
{
    if width == 0 || height == 0 {
        return Err(PlotError::InvalidData(format!(
            "chart size {width}x{height} has no pixels"
        )));
    }

    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

        draw(&root)?;

        root.present()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        PlotError::InvalidData(format!("pixel buffer does not match {width}x{height}"))
    })?;
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
