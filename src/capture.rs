//! Scroll-and-stitch capture of annotated full pages.
//!
//! Full-page screenshots miss content that only renders in the viewport (sticky
//! headers, lazy sections), so the page is captured one viewport at a time and the
//! pieces are stitched at the scroll offsets the browser actually reached.

use image::{imageops, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

use crate::browser::{CaptureRequest, CapturedShot, PageDriver};
use crate::overlay::{OverlayBox, PlacedLabel};
use crate::types::DomSnapshot;
use crate::Result;

/// Scroll offsets covering `document_height` with viewport-sized steps.
///
/// Consecutive captures repeat `overlap_ratio` of the viewport. The last offset is
/// clamped so the final capture ends at the bottom of the document.
pub fn compute_scroll_positions(
    document_height: f64,
    viewport_height: f64,
    overlap_ratio: f64,
) -> Vec<f64> {
    if viewport_height <= 0.0 || document_height <= viewport_height {
        return vec![0.0];
    }
    let overlap = (viewport_height * overlap_ratio.clamp(0.0, 0.95)).round();
    let step = (viewport_height - overlap).max(1.0);
    let max_scroll = (document_height - viewport_height).ceil();

    let mut positions = Vec::new();
    let mut y = 0.0;
    loop {
        let clamped = f64::min(y, max_scroll);
        if positions.last() != Some(&clamped) {
            positions.push(clamped);
        }
        if clamped >= max_scroll {
            break;
        }
        y += step;
    }
    positions
}

/// Empties `dir`, creating it when needed.
pub fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Removes `dir` if present.
pub fn remove_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}

/// Dimensions of a stitched image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pieces: usize,
}

/// Stacks `shots` into one image, each drawn at its own scroll offset.
pub fn stitch(shots: &[CapturedShot], output: &Path) -> Result<StitchedImage> {
    let mut pieces = Vec::with_capacity(shots.len());
    for shot in shots {
        let img = image::open(&shot.path)?.to_rgba8();
        let top = shot.scroll_y.max(0.0).round() as u32;
        pieces.push((top, img));
    }

    let width = pieces.iter().map(|(_, img)| img.width()).max().unwrap_or(0);
    let height = pieces
        .iter()
        .map(|(top, img)| top + img.height())
        .max()
        .unwrap_or(0);

    let mut canvas = RgbaImage::new(width.max(1), height.max(1));
    for (top, img) in &pieces {
        imageops::replace(&mut canvas, img, 0, i64::from(*top));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    canvas.save(output)?;

    Ok(StitchedImage {
        path: output.to_path_buf(),
        width: canvas.width(),
        height: canvas.height(),
        pieces: pieces.len(),
    })
}

/// Where raw captures go and how much they overlap.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub overlap_ratio: f64,
    pub temp_dir: PathBuf,
}

/// Draws overlays on the open page, captures it top to bottom and stitches the result
/// into `output`.
///
/// Returns `None` when the driver produced no screenshots.
pub async fn capture_annotated<D: PageDriver>(
    driver: &mut D,
    page: &DomSnapshot,
    overlays: &[OverlayBox],
    labels: &[PlacedLabel],
    settings: &CaptureSettings,
    prefix: &str,
    output: &Path,
) -> Result<Option<StitchedImage>> {
    reset_dir(&settings.temp_dir)?;

    let request = CaptureRequest {
        overlays: overlays.to_vec(),
        labels: labels.to_vec(),
        positions: compute_scroll_positions(
            page.document_height,
            page.viewport_height,
            settings.overlap_ratio,
        ),
        dir: settings.temp_dir.clone(),
        prefix: prefix.to_string(),
    };
    log::debug!(
        "Capturing {} scroll positions into {}",
        request.positions.len(),
        settings.temp_dir.display()
    );

    let shots = driver.capture(&request).await;
    let stitched = match shots {
        Ok(shots) if shots.is_empty() => {
            log::warn!("No screenshots captured for {}", output.display());
            Ok(None)
        }
        Ok(shots) => stitch(&shots, output).map(Some),
        Err(err) => Err(err),
    };

    remove_dir(&settings.temp_dir)?;
    stitched
}
