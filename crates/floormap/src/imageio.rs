//! Conversions between `image` buffers and the mapping types.

use std::fs;
use std::path::{Path, PathBuf};

use ::image::{GrayImage, ImageBuffer, Luma, RgbImage};
use floormap_core::{PatchError, PatchStack, RgbFrame, RgbPatch};
use floormap_grid::OccupancyGrid;
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
    #[error("{path}: {source}")]
    Patch {
        path: PathBuf,
        #[source]
        source: PatchError,
    },
    #[error("no PNG patches found in {0}")]
    NoPatches(PathBuf),
}

/// Copy an RGB image into a camera frame.
pub fn rgb_frame(img: &RgbImage) -> RgbFrame {
    RgbFrame {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Copy a whole RGB image into a patch.
pub fn rgb_patch(img: &RgbImage) -> Result<RgbPatch, PatchError> {
    RgbPatch::new(
        img.height() as usize,
        img.width() as usize,
        img.as_raw().clone(),
    )
}

/// Decode any supported image file as an RGB patch.
pub fn load_patch(path: impl AsRef<Path>) -> Result<RgbPatch, LoadError> {
    let path = path.as_ref();
    let img = ::image::open(path)?.to_rgb8();
    rgb_patch(&img).map_err(|source| LoadError::Patch {
        path: path.to_path_buf(),
        source,
    })
}

/// Expand directories to their `.png` files (sorted by name); plain files
/// are kept in the order given.
pub fn collect_patch_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
    let mut out = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            out.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in fs::read_dir(input)? {
            let path = entry?.path();
            let is_png = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            if is_png && path.is_file() {
                found.push(path);
            }
        }
        if found.is_empty() {
            return Err(LoadError::NoPatches(input.clone()));
        }
        found.sort();
        out.extend(found);
    }
    Ok(out)
}

/// Load equally sized calibration patches into a stack.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(inputs)))]
pub fn load_patch_stack(inputs: &[PathBuf]) -> Result<PatchStack, LoadError> {
    let paths = collect_patch_paths(inputs)?;
    let mut patches = Vec::with_capacity(paths.len());
    for path in &paths {
        patches.push(load_patch(path)?);
    }
    debug!("loaded {} calibration patches", patches.len());
    PatchStack::from_patches(&patches).map_err(|source| LoadError::Patch {
        path: paths.first().cloned().unwrap_or_default(),
        source,
    })
}

/// The grid as a grayscale image, one pixel per cell, with the cell code
/// as intensity. Image rows follow grid rows.
pub fn render_grid(grid: &OccupancyGrid) -> GrayImage {
    let n = grid.size();
    let cells = grid.as_bytes();
    ImageBuffer::from_fn(n as u32, n as u32, |x, y| {
        Luma([cells[y as usize * n + x as usize]])
    })
}

pub fn save_grid_png(grid: &OccupancyGrid, path: impl AsRef<Path>) -> Result<(), LoadError> {
    render_grid(grid).save(path)?;
    Ok(())
}
