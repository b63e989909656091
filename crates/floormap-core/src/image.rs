use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PatchError;

/// Number of interleaved colour channels in every patch and frame.
pub const RGB_CHANNELS: usize = 3;

/// Fixed `height x width x channels` shape shared by a classifier and its patches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl PatchShape {
    pub fn rgb(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            channels: RGB_CHANNELS,
        }
    }

    /// Number of bytes in one patch.
    #[inline]
    pub fn len(&self) -> usize {
        self.height * self.width * self.channels
    }

    /// [`Self::len`], `None` on overflow.
    #[inline]
    pub fn checked_len(&self) -> Option<usize> {
        self.height
            .checked_mul(self.width)?
            .checked_mul(self.channels)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0 || self.channels == 0
    }

    /// Number of pixels in one patch.
    #[inline]
    pub fn pixels(&self) -> usize {
        self.height * self.width
    }
}

impl fmt::Display for PatchShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

/// Borrowed colour patch, row-major interleaved RGB.
#[derive(Clone, Copy, Debug)]
pub struct PatchView<'a> {
    pub shape: PatchShape,
    pub data: &'a [u8], // len = h*w*3
}

impl<'a> PatchView<'a> {
    /// Iterate over `[r, g, b]` pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + 'a {
        self.data.chunks_exact(RGB_CHANNELS).map(|p| [p[0], p[1], p[2]])
    }
}

/// Owned colour patch, row-major interleaved RGB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbPatch {
    pub shape: PatchShape,
    pub data: Vec<u8>,
}

impl RgbPatch {
    pub fn new(height: usize, width: usize, data: Vec<u8>) -> Result<Self, PatchError> {
        let shape = PatchShape::rgb(height, width);
        if shape.is_empty() {
            return Err(PatchError::EmptyPatch(shape));
        }
        let expected = shape
            .checked_len()
            .ok_or_else(|| PatchError::TooLarge(vec![height, width, RGB_CHANNELS]))?;
        if data.len() != expected {
            return Err(PatchError::DataLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Patch filled with a single colour.
    pub fn filled(height: usize, width: usize, rgb: [u8; 3]) -> Self {
        let shape = PatchShape::rgb(height, width);
        let data = rgb.repeat(shape.pixels());
        Self { shape, data }
    }

    #[inline]
    pub fn view(&self) -> PatchView<'_> {
        PatchView {
            shape: self.shape,
            data: &self.data,
        }
    }
}

/// Calibration set of `N` equally shaped colour patches, stored as one
/// contiguous `(N, H, W, 3)` array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchStack {
    count: usize,
    shape: PatchShape,
    data: Vec<u8>,
}

impl PatchStack {
    /// Build a stack from an explicit array shape and its row-major data.
    ///
    /// The shape must have exactly four dimensions `(N, H, W, C)` with `C = 3`
    /// and `N >= 1`; anything else is rejected rather than reshaped.
    pub fn from_shape_vec(shape: &[usize], data: Vec<u8>) -> Result<Self, PatchError> {
        let &[count, height, width, channels] = shape else {
            return Err(PatchError::NotFourDimensional { ndim: shape.len() });
        };
        if channels != RGB_CHANNELS {
            return Err(PatchError::UnsupportedChannels {
                expected: RGB_CHANNELS,
                got: channels,
            });
        }
        let patch_shape = PatchShape::rgb(height, width);
        if patch_shape.is_empty() {
            return Err(PatchError::EmptyPatch(patch_shape));
        }
        if count == 0 {
            return Err(PatchError::EmptyStack);
        }
        let expected = patch_shape
            .checked_len()
            .and_then(|n| n.checked_mul(count))
            .ok_or_else(|| PatchError::TooLarge(shape.to_vec()))?;
        if data.len() != expected {
            return Err(PatchError::DataLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            count,
            shape: patch_shape,
            data,
        })
    }

    /// Stack individual patches; all of them must share the first patch's shape.
    pub fn from_patches(patches: &[RgbPatch]) -> Result<Self, PatchError> {
        let first = patches.first().ok_or(PatchError::EmptyStack)?;
        let mut data = Vec::with_capacity(patches.len() * first.shape.len());
        for p in patches {
            if p.shape != first.shape {
                return Err(PatchError::ShapeMismatch {
                    expected: first.shape,
                    got: p.shape,
                });
            }
            data.extend_from_slice(&p.data);
        }
        Self::from_shape_vec(
            &[patches.len(), first.shape.height, first.shape.width, first.shape.channels],
            data,
        )
    }

    /// Number of patches `N`.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Shape of every patch in the stack.
    #[inline]
    pub fn patch_shape(&self) -> PatchShape {
        self.shape
    }

    /// Full 4-D array shape `[N, H, W, C]`.
    pub fn shape(&self) -> [usize; 4] {
        [
            self.count,
            self.shape.height,
            self.shape.width,
            self.shape.channels,
        ]
    }

    pub fn get(&self, index: usize) -> Option<PatchView<'_>> {
        if index >= self.count {
            return None;
        }
        let n = self.shape.len();
        Some(PatchView {
            shape: self.shape,
            data: &self.data[index * n..(index + 1) * n],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = PatchView<'_>> {
        let shape = self.shape;
        self.data
            .chunks_exact(shape.len())
            .map(move |data| PatchView { shape, data })
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }
}

/// Full camera frame, row-major interleaved RGB.
#[derive(Clone, Debug)]
pub struct RgbFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbFrame {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, PatchError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(RGB_CHANNELS))
            .ok_or_else(|| PatchError::TooLarge(vec![height, width, RGB_CHANNELS]))?;
        if data.len() != expected {
            return Err(PatchError::DataLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        Self {
            width,
            height,
            data: rgb.repeat(width * height),
        }
    }

    /// Paint the window `[row, row + h) x [col, col + w)` with one colour,
    /// clipped to the frame.
    pub fn fill_rect(&mut self, row: usize, col: usize, h: usize, w: usize, rgb: [u8; 3]) {
        for r in row..(row + h).min(self.height) {
            for c in col..(col + w).min(self.width) {
                let idx = (r * self.width + c) * RGB_CHANNELS;
                self.data[idx..idx + RGB_CHANNELS].copy_from_slice(&rgb);
            }
        }
    }

    /// Copy out the window `[row, row + height) x [col, col + width)`.
    ///
    /// Windows that are not fully inside the frame are rejected.
    pub fn extract(
        &self,
        row: i64,
        col: i64,
        height: usize,
        width: usize,
    ) -> Result<RgbPatch, PatchError> {
        let row_end = row.saturating_add(i64::try_from(height).unwrap_or(i64::MAX));
        let col_end = col.saturating_add(i64::try_from(width).unwrap_or(i64::MAX));
        if row < 0 || col < 0 || row_end > self.height as i64 || col_end > self.width as i64 {
            return Err(PatchError::OutOfFrame {
                row,
                row_end,
                col,
                col_end,
                frame_height: self.height,
                frame_width: self.width,
            });
        }

        let (row, col) = (row as usize, col as usize);
        let mut data = Vec::with_capacity(height * width * RGB_CHANNELS);
        for r in row..row + height {
            let start = (r * self.width + col) * RGB_CHANNELS;
            data.extend_from_slice(&self.data[start..start + width * RGB_CHANNELS]);
        }
        RgbPatch::new(height, width, data)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

#[inline]
fn get_gray(src: &GrayImageView<'_>, x: i64, y: i64) -> f64 {
    if x < 0 || y < 0 || x >= src.width as i64 || y >= src.height as i64 {
        return 0.0;
    }
    src.data[y as usize * src.width + x as usize] as f64
}

/// Bilinear sample at `(x, y)`; pixels outside the image read as 0.
#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f64, y: f64) -> f64 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_gray(src, x0, y0);
    let p10 = get_gray(src, x0 + 1, y0);
    let p01 = get_gray(src, x0, y0 + 1);
    let p11 = get_gray(src, x0 + 1, y0 + 1);

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}
