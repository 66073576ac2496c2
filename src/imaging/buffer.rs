//! Owned RGBA8 pixel storage.
//!
//! Every operation in the engine reads or produces a [`PixelBuffer`]. The
//! buffer's fields are private so `pixels.len() == width * height * 4` holds
//! for every value that can be observed: constructors check it, in-place
//! mutation only hands out length-preserving slices, and operations that
//! change dimensions build a complete new buffer before it replaces the old.

use serde::Serialize;

/// Bytes per pixel: red, green, blue, alpha.
pub const CHANNELS: usize = 4;

/// Width and height of a buffer, reported back after every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of bytes an RGBA8 buffer of this size occupies.
    pub fn byte_len(self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rectangular RGBA8 image, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent black buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; Dimensions::new(width, height).byte_len()],
        }
    }

    /// Buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: rgba.repeat(count),
        }
    }

    /// Wrap existing interleaved RGBA bytes. Returns `None` if the length
    /// does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != Dimensions::new(width, height).byte_len() {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a buffer by evaluating `f` at every `(x, y)`.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(Dimensions::new(width, height).byte_len());
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access to the pixel bytes. The slice cannot change length, so
    /// the dimension invariant survives any write through it.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Read one pixel. Panics if `(x, y)` is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.pixels[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Overwrite this buffer with `other`, reusing the allocation when the
    /// sizes already agree.
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        if self.pixels.len() == other.pixels.len() {
            self.pixels.copy_from_slice(&other.pixels);
        } else {
            self.pixels.clone_from(&other.pixels);
        }
        self.width = other.width;
        self.height = other.height;
    }
}
