use rgb::RGBA;

/// A decoded full-color input frame, row-major, tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    width: usize,
    height: usize,
    pixels: Vec<RGBA<u8>>,
}

impl RgbaFrame {
    /// Wrap a pixel buffer. Returns `None` if `pixels.len() != width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<RGBA<u8>>) -> Option<Self> {
        if pixels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A frame filled with one color.
    pub fn solid(width: usize, height: usize, color: RGBA<u8>) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[RGBA<u8>] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [RGBA<u8>] {
        &mut self.pixels
    }
}

/// One pixel of an indexed frame.
///
/// `Unchanged` and palette entry 0 are distinct here; they only share a byte
/// value once the frame is serialized (see [`FramePixel::to_byte`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramePixel {
    /// Same as the previous frame; written as the transparent index.
    Unchanged,
    /// Palette entry index (0-based into the [`Palette`](crate::palette::Palette)).
    Color(u8),
}

impl FramePixel {
    /// Byte stored in the GIF stream: 0 for `Unchanged`, `index + 1` otherwise.
    #[inline]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Unchanged => 0,
            Self::Color(i) => i + 1,
        }
    }

    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::Unchanged,
            b => Self::Color(b - 1),
        }
    }
}

/// Inclusive pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl Rect {
    /// Rectangle covering a whole `width` x `height` canvas. Both must be non-zero.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: width - 1,
            max_y: height - 1,
        }
    }

    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// A frame of palette indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    width: usize,
    height: usize,
    pixels: Vec<FramePixel>,
}

impl IndexedFrame {
    /// Returns `None` if `pixels.len() != width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<FramePixel>) -> Option<Self> {
        if pixels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Caller guarantees `pixels.len() == width * height`.
    pub(crate) fn from_raw(width: usize, height: usize, pixels: Vec<FramePixel>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[FramePixel] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> FramePixel {
        self.pixels[y * self.width + x]
    }

    /// Copy out the pixels inside `rect`.
    pub fn crop(&self, rect: Rect) -> Self {
        let mut pixels = Vec::with_capacity(rect.width() * rect.height());
        for y in rect.min_y..=rect.max_y {
            let row = y * self.width;
            pixels.extend_from_slice(&self.pixels[row + rect.min_x..=row + rect.max_x]);
        }
        Self {
            width: rect.width(),
            height: rect.height(),
            pixels,
        }
    }

    /// Serialize to GIF index bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().map(|p| p.to_byte()).collect()
    }

    pub(crate) fn into_pixels(self) -> Vec<FramePixel> {
        self.pixels
    }
}
