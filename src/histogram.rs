use std::collections::BTreeMap;

use rgb::RGB;

use crate::frame::RgbaFrame;

#[inline]
pub(crate) fn pack(color: RGB<u8>) -> u32 {
    (color.r as u32) << 16 | (color.g as u32) << 8 | color.b as u32
}

#[inline]
pub(crate) fn unpack(key: u32) -> RGB<u8> {
    RGB {
        r: (key >> 16) as u8,
        g: (key >> 8) as u8,
        b: key as u8,
    }
}

/// A distinct color with its pixel count and per-channel weighted sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramElement {
    pub color: RGB<u8>,
    /// Number of pixels of this color.
    pub quantity: u64,
    pub weight_r: u64,
    pub weight_g: u64,
    pub weight_b: u64,
}

impl HistogramElement {
    pub fn new(color: RGB<u8>, quantity: u64) -> Self {
        Self {
            color,
            quantity,
            weight_r: color.r as u64 * quantity,
            weight_g: color.g as u64 * quantity,
            weight_b: color.b as u64 * quantity,
        }
    }
}

/// Exact RGB pixel counts across every recorded frame. Alpha is ignored.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    counts: BTreeMap<u32, u64>,
    total: u64,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames<'a>(frames: impl IntoIterator<Item = &'a RgbaFrame>) -> Self {
        let mut hist = Self::new();
        for frame in frames {
            hist.record(frame);
        }
        hist
    }

    /// Count every pixel of `frame`.
    pub fn record(&mut self, frame: &RgbaFrame) {
        for p in frame.pixels() {
            let key = pack(RGB {
                r: p.r,
                g: p.g,
                b: p.b,
            });
            *self.counts.entry(key).or_insert(0) += 1;
        }
        self.total += frame.pixels().len() as u64;
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct colors seen.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, color: RGB<u8>) -> u64 {
        self.counts.get(&pack(color)).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// One element per distinct color, ascending by (R, G, B).
    pub fn elements(&self) -> Vec<HistogramElement> {
        self.counts
            .iter()
            .map(|(&key, &quantity)| HistogramElement::new(unpack(key), quantity))
            .collect()
    }
}
