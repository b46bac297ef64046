use rgb::RGB;

use crate::histogram::pack;

/// Most colors a palette may hold. GIF index 0 is kept for transparency.
pub const MAX_PALETTE_COLORS: usize = 255;

/// A frozen set of at most 255 distinct representative colors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<RGB<u8>>,
}

impl Palette {
    /// Build a palette from representative colors: drops duplicates (first one
    /// wins), truncates to [`MAX_PALETTE_COLORS`], then sorts by luminance.
    pub fn from_colors(colors: Vec<RGB<u8>>) -> Self {
        let mut entries: Vec<RGB<u8>> = Vec::with_capacity(colors.len());
        for c in colors {
            if !entries.contains(&c) {
                entries.push(c);
            }
        }
        entries.truncate(MAX_PALETTE_COLORS);
        luminance_sort(&mut entries);
        Self { entries }
    }

    pub fn entries(&self) -> &[RGB<u8>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 256-entry GIF color table: index 0 is the reserved transparent slot
    /// (black), entry `i` lands at index `i + 1`, the rest is zero padding.
    pub fn to_gif_table(&self) -> Vec<u8> {
        let mut table = vec![0u8; 256 * 3];
        for (i, c) in self.entries.iter().enumerate() {
            let at = (i + 1) * 3;
            table[at..at + 3].copy_from_slice(&[c.r, c.g, c.b]);
        }
        table
    }
}

/// Integer Rec. 601 luma, scaled by 1000.
#[inline]
pub fn luminance(c: RGB<u8>) -> u32 {
    299 * c.r as u32 + 587 * c.g as u32 + 114 * c.b as u32
}

/// Luminance sort, ascending, ties broken by packed RGB.
fn luminance_sort(entries: &mut [RGB<u8>]) {
    entries.sort_by_key(|&c| (luminance(c), pack(c)));
}
