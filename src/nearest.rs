//! Nearest palette entry search with per-bucket candidate shortlists.
//!
//! RGB space is cut into 32x32x32 buckets (top 5 bits per channel). The first
//! query landing in a bucket computes a shortlist of entries that can be
//! nearest for *any* color in that bucket; later queries scan only that list.
//! A direct-mapped memo in front of the shortlists remembers the last answer
//! per slot.

use rgb::RGB;

const BUCKET_BITS: u32 = 5;
const BUCKET_SHIFT: u32 = 8 - BUCKET_BITS;
const BUCKET_SPAN: u8 = (1 << BUCKET_SHIFT) - 1;
const BUCKETS: usize = 1 << (BUCKET_BITS * 3);
const MEMO_SLOTS: usize = 1 << 15;

#[inline]
pub fn distance_sq(a: RGB<u8>, b: RGB<u8>) -> u32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    (dr * dr + dg * dg + db * db) as u32
}

#[inline]
fn bucket_of(color: RGB<u8>) -> usize {
    ((color.r >> BUCKET_SHIFT) as usize) << (BUCKET_BITS * 2)
        | ((color.g >> BUCKET_SHIFT) as usize) << BUCKET_BITS
        | (color.b >> BUCKET_SHIFT) as usize
}

/// Slot for the direct memo: the 15 most significant color bits.
#[inline]
fn memo_slot(color: RGB<u8>) -> usize {
    (((color.r as usize) >> 3) << 10) | (((color.g as usize) >> 3) << 5) | ((color.b as usize) >> 3)
}

/// Reference linear scan: lowest index wins ties. Returns 0 for an empty palette.
pub fn nearest_brute(entries: &[RGB<u8>], color: RGB<u8>) -> u8 {
    let mut best_idx = 0usize;
    let mut best_dist = u32::MAX;
    for (i, &e) in entries.iter().enumerate() {
        let d = distance_sq(color, e);
        if d < best_dist {
            best_dist = d;
            best_idx = i;
        }
    }
    best_idx as u8
}

/// Squared distance bounds from `p` to the closed interval `[lo, hi]` on one axis.
#[inline]
fn axis_bounds(p: u8, lo: u8, hi: u8) -> (u32, u32) {
    let (p, lo, hi) = (p as i32, lo as i32, hi as i32);
    let near = if p < lo {
        lo - p
    } else if p > hi {
        p - hi
    } else {
        0
    };
    let far = (p - lo).abs().max((hi - p).abs());
    ((near * near) as u32, (far * far) as u32)
}

/// Entries that can be nearest for some color in `bucket`, ascending by index.
fn build_shortlist(entries: &[RGB<u8>], bucket: usize) -> Vec<u8> {
    let lo = RGB {
        r: ((bucket >> (BUCKET_BITS * 2)) as u8) << BUCKET_SHIFT,
        g: (((bucket >> BUCKET_BITS) & 31) as u8) << BUCKET_SHIFT,
        b: ((bucket & 31) as u8) << BUCKET_SHIFT,
    };

    let mut bounds = Vec::with_capacity(entries.len());
    let mut bound = u32::MAX;
    for &e in entries {
        let (nr, fr) = axis_bounds(e.r, lo.r, lo.r + BUCKET_SPAN);
        let (ng, fg) = axis_bounds(e.g, lo.g, lo.g + BUCKET_SPAN);
        let (nb, fb) = axis_bounds(e.b, lo.b, lo.b + BUCKET_SPAN);
        let far = fr + fg + fb;
        bound = bound.min(far);
        bounds.push(nr + ng + nb);
    }

    bounds
        .iter()
        .enumerate()
        .filter(|&(_, &near)| near <= bound)
        .map(|(i, _)| i as u8)
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct MemoEntry {
    color: RGB<u8>,
    index: u8,
}

/// Counters for tuning and debug logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub queries: u64,
    pub memo_hits: u64,
    pub shortlists_built: u64,
}

/// Cached nearest-color search over one palette.
///
/// Owns both caches. Any change of palette goes through [`set_palette`](Self::set_palette),
/// which clears them.
#[derive(Debug, Clone)]
pub struct NearestColorIndex {
    entries: Vec<RGB<u8>>,
    shortlists: Vec<Option<Vec<u8>>>,
    memo: Vec<Option<MemoEntry>>,
    stats: IndexStats,
}

impl Default for NearestColorIndex {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl NearestColorIndex {
    /// `entries` must hold at most 256 colors.
    pub fn new(entries: Vec<RGB<u8>>) -> Self {
        debug_assert!(entries.len() <= 256);
        Self {
            entries,
            shortlists: vec![None; BUCKETS],
            memo: vec![None; MEMO_SLOTS],
            stats: IndexStats::default(),
        }
    }

    pub fn entries(&self) -> &[RGB<u8>] {
        &self.entries
    }

    /// Replace the palette and drop every cached answer.
    pub fn set_palette(&mut self, entries: &[RGB<u8>]) {
        debug_assert!(entries.len() <= 256);
        self.entries.clear();
        self.entries.extend_from_slice(entries);
        self.invalidate();
    }

    /// Clear both caches.
    pub fn invalidate(&mut self) {
        self.shortlists.iter_mut().for_each(|s| *s = None);
        self.memo.iter_mut().for_each(|m| *m = None);
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// Index of the closest entry to `color`. Returns 0 for an empty palette.
    pub fn nearest(&mut self, color: RGB<u8>) -> u8 {
        self.stats.queries += 1;

        let slot = memo_slot(color);
        if let Some(m) = self.memo[slot] {
            if m.color == color {
                self.stats.memo_hits += 1;
                return m.index;
            }
        }

        let bucket = bucket_of(color);
        if self.shortlists[bucket].is_none() {
            self.shortlists[bucket] = Some(build_shortlist(&self.entries, bucket));
            self.stats.shortlists_built += 1;
        }
        let shortlist = self.shortlists[bucket].as_deref().unwrap_or(&[]);

        let mut best_idx = 0u8;
        let mut best_dist = u32::MAX;
        for &i in shortlist {
            let d = distance_sq(color, self.entries[i as usize]);
            if d < best_dist {
                best_dist = d;
                best_idx = i;
            }
        }

        self.memo[slot] = Some(MemoEntry {
            color,
            index: best_idx,
        });
        best_idx
    }
}
