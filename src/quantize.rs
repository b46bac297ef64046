//! Palette generation by iterative worst-cluster splitting.
//!
//! Starting from one cluster that holds every distinct color, each round
//! reassigns all histogram elements to their nearest representative, moves
//! each representative to its cluster centroid, then splits the cluster with
//! the largest weighted squared error along its worst channel. A few Lloyd
//! passes tighten the result once the target size is reached.

use rgb::RGB;
use tracing::debug;

use crate::histogram::{Histogram, HistogramElement};
use crate::nearest::{NearestColorIndex, distance_sq, nearest_brute};
use crate::palette::{MAX_PALETTE_COLORS, Palette};

/// Lloyd refinement passes run after splitting.
pub const DEFAULT_REFINE_PASSES: usize = 3;

/// Split rounds before the loop gives up and falls back to [`top_up`]. Rounds
/// that drop a dead cluster add no color, so the count alone cannot bound it.
const MAX_SPLIT_ROUNDS: usize = 4 * MAX_PALETTE_COLORS;

/// A group of histogram elements sharing one palette entry.
#[derive(Debug, Clone)]
struct Cluster {
    rep: RGB<u8>,
    /// Indices into the element list.
    members: Vec<u32>,
}

/// Integer-truncated weighted centroid. `None` for an empty member list.
fn centroid(elements: &[HistogramElement], members: &[u32]) -> Option<RGB<u8>> {
    let mut sum_r = 0u64;
    let mut sum_g = 0u64;
    let mut sum_b = 0u64;
    let mut quantity = 0u64;
    for &m in members {
        let e = &elements[m as usize];
        sum_r += e.weight_r;
        sum_g += e.weight_g;
        sum_b += e.weight_b;
        quantity += e.quantity;
    }
    if quantity == 0 {
        return None;
    }
    Some(RGB {
        r: (sum_r / quantity) as u8,
        g: (sum_g / quantity) as u8,
        b: (sum_b / quantity) as u8,
    })
}

/// Weighted squared error of `members` around `center`, per channel.
fn channel_errors(elements: &[HistogramElement], members: &[u32], center: RGB<u8>) -> [u64; 3] {
    let mut err = [0u64; 3];
    for &m in members {
        let e = &elements[m as usize];
        let dr = e.color.r as i64 - center.r as i64;
        let dg = e.color.g as i64 - center.g as i64;
        let db = e.color.b as i64 - center.b as i64;
        err[0] += (dr * dr) as u64 * e.quantity;
        err[1] += (dg * dg) as u64 * e.quantity;
        err[2] += (db * db) as u64 * e.quantity;
    }
    err
}

fn cluster_error(elements: &[HistogramElement], members: &[u32], center: RGB<u8>) -> u64 {
    channel_errors(elements, members, center).iter().sum()
}

#[inline]
fn channel(c: RGB<u8>, axis: usize) -> u8 {
    match axis {
        0 => c.r,
        1 => c.g,
        _ => c.b,
    }
}

/// Total weighted squared error when every element takes its nearest entry.
pub fn palette_error(elements: &[HistogramElement], palette: &[RGB<u8>]) -> u64 {
    if palette.is_empty() {
        return 0;
    }
    elements
        .iter()
        .map(|e| {
            let nearest = palette[nearest_brute(palette, e.color) as usize];
            distance_sq(e.color, nearest) as u64 * e.quantity
        })
        .sum()
}

fn representatives(clusters: &[Cluster]) -> Vec<RGB<u8>> {
    clusters.iter().map(|c| c.rep).collect()
}

/// Working palette: representatives with duplicates dropped, first one kept.
fn distinct_representatives(clusters: &[Cluster]) -> Vec<RGB<u8>> {
    let mut reps: Vec<RGB<u8>> = Vec::with_capacity(clusters.len());
    for c in clusters {
        if !reps.contains(&c.rep) {
            reps.push(c.rep);
        }
    }
    reps
}

/// Reassign every element to the nearest representative.
fn assign(elements: &[HistogramElement], clusters: &mut [Cluster], index: &mut NearestColorIndex) {
    index.set_palette(&representatives(clusters));
    for c in clusters.iter_mut() {
        c.members.clear();
    }
    for (i, e) in elements.iter().enumerate() {
        let k = index.nearest(e.color) as usize;
        clusters[k].members.push(i as u32);
    }
}

/// Split along the channel with the most error, at the centroid's value on it.
fn split(elements: &[HistogramElement], members: &[u32], center: RGB<u8>) -> (Vec<u32>, Vec<u32>) {
    let err = channel_errors(elements, members, center);
    let mut axis = 0;
    for a in 1..3 {
        if err[a] > err[axis] {
            axis = a;
        }
    }
    let threshold = channel(center, axis);

    let (mut below, mut rest): (Vec<u32>, Vec<u32>) = members
        .iter()
        .partition(|&&m| channel(elements[m as usize].color, axis) < threshold);
    if below.is_empty() {
        // Truncation put the threshold on the minimum value.
        (below, rest) = members
            .iter()
            .partition(|&&m| channel(elements[m as usize].color, axis) <= threshold);
    }
    (below, rest)
}

/// Palette generator.
#[derive(Debug, Clone)]
pub struct Quantizer {
    refine_passes: usize,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self {
            refine_passes: DEFAULT_REFINE_PASSES,
        }
    }
}

impl Quantizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refine_passes(mut self, n: usize) -> Self {
        self.refine_passes = n;
        self
    }

    /// Generate at most `target_size` colors (capped at [`MAX_PALETTE_COLORS`]).
    pub fn generate(&self, histogram: &Histogram, target_size: usize) -> Palette {
        if target_size == 0 {
            return Palette::default();
        }
        let target = target_size.min(MAX_PALETTE_COLORS);
        self.generate_until(histogram, |reps| reps.len() >= target)
    }

    /// Split until `done` returns true for the working palette (distinct
    /// representatives so far), no cluster has any error left, or
    /// [`MAX_PALETTE_COLORS`] is reached.
    pub fn generate_until<F>(&self, histogram: &Histogram, mut done: F) -> Palette
    where
        F: FnMut(&[RGB<u8>]) -> bool,
    {
        let elements = histogram.elements();
        let all: Vec<u32> = (0..elements.len() as u32).collect();
        let Some(seed) = centroid(&elements, &all) else {
            return Palette::default();
        };

        let mut clusters = vec![Cluster {
            rep: seed,
            members: all,
        }];
        let mut index = NearestColorIndex::default();

        let mut rounds = 0;
        loop {
            let working = distinct_representatives(&clusters);
            if working.len() >= MAX_PALETTE_COLORS || done(&working) {
                break;
            }
            if rounds == MAX_SPLIT_ROUNDS {
                dedup_clusters(&mut clusters);
                top_up(&elements, &mut clusters, &mut index, &mut done);
                break;
            }
            rounds += 1;

            assign(&elements, &mut clusters, &mut index);
            // Entries nearest to nothing (duplicates lose ties to the lower
            // index) would otherwise hold an arena slot forever.
            clusters.retain(|c| !c.members.is_empty());
            for c in clusters.iter_mut() {
                if let Some(rep) = centroid(&elements, &c.members) {
                    c.rep = rep;
                }
            }

            let mut worst = None;
            let mut worst_err = 0u64;
            for (i, c) in clusters.iter().enumerate() {
                let err = cluster_error(&elements, &c.members, c.rep);
                if err > worst_err {
                    worst_err = err;
                    worst = Some(i);
                }
            }
            let Some(w) = worst else {
                debug!(colors = clusters.len(), "every cluster is exact, stopping early");
                break;
            };

            let (a, b) = split(&elements, &clusters[w].members, clusters[w].rep);
            let (Some(rep_a), Some(rep_b)) = (centroid(&elements, &a), centroid(&elements, &b))
            else {
                break;
            };
            clusters[w] = Cluster {
                rep: rep_a,
                members: a,
            };
            clusters.push(Cluster {
                rep: rep_b,
                members: b,
            });
        }

        dedup_clusters(&mut clusters);

        for pass in 0..self.refine_passes {
            refine_pass(&elements, &mut clusters, &mut index);
            debug!(
                pass,
                error = palette_error(&elements, &representatives(&clusters)),
                "refined palette"
            );
        }

        Palette::from_colors(representatives(&clusters))
    }
}

/// Keep the first cluster for each representative.
fn dedup_clusters(clusters: &mut Vec<Cluster>) {
    let mut seen: Vec<RGB<u8>> = Vec::with_capacity(clusters.len());
    clusters.retain(|c| {
        if seen.contains(&c.rep) {
            false
        } else {
            seen.push(c.rep);
            true
        }
    });
}

/// Add the worst-served color as a new entry until `done` holds. Every input
/// color with non-zero error is absent from the palette, so each step adds a
/// color. `clusters` must already be free of duplicate representatives.
fn top_up<F>(
    elements: &[HistogramElement],
    clusters: &mut Vec<Cluster>,
    index: &mut NearestColorIndex,
    done: &mut F,
) where
    F: FnMut(&[RGB<u8>]) -> bool,
{
    loop {
        let reps = representatives(clusters);
        if reps.len() >= MAX_PALETTE_COLORS || done(&reps) {
            return;
        }
        index.set_palette(&reps);
        let mut farthest = None;
        let mut farthest_err = 0u64;
        for e in elements {
            let near = reps[index.nearest(e.color) as usize];
            let err = distance_sq(e.color, near) as u64 * e.quantity;
            if err > farthest_err {
                farthest_err = err;
                farthest = Some(e.color);
            }
        }
        let Some(color) = farthest else {
            return;
        };
        debug!(colors = reps.len(), ?color, "split rounds exhausted, adding farthest color");
        clusters.push(Cluster {
            rep: color,
            members: Vec::new(),
        });
    }
}

/// One Lloyd pass. A representative only moves to its centroid when that does
/// not raise its cluster's error, so total error never increases.
fn refine_pass(
    elements: &[HistogramElement],
    clusters: &mut [Cluster],
    index: &mut NearestColorIndex,
) {
    assign(elements, clusters, index);
    for i in 0..clusters.len() {
        let Some(candidate) = centroid(elements, &clusters[i].members) else {
            continue;
        };
        // Already in place, or would duplicate another entry.
        if clusters.iter().any(|c| c.rep == candidate) {
            continue;
        }
        let c = &mut clusters[i];
        let before = cluster_error(elements, &c.members, c.rep);
        if cluster_error(elements, &c.members, candidate) <= before {
            c.rep = candidate;
        }
    }
}

/// Generate a palette of at most `target_size` colors with default settings.
pub fn generate(histogram: &Histogram, target_size: usize) -> Palette {
    Quantizer::new().generate(histogram, target_size)
}
