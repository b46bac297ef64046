//! Inter-frame delta: pixels equal to the previous frame become
//! [`FramePixel::Unchanged`], optionally cropped to the changed region.

use crate::frame::{FramePixel, IndexedFrame, Rect};

/// Result of diffing one frame against its predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaFrame {
    /// Pixel data to emit; cropped to `rect` when cropping is on.
    pub frame: IndexedFrame,
    /// Position of `frame` on the canvas.
    pub rect: Rect,
    /// No pixel differs from the previous frame.
    pub unchanged: bool,
}

/// Minimal inclusive rectangle over the changed rows and columns.
fn changed_bounds(rows: &[bool], cols: &[bool]) -> Option<Rect> {
    let min_x = cols.iter().position(|&c| c)?;
    let max_x = cols.iter().rposition(|&c| c)?;
    let min_y = rows.iter().position(|&r| r)?;
    let max_y = rows.iter().rposition(|&r| r)?;
    Some(Rect {
        min_x,
        min_y,
        max_x,
        max_y,
    })
}

/// Stateful differ. Frames must be fed in display order.
#[derive(Debug, Clone, Default)]
pub struct DeltaOptimizer {
    crop: bool,
    previous: Option<Vec<FramePixel>>,
}

impl DeltaOptimizer {
    pub fn new(crop: bool) -> Self {
        Self {
            crop,
            previous: None,
        }
    }

    /// Forget the baseline; the next frame is treated as the first.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Diff `current` against the previous frame and make it the new baseline.
    ///
    /// The first frame passes through untouched. Later frames have every pixel
    /// equal to the baseline replaced with `Unchanged`. With cropping on, the
    /// result is cut to the bounding box of the changes; a frame with no change
    /// at all comes back full size with `unchanged` set.
    pub fn diff(&mut self, current: IndexedFrame) -> DeltaFrame {
        let (width, height) = (current.width(), current.height());
        let full = Rect::full(width, height);

        let Some(previous) = self.previous.take() else {
            self.previous = Some(current.pixels().to_vec());
            return DeltaFrame {
                frame: current,
                rect: full,
                unchanged: false,
            };
        };

        let mut rows = vec![false; height];
        let mut cols = vec![false; width];
        let mut delta = Vec::with_capacity(width * height);
        for (i, (&now, &before)) in current.pixels().iter().zip(&previous).enumerate() {
            if now == before {
                delta.push(FramePixel::Unchanged);
            } else {
                delta.push(now);
                rows[i / width] = true;
                cols[i % width] = true;
            }
        }

        // Baseline is the full pre-diff frame, never the delta.
        self.previous = Some(current.into_pixels());

        let delta = IndexedFrame::from_raw(width, height, delta);
        match changed_bounds(&rows, &cols) {
            None => DeltaFrame {
                frame: delta,
                rect: full,
                unchanged: true,
            },
            Some(rect) if self.crop => DeltaFrame {
                frame: delta.crop(rect),
                rect,
                unchanged: false,
            },
            Some(_) => DeltaFrame {
                frame: delta,
                rect: full,
                unchanged: false,
            },
        }
    }
}
