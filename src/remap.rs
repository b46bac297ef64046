use rgb::RGB;

use crate::error::ConvertError;
use crate::frame::{FramePixel, IndexedFrame, RgbaFrame};
use crate::nearest::NearestColorIndex;

/// Map RGBA pixels to palette indices through the cached index. Alpha is ignored.
pub fn remap_pixels(frame: &RgbaFrame, index: &mut NearestColorIndex) -> Vec<FramePixel> {
    frame
        .pixels()
        .iter()
        .map(|p| {
            FramePixel::Color(index.nearest(RGB {
                r: p.r,
                g: p.g,
                b: p.b,
            }))
        })
        .collect()
}

/// Maps a sequence of frames that must all share the first frame's dimensions.
#[derive(Debug, Clone, Default)]
pub struct FrameMapper {
    dimensions: Option<(usize, usize)>,
}

impl FrameMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions fixed by the first mapped frame.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.dimensions
    }

    /// Map `frame`, rejecting it if its size differs from the first frame's.
    /// `name` identifies the frame in errors.
    pub fn map(
        &mut self,
        name: &str,
        frame: &RgbaFrame,
        index: &mut NearestColorIndex,
    ) -> Result<IndexedFrame, ConvertError> {
        let actual = (frame.width(), frame.height());
        if actual.0 == 0 || actual.1 == 0 {
            return Err(ConvertError::ZeroDimension {
                frame: name.to_owned(),
            });
        }
        match self.dimensions {
            None => self.dimensions = Some(actual),
            Some(expected) if expected != actual => {
                return Err(ConvertError::DimensionMismatch {
                    frame: name.to_owned(),
                    expected,
                    actual,
                });
            }
            Some(_) => {}
        }

        let pixels = remap_pixels(frame, index);
        Ok(IndexedFrame::from_raw(actual.0, actual.1, pixels))
    }
}
