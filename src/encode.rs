//! GIF output through the `gif` crate.
//!
//! The palette goes into one 256-entry global color table with index 0
//! reserved (see [`Palette::to_gif_table`](crate::palette::Palette::to_gif_table)),
//! so [`FramePixel`](crate::frame::FramePixel) bytes can be written as-is.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gif::{DisposalMethod, Encoder, Repeat};
use tracing::debug;

use crate::error::ConvertError;
use crate::pipeline::Animation;

/// Index written for unchanged pixels.
pub const TRANSPARENT_INDEX: u8 = 0;

fn dimension(width: usize, height: usize) -> Result<(u16, u16), ConvertError> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(ConvertError::CanvasTooLarge { width, height }),
    }
}

/// Encode `animation` into `writer` and hand the writer back.
/// `target` names the destination in errors.
pub fn encode_gif<W: Write>(
    animation: &Animation,
    writer: W,
    target: &Path,
) -> Result<W, ConvertError> {
    let encode_err = |source| ConvertError::Encode {
        path: target.to_path_buf(),
        source,
    };

    let (width, height) = dimension(animation.width, animation.height)?;
    let table = animation.palette.to_gif_table();

    let mut encoder = Encoder::new(writer, width, height, &table).map_err(encode_err)?;
    encoder.set_repeat(Repeat::Infinite).map_err(encode_err)?;

    let transparent = animation.transparency.then_some(TRANSPARENT_INDEX);
    for f in &animation.frames {
        let (w, h) = dimension(f.frame.width(), f.frame.height())?;
        let (left, top) = dimension(f.rect.min_x, f.rect.min_y)?;
        let frame = gif::Frame {
            width: w,
            height: h,
            left,
            top,
            delay: f.delay,
            dispose: DisposalMethod::Keep,
            transparent,
            buffer: Cow::Owned(f.frame.to_bytes()),
            ..gif::Frame::default()
        };
        encoder.write_frame(&frame).map_err(encode_err)?;
    }

    encoder
        .into_inner()
        .map_err(|e| encode_err(gif::EncodingError::from(e)))
}

/// Write `animation` to a GIF file at `path`.
pub fn write_gif(animation: &Animation, path: &Path) -> Result<(), ConvertError> {
    let file = File::create(path).map_err(|source| ConvertError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = encode_gif(animation, BufWriter::new(file), path)?;
    writer
        .into_inner()
        .map_err(|e| ConvertError::Encode {
            path: path.to_path_buf(),
            source: gif::EncodingError::from(e.into_error()),
        })?;
    debug!(path = %path.display(), frames = animation.frames.len(), "wrote gif");
    Ok(())
}
