//! PNG frame loading through the `png` crate.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rgb::RGBA;

use crate::error::ConvertError;
use crate::frame::RgbaFrame;

/// Decode the PNG at `path` to 8-bit RGBA.
pub fn load_png(path: &Path) -> Result<RgbaFrame, ConvertError> {
    let file = File::open(path).map_err(|source| ConvertError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    decode_png(BufReader::new(file), path)
}

/// Decode a PNG stream to 8-bit RGBA. `path` is only used for error context.
///
/// Palette, grayscale and 16-bit images are normalized by the decoder's
/// transformations; any of gray, gray+alpha, RGB or RGBA output is accepted.
pub fn decode_png<R: Read>(reader: R, path: &Path) -> Result<RgbaFrame, ConvertError> {
    let decode_err = |source| ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(
        png::Transformations::EXPAND | png::Transformations::STRIP_16 | png::Transformations::ALPHA,
    );
    let mut reader = decoder.read_info().map_err(decode_err)?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(decode_err)?;
    buf.truncate(info.buffer_size());

    let (width, height) = (info.width as usize, info.height as usize);
    if info.bit_depth != png::BitDepth::Eight {
        return Err(ConvertError::UnsupportedPixelFormat {
            path: path.to_path_buf(),
            color_type: info.color_type,
            bit_depth: info.bit_depth,
        });
    }

    let pixels: Vec<RGBA<u8>> = match info.color_type {
        png::ColorType::Rgba => buf
            .chunks_exact(4)
            .map(|c| RGBA::new(c[0], c[1], c[2], c[3]))
            .collect(),
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .map(|c| RGBA::new(c[0], c[1], c[2], 255))
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .map(|c| RGBA::new(c[0], c[0], c[0], c[1]))
            .collect(),
        png::ColorType::Grayscale => buf.iter().map(|&l| RGBA::new(l, l, l, 255)).collect(),
        color_type => {
            return Err(ConvertError::UnsupportedPixelFormat {
                path: path.to_path_buf(),
                color_type,
                bit_depth: info.bit_depth,
            });
        }
    };

    RgbaFrame::new(width, height, pixels).ok_or_else(|| ConvertError::UnsupportedPixelFormat {
        path: path.to_path_buf(),
        color_type: info.color_type,
        bit_depth: info.bit_depth,
    })
}
