use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot read input directory {}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no frames named <n>.png with n >= {min_index} in {}", path.display())]
    NoInputFrames { path: PathBuf, min_index: u64 },

    #[error("cannot open frame {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode frame {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: png::DecodingError,
    },

    #[error("frame {} has unsupported pixel format {color_type:?}/{bit_depth:?}", path.display())]
    UnsupportedPixelFormat {
        path: PathBuf,
        color_type: png::ColorType,
        bit_depth: png::BitDepth,
    },

    #[error(
        "frame {frame} is {}x{}, expected {}x{} like the first frame",
        actual.0, actual.1, expected.0, expected.1
    )]
    DimensionMismatch {
        frame: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("frame {frame} has a zero dimension")]
    ZeroDimension { frame: String },

    #[error("frame rate must be at least 1, got {0}")]
    InvalidFrameRate(u32),

    #[error("max_colors must be between 1 and 255, got {0}")]
    InvalidMaxColors(u32),

    #[error("canvas {width}x{height} exceeds the GIF limit of 65535x65535")]
    CanvasTooLarge { width: usize, height: usize },

    #[error("cannot create output file {}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode GIF {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: gif::EncodingError,
    },
}
