#![forbid(unsafe_code)]

pub mod decode;
pub mod delta;
pub mod encode;
pub mod error;
pub mod files;
pub mod frame;
pub mod histogram;
pub mod nearest;
pub mod palette;
pub mod pipeline;
pub mod quantize;
pub mod remap;

pub use error::ConvertError;
pub use frame::{FramePixel, IndexedFrame, Rect, RgbaFrame};
pub use palette::{MAX_PALETTE_COLORS, Palette};
pub use pipeline::{Animation, AnimationFrame, FrameSource, PngSequence, build_animation};

use std::path::{Path, PathBuf};

use tracing::info;

/// Configuration for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Directory holding `<n>.png` frames.
    pub input_dir: PathBuf,
    /// Frames numbered below this are ignored.
    pub min_index: u64,
    /// Nominal frames per second; sets the delay grid.
    pub fps: u32,
    /// Write pixels unchanged from the previous frame as transparent.
    pub transparency: bool,
    /// Crop each frame to its changed region and drop frames without change.
    /// Only has an effect with `transparency` on.
    pub crop: bool,
    /// Maximum number of palette colors (1..=255).
    pub max_colors: u32,
    /// Output file. If None, `<input dir name>.gif` in the working directory.
    pub output: Option<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            min_index: 0,
            fps: 24,
            transparency: true,
            crop: true,
            max_colors: MAX_PALETTE_COLORS as u32,
            output: None,
        }
    }
}

impl ConvertConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn min_index(mut self, index: u64) -> Self {
        self.min_index = index;
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn transparency(mut self, enabled: bool) -> Self {
        self.transparency = enabled;
        self
    }

    pub fn crop(mut self, enabled: bool) -> Self {
        self.crop = enabled;
        self
    }

    pub fn max_colors(mut self, n: u32) -> Self {
        self.max_colors = n;
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.fps == 0 {
            return Err(ConvertError::InvalidFrameRate(self.fps));
        }
        if self.max_colors == 0 || self.max_colors as usize > MAX_PALETTE_COLORS {
            return Err(ConvertError::InvalidMaxColors(self.max_colors));
        }
        Ok(())
    }

    /// Where the GIF will be written.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input_dir))
    }
}

/// `<dir name>.gif` in the working directory. Falls back to the canonical
/// path's last component for inputs like `.`, then to `out.gif`.
pub fn default_output_path(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_owned())
        .or_else(|| {
            std::fs::canonicalize(dir)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_owned()))
        })
        .unwrap_or_else(|| "out".into());
    let mut file = name;
    file.push(".gif");
    PathBuf::from(file)
}

/// Convert the numbered PNG frames in `config.input_dir` into one GIF.
/// Returns the path written.
pub fn convert(config: &ConvertConfig) -> Result<PathBuf, ConvertError> {
    config.validate()?;

    let mut source = PngSequence::open(&config.input_dir, config.min_index)?;
    info!(
        dir = %config.input_dir.display(),
        frames = source.len(),
        "found input frames"
    );

    let animation = build_animation(&mut source, config)?;
    let output = config.output_path();
    encode::write_gif(&animation, &output)?;
    info!(path = %output.display(), frames = animation.frames.len(), "wrote animation");
    Ok(output)
}
