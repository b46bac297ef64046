//! Two-pass conversion: histogram over every frame, one shared palette, then
//! map + diff each frame in order.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::ConvertConfig;
use crate::decode::load_png;
use crate::delta::DeltaOptimizer;
use crate::error::ConvertError;
use crate::files::list_frame_files;
use crate::frame::{IndexedFrame, Rect, RgbaFrame};
use crate::histogram::Histogram;
use crate::nearest::NearestColorIndex;
use crate::palette::Palette;
use crate::quantize::Quantizer;
use crate::remap::FrameMapper;

/// An ordered, re-readable sequence of input frames.
pub trait FrameSource {
    fn len(&self) -> usize;

    /// Label for logs and errors.
    fn name(&self, index: usize) -> String;

    fn load(&mut self, index: usize) -> Result<RgbaFrame, ConvertError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FrameSource for Vec<RgbaFrame> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn name(&self, index: usize) -> String {
        format!("#{index}")
    }

    fn load(&mut self, index: usize) -> Result<RgbaFrame, ConvertError> {
        Ok(self[index].clone())
    }
}

/// Numbered PNG files, decoded on demand.
#[derive(Debug, Clone)]
pub struct PngSequence {
    paths: Vec<PathBuf>,
}

impl PngSequence {
    /// Every `<n>.png` in `dir` with `n >= min_index`, ascending by `n`.
    pub fn open(dir: &Path, min_index: u64) -> Result<Self, ConvertError> {
        Ok(Self {
            paths: list_frame_files(dir, min_index)?,
        })
    }
}

impl FrameSource for PngSequence {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn name(&self, index: usize) -> String {
        self.paths[index].display().to_string()
    }

    fn load(&mut self, index: usize) -> Result<RgbaFrame, ConvertError> {
        load_png(&self.paths[index])
    }
}

/// One emitted frame of the output animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Position of the source frame in the input sequence.
    pub position: usize,
    /// Where `frame` sits on the canvas.
    pub rect: Rect,
    pub frame: IndexedFrame,
    /// Centiseconds since the previously emitted frame.
    pub delay: u16,
}

/// Quantized, delta-encoded frames ready for the GIF encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub width: usize,
    pub height: usize,
    pub palette: Palette,
    /// Unchanged pixels are written as the transparent index.
    pub transparency: bool,
    pub frames: Vec<AnimationFrame>,
}

impl Animation {
    pub fn delays(&self) -> Vec<u16> {
        self.frames.iter().map(|f| f.delay).collect()
    }
}

/// Delay for the frame at `position` when the last emitted one was at
/// `last_emitted`: both are converted to centiseconds first, so skipped frames
/// fold into the gap.
pub fn frame_delay(position: usize, last_emitted: usize, fps: u32) -> u16 {
    let fps = u64::from(fps.max(1));
    let centis = |i: usize| i as u64 * 100 / fps;
    let delay = centis(position).saturating_sub(centis(last_emitted));
    delay.min(u64::from(u16::MAX)) as u16
}

/// Build the shared histogram from every frame of `source`.
pub fn collect_histogram<S: FrameSource + ?Sized>(
    source: &mut S,
) -> Result<Histogram, ConvertError> {
    let mut histogram = Histogram::new();
    for i in 0..source.len() {
        let frame = source.load(i)?;
        histogram.record(&frame);
        debug!(frame = %source.name(i), distinct = histogram.distinct(), "recorded histogram");
    }
    Ok(histogram)
}

/// Run the whole pipeline over `source`.
pub fn build_animation<S: FrameSource + ?Sized>(
    source: &mut S,
    config: &ConvertConfig,
) -> Result<Animation, ConvertError> {
    config.validate()?;

    let histogram = collect_histogram(source)?;
    info!(
        frames = source.len(),
        pixels = histogram.total(),
        distinct = histogram.distinct(),
        "histogram complete"
    );

    let palette = Quantizer::new().generate(&histogram, config.max_colors as usize);
    info!(colors = palette.len(), "palette generated");
    drop(histogram);

    let mut index = NearestColorIndex::default();
    index.set_palette(palette.entries());
    let mut mapper = FrameMapper::new();
    let mut delta = DeltaOptimizer::new(config.crop);

    let mut frames = Vec::with_capacity(source.len());
    let mut last_emitted = 0usize;
    for i in 0..source.len() {
        let name = source.name(i);
        let rgba = source.load(i)?;
        let indexed = mapper.map(&name, &rgba, &mut index)?;

        let (frame, rect) = if config.transparency {
            let d = delta.diff(indexed);
            if config.crop && d.unchanged {
                debug!(frame = %name, "unchanged, skipped");
                continue;
            }
            (d.frame, d.rect)
        } else {
            let rect = Rect::full(indexed.width(), indexed.height());
            (indexed, rect)
        };

        let delay = frame_delay(i, last_emitted, config.fps);
        debug!(
            frame = %name,
            delay,
            left = rect.min_x,
            top = rect.min_y,
            width = rect.width(),
            height = rect.height(),
            "emitted"
        );
        frames.push(AnimationFrame {
            position: i,
            rect,
            frame,
            delay,
        });
        last_emitted = i;
    }

    let stats = index.stats();
    debug!(
        queries = stats.queries,
        memo_hits = stats.memo_hits,
        shortlists = stats.shortlists_built,
        "nearest-color cache"
    );

    let (width, height) = mapper.dimensions().unwrap_or((0, 0));
    info!(
        emitted = frames.len(),
        skipped = source.len() - frames.len(),
        "frames encoded"
    );
    Ok(Animation {
        width,
        height,
        palette,
        transparency: config.transparency,
        frames,
    })
}
