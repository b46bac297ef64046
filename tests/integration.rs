//! Integration tests: numbered PNG files on disk → `framequant::convert` →
//! decode the written GIF with the `gif` crate and check what a viewer sees.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rgb::RGBA;

use framequant::{ConvertConfig, ConvertError};

const RED: RGBA<u8> = RGBA {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};
const GREEN: RGBA<u8> = RGBA {
    r: 0,
    g: 255,
    b: 0,
    a: 255,
};
const BLUE: RGBA<u8> = RGBA {
    r: 0,
    g: 0,
    b: 255,
    a: 255,
};

/// Write an 8-bit RGBA PNG.
fn write_png(path: &Path, width: u32, height: u32, pixels: &[RGBA<u8>]) {
    let file = File::create(path).unwrap();
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    let data: Vec<u8> = pixels.iter().flat_map(|p| [p.r, p.g, p.b, p.a]).collect();
    writer.write_image_data(&data).unwrap();
}

fn write_solid(dir: &Path, name: &str, width: u32, height: u32, color: RGBA<u8>) {
    let pixels = vec![color; (width * height) as usize];
    write_png(&dir.join(name), width, height, &pixels);
}

struct DecodedGif {
    width: u16,
    height: u16,
    global_palette: Vec<u8>,
    frames: Vec<gif::Frame<'static>>,
}

fn read_gif(path: &Path) -> DecodedGif {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let file = BufReader::new(File::open(path).unwrap());
    let mut decoder = options.read_info(file).unwrap();
    let (width, height) = (decoder.width(), decoder.height());
    let global_palette = decoder.global_palette().unwrap().to_vec();
    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().unwrap() {
        frames.push(frame.clone());
    }
    DecodedGif {
        width,
        height,
        global_palette,
        frames,
    }
}

fn convert_dir(dir: &Path, config: ConvertConfig) -> (PathBuf, DecodedGif) {
    let output = dir.join("out.gif");
    let written = framequant::convert(&config.input_dir(dir).output(&output)).unwrap();
    assert_eq!(written, output);
    let gif = read_gif(&output);
    (written, gif)
}

fn red_red_blue(dir: &Path) {
    write_solid(dir, "0.png", 2, 2, RED);
    write_solid(dir, "1.png", 2, 2, RED);
    write_solid(dir, "2.png", 2, 2, BLUE);
}

// ============================================================================
// End to end: directory → GIF file
// ============================================================================

mod end_to_end {
    use super::*;

    #[test]
    fn repeated_frame_is_dropped_and_delay_merged() {
        let dir = tempfile::tempdir().unwrap();
        red_red_blue(dir.path());
        let (_, gif) = convert_dir(dir.path(), ConvertConfig::new().fps(24));

        assert_eq!((gif.width, gif.height), (2, 2));
        // Index 0 is reserved; blue sorts before red by luminance.
        assert_eq!(&gif.global_palette[0..9], &[0, 0, 0, 0, 0, 255, 255, 0, 0]);

        let delays: Vec<u16> = gif.frames.iter().map(|f| f.delay).collect();
        assert_eq!(delays, vec![0, 8]);
        assert_eq!(&*gif.frames[0].buffer, &[2, 2, 2, 2]);
        assert_eq!(&*gif.frames[1].buffer, &[1, 1, 1, 1]);
        for f in &gif.frames {
            assert_eq!(f.transparent, Some(0));
            assert_eq!(f.dispose, gif::DisposalMethod::Keep);
        }
    }

    #[test]
    fn without_crop_repeat_is_fully_transparent() {
        let dir = tempfile::tempdir().unwrap();
        red_red_blue(dir.path());
        let (_, gif) = convert_dir(dir.path(), ConvertConfig::new().crop(false));

        let delays: Vec<u16> = gif.frames.iter().map(|f| f.delay).collect();
        assert_eq!(delays, vec![0, 4, 4]);
        assert_eq!(&*gif.frames[1].buffer, &[0, 0, 0, 0]);
        for f in &gif.frames {
            assert_eq!((f.left, f.top, f.width, f.height), (0, 0, 2, 2));
        }
    }

    #[test]
    fn without_transparency_frames_are_opaque() {
        let dir = tempfile::tempdir().unwrap();
        red_red_blue(dir.path());
        let (_, gif) = convert_dir(dir.path(), ConvertConfig::new().transparency(false));

        assert_eq!(gif.frames.len(), 3);
        assert_eq!(&*gif.frames[1].buffer, &[2, 2, 2, 2]);
        assert!(gif.frames.iter().all(|f| f.transparent.is_none()));
    }

    #[test]
    fn moving_dot_is_cropped_to_change() {
        let dir = tempfile::tempdir().unwrap();
        for step in 0..3usize {
            let mut pixels = vec![BLUE; 8 * 8];
            pixels[3 * 8 + step + 2] = RED;
            write_png(&dir.path().join(format!("{step}.png")), 8, 8, &pixels);
        }
        let (_, gif) = convert_dir(dir.path(), ConvertConfig::new());

        assert_eq!(gif.frames.len(), 3);
        assert_eq!((gif.frames[0].width, gif.frames[0].height), (8, 8));
        for (i, f) in gif.frames.iter().enumerate().skip(1) {
            // Old dot turns blue, new dot turns red: two adjacent columns.
            assert_eq!((f.left, f.top, f.width, f.height), (i as u16 + 1, 3, 2, 1));
            assert_eq!(&*f.buffer, &[1, 2]);
        }
    }

    #[test]
    fn palette_limited_by_max_colors() {
        let dir = tempfile::tempdir().unwrap();
        let width = 32;
        for phase in 0..3u32 {
            let pixels: Vec<RGBA<u8>> = (0..width * width)
                .map(|i| {
                    let (x, y) = (i % width, i / width);
                    RGBA::new((x * 8) as u8, (y * 8) as u8, (phase * 60) as u8, 255)
                })
                .collect();
            write_png(&dir.path().join(format!("{phase}.png")), width, width, &pixels);
        }
        let (_, gif) = convert_dir(dir.path(), ConvertConfig::new().max_colors(16));

        assert_eq!(gif.frames.len(), 3);
        for f in &gif.frames {
            assert!(f.buffer.iter().all(|&b| b <= 16), "index above palette");
        }
        // Frame 0 has no transparent pixels.
        assert!(gif.frames[0].buffer.iter().all(|&b| b != 0));
    }
}

// ============================================================================
// Frame discovery
// ============================================================================

mod discovery {
    use super::*;

    #[test]
    fn frames_below_minimum_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(dir.path(), "0.png", 2, 2, GREEN);
        write_solid(dir.path(), "1.png", 2, 2, GREEN);
        write_solid(dir.path(), "2.png", 2, 2, RED);
        write_solid(dir.path(), "3.png", 2, 2, BLUE);
        let (_, gif) = convert_dir(dir.path(), ConvertConfig::new().min_index(2));

        assert_eq!(gif.frames.len(), 2);
        // Green never reaches the histogram.
        assert_eq!(&gif.global_palette[3..9], &[0, 0, 255, 255, 0, 0]);
        assert_eq!(gif.frames[1].delay, 4);
    }

    #[test]
    fn numeric_order_and_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(dir.path(), "10.png", 2, 2, RED);
        write_solid(dir.path(), "9.png", 2, 2, BLUE);
        write_solid(dir.path(), "1.png", 2, 2, RED);
        std::fs::write(dir.path().join("notes.txt"), b"not a frame").unwrap();
        std::fs::write(dir.path().join("cover.png"), b"not a frame").unwrap();
        let (_, gif) = convert_dir(dir.path(), ConvertConfig::new());

        let colors: Vec<u8> = gif.frames.iter().map(|f| f.buffer[0]).collect();
        // red, blue, red
        assert_eq!(colors, vec![2, 1, 2]);
        let delays: Vec<u16> = gif.frames.iter().map(|f| f.delay).collect();
        assert_eq!(delays, vec![0, 4, 4]);
    }

    #[test]
    fn empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = framequant::convert(&ConvertConfig::new().input_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ConvertError::NoInputFrames { min_index: 0, .. }));
    }
}

// ============================================================================
// Failures
// ============================================================================

mod failures {
    use super::*;

    #[test]
    fn corrupt_frame_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(dir.path(), "0.png", 2, 2, RED);
        std::fs::write(dir.path().join("1.png"), b"garbage").unwrap();
        let output = dir.path().join("out.gif");
        let err = framequant::convert(&ConvertConfig::new().input_dir(dir.path()).output(&output))
            .unwrap_err();

        assert!(matches!(err, ConvertError::Decode { .. }));
        assert!(err.to_string().contains("1.png"), "{err}");
        assert!(!output.exists());
    }

    #[test]
    fn size_change_mid_sequence_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(dir.path(), "0.png", 4, 4, RED);
        write_solid(dir.path(), "1.png", 4, 3, RED);
        let err = framequant::convert(
            &ConvertConfig::new()
                .input_dir(dir.path())
                .output(dir.path().join("out.gif")),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 3),
                ..
            }
        ));
    }

    #[test]
    fn invalid_config_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            framequant::convert(&ConvertConfig::new().input_dir(&missing).max_colors(0)),
            Err(ConvertError::InvalidMaxColors(0))
        ));
    }
}
