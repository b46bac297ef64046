//! Discovery of numbered frame files (`0.png`, `1.png`, ... `120.png`).

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConvertError;

const FRAME_EXTENSION: &str = "png";

/// Frame number of `name` if it is `<integer>.png` with integer >= `min_index`.
pub fn frame_index(name: &str, min_index: u64) -> Option<u64> {
    let mut parts = name.split('.');
    let (stem, ext) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || ext != FRAME_EXTENSION {
        return None;
    }
    let index: u64 = stem.parse().ok()?;
    (index >= min_index).then_some(index)
}

/// Keep the valid frame names and sort them by frame number.
pub fn filter_frame_names<I, S>(names: I, min_index: u64) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut frames: Vec<(u64, String)> = names
        .into_iter()
        .map(Into::into)
        .filter_map(|name| frame_index(&name, min_index).map(|i| (i, name)))
        .collect();
    frames.sort();
    frames.into_iter().map(|(_, name)| name).collect()
}

/// Numbered frame files in `dir`, ascending by number.
pub fn list_frame_files(dir: &Path, min_index: u64) -> Result<Vec<PathBuf>, ConvertError> {
    let read_err = |source| ConvertError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        // Names that are not valid UTF-8 cannot be <integer>.png.
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    let total = names.len();

    let frames = filter_frame_names(names, min_index);
    debug!(dir = %dir.display(), total, frames = frames.len(), "listed frame files");
    if frames.is_empty() {
        return Err(ConvertError::NoInputFrames {
            path: dir.to_path_buf(),
            min_index,
        });
    }

    Ok(frames.into_iter().map(|name| dir.join(name)).collect())
}
