//! Persists generated images into the destination folder.

use crate::error::{Result, SceneGenError};
use crate::scenario::Scenario;
use std::fs;
use std::path::{Path, PathBuf};

/// Default file name prefix for generated images.
pub const DEFAULT_PREFIX: &str = "generated_CAM3_pedestrian_bicycle";

/// Default extension for generated images.
pub const DEFAULT_EXTENSION: &str = "png";

/// Writes images to a staging directory, then moves them into the
/// destination directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dest_dir: PathBuf,
    staging_dir: PathBuf,
    prefix: String,
    extension: String,
}

impl OutputWriter {
    /// Creates a writer targeting `dest_dir`, staging in the current
    /// directory.
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            staging_dir: PathBuf::from("."),
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Sets where files are written before being moved.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Sets the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the file extension (without the dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Returns the destination directory.
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Creates the destination directory if it is missing.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.dest_dir)?;
        Ok(())
    }

    /// Builds `{prefix}_{scenario}_{index}_{suffix}.{extension}`.
    pub fn file_name(&self, scenario: Scenario, index: u32, suffix: u32) -> String {
        format!(
            "{}_{}_{}_{}.{}",
            self.prefix, scenario, index, suffix, self.extension
        )
    }

    /// Writes `data` under `name` and moves it into the destination.
    ///
    /// Returns the final path. If the move fails the staged file is left
    /// where it is and [`SceneGenError::FileMove`] is returned.
    pub fn write(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let staged = self.staging_dir.join(name);
        fs::write(&staged, data)?;
        tracing::debug!(path = %staged.display(), bytes = data.len(), "staged image");

        let dest = self.dest_dir.join(name);
        move_file(&staged, &dest).map_err(|source| SceneGenError::FileMove {
            from: staged,
            to: dest.clone(),
            source,
        })?;
        Ok(dest)
    }
}

/// Renames `from` to `to`, copying when a rename is not possible
/// (e.g. across filesystems).
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if from == to {
        return Ok(());
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if !to.parent().map_or(true, Path::is_dir) {
                return Err(rename_err);
            }
            copy_into_place(from, to, |path| fs::remove_file(path))
        }
    }
}

/// Copies `from` to `to`, then removes `from` with `remove`. Once the copy
/// lands, a failed cleanup only leaves a stray staged file behind.
fn copy_into_place(
    from: &Path,
    to: &Path,
    remove: impl FnOnce(&Path) -> std::io::Result<()>,
) -> std::io::Result<()> {
    fs::copy(from, to)?;
    if let Err(e) = remove(from) {
        tracing::warn!(path = %from.display(), "failed to remove staged image: {e}");
    }
    Ok(())
}
