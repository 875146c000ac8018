//! Renaming, compressing and pruning rotated log files.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use jiff::Zoned;

use crate::logger::config::RotationConfig;
use crate::logger::LoggerError;

/// Rotates a single log file according to a [`RotationConfig`].
#[derive(Debug, Clone)]
pub struct RotationManager {
    config: RotationConfig,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self { config }
    }

    pub fn should_rotate(&self, current_size: u64, incoming: usize) -> bool {
        current_size > 0 && current_size + incoming as u64 > self.config.max_size
    }

    /// Moves `active` aside, compresses it if configured and prunes old files.
    ///
    /// Returns the path of the rotated file.
    pub fn rotate(&self, active: &Path) -> Result<PathBuf, LoggerError> {
        let mut rotated = rotated_path(active);
        if active.exists() {
            fs::rename(active, &rotated)?;
            if self.config.compress {
                rotated = compress(&rotated)?;
            }
        }

        self.prune(active)?;
        Ok(rotated)
    }

    /// Rotated siblings of `active`, oldest first.
    pub fn rotated_files(active: &Path) -> Result<Vec<PathBuf>, LoggerError> {
        let parent = match active.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let prefix = format!("{}.", file_stem(active)?);

        let mut files: Vec<(std::time::SystemTime, PathBuf)> = fs::read_dir(parent)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.file_name() != active.file_name())
            .filter(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().starts_with(&prefix))
                    .unwrap_or(false)
            })
            .map(|path| {
                let modified = fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .unwrap_or(std::time::UNIX_EPOCH);
                (modified, path)
            })
            .collect();

        files.sort();
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }

    fn prune(&self, active: &Path) -> Result<(), LoggerError> {
        let files = Self::rotated_files(active)?;
        let excess = files.len().saturating_sub(self.config.max_files);
        for path in files.into_iter().take(excess) {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

fn file_stem(path: &Path) -> Result<String, LoggerError> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| LoggerError::rotation(format!("'{}' has no file name", path.display())))
}

/// `logs/warden.log` becomes `logs/warden.20261019_142501.log`, with a
/// numeric suffix when that name is already taken.
fn rotated_path(active: &Path) -> PathBuf {
    let timestamp = Zoned::now().strftime("%Y%m%d_%H%M%S").to_string();
    let stem = active.file_stem().unwrap_or_default().to_string_lossy();
    let ext = active.extension().map(|e| e.to_string_lossy());

    let name_for = |attempt: u32| {
        let stamp = if attempt == 0 {
            timestamp.clone()
        } else {
            format!("{timestamp}-{attempt}")
        };
        match &ext {
            Some(ext) => format!("{stem}.{stamp}.{ext}"),
            None => format!("{stem}.{stamp}"),
        }
    };

    let mut attempt = 0;
    loop {
        let candidate = active.with_file_name(name_for(attempt));
        let gz = PathBuf::from(format!("{}.gz", candidate.display()));
        if !candidate.exists() && !gz.exists() {
            return candidate;
        }
        attempt += 1;
    }
}

/// Gzips `path` into `path.gz` and removes the original.
fn compress(path: &Path) -> Result<PathBuf, LoggerError> {
    let target = PathBuf::from(format!("{}.gz", path.display()));

    let mut input = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&target)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(target)
}
