//! Size-rotating file writer plugged into `tracing_subscriber::fmt`.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::FileConfig;
use crate::logger::rotation::RotationManager;
use crate::logger::LoggerError;

/// Shared handle to the active log file. Clones write to the same file.
///
/// When the file can no longer be written the writer falls back to stderr
/// for the rest of the process.
#[derive(Clone)]
pub struct RotatingFileWriter {
    state: Arc<Mutex<WriterState>>,
}

struct WriterState {
    path: PathBuf,
    file: BufWriter<File>,
    current_size: u64,
    rotation: RotationManager,
    fallback: bool,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;
        let current_size = if config.append {
            std::fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                path: config.path.clone(),
                file,
                current_size,
                rotation: RotationManager::new(config.rotation.clone()),
                fallback: false,
            })),
        })
    }

    pub fn is_in_fallback_mode(&self) -> bool {
        self.lock().map(|state| state.fallback).unwrap_or(false)
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, WriterState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))
    }
}

impl WriterState {
    fn rotate(&mut self) -> Result<(), LoggerError> {
        self.file.flush()?;
        self.rotation.rotate(&self.path)?;
        self.file = open_log_file(&self.path, false)?;
        self.current_size = 0;
        Ok(())
    }

    fn enter_fallback(&mut self, error: &dyn std::fmt::Display) {
        self.fallback = true;
        eprintln!(
            "[logger] writing to {} failed, falling back to stderr: {}",
            self.path.display(),
            error
        );
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock()?;
        if state.fallback {
            return io::stderr().write(buf);
        }

        if state.rotation.should_rotate(state.current_size, buf.len()) {
            if let Err(e) = state.rotate() {
                state.enter_fallback(&e);
                return io::stderr().write(buf);
            }
        }

        match state.file.write(buf) {
            Ok(written) => {
                state.current_size += written as u64;
                Ok(written)
            }
            Err(e) => {
                state.enter_fallback(&e);
                io::stderr().write(buf)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.lock()?;
        if state.fallback {
            return io::stderr().flush();
        }
        state.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriterGuard {
            inner: self.clone(),
        }
    }
}

/// Per-event writer. Flushes when the event has been formatted.
pub struct RotatingWriterGuard {
    inner: RotatingFileWriter,
}

impl Write for RotatingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Drop for RotatingWriterGuard {
    fn drop(&mut self) {
        let _ = self.inner.flush();
    }
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}
