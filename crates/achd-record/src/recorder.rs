//! File-backed CSV sinks.
//!
//! Each sink owns its open file for its whole lifetime. Rows go through a
//! [`BufWriter`] that is flushed every `flush_every` rows and once more on
//! drop, so a log is complete on every exit path.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use achd_core::LoggingConfig;

use crate::error::RecordError;
use crate::types::{manipulator_header, ControlSample, ManipulatorFrame, CONTROL_HEADER};

// ---------------------------------------------------------------------------
// CsvFile
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CsvFile {
    path: PathBuf,
    writer: BufWriter<File>,
    flush_every: usize,
    pending: usize,
    rows: u64,
}

impl CsvFile {
    fn create(path: PathBuf, header: &str, flush_every: usize) -> Result<Self, RecordError> {
        let file = File::create(&path).map_err(|source| RecordError::Io {
            path: path.clone(),
            source,
        })?;
        let mut csv = Self {
            path,
            writer: BufWriter::new(file),
            flush_every: flush_every.max(1),
            pending: 0,
            rows: 0,
        };
        writeln!(csv.writer, "{header}").map_err(|source| csv.io(source))?;
        debug!(path = %csv.path.display(), "opened CSV log");
        Ok(csv)
    }

    fn write_row(&mut self, fields: impl IntoIterator<Item = f64>) -> Result<(), RecordError> {
        let mut first = true;
        for value in fields {
            let sep = if first { "" } else { "," };
            write!(self.writer, "{sep}{value}").map_err(|source| self.io(source))?;
            first = false;
        }
        writeln!(self.writer).map_err(|source| self.io(source))?;
        self.rows += 1;
        self.pending += 1;
        if self.pending >= self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RecordError> {
        self.writer.flush().map_err(|source| self.io(source))?;
        self.pending = 0;
        Ok(())
    }

    fn io(&self, source: std::io::Error) -> RecordError {
        RecordError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Drop for CsvFile {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!(error = %err, "failed to flush CSV log on close");
        }
    }
}

// ---------------------------------------------------------------------------
// ControlLog
// ---------------------------------------------------------------------------

/// Reference, measured value and control signal of one control variable.
#[derive(Debug)]
pub struct ControlLog {
    variable: String,
    file: CsvFile,
}

impl ControlLog {
    /// Create `<dir>/control_log_<variable>.csv` and write its header.
    pub fn create(
        dir: impl AsRef<Path>,
        variable: impl Into<String>,
        flush_every: usize,
    ) -> Result<Self, RecordError> {
        let variable = variable.into();
        let path = dir.as_ref().join(format!("control_log_{variable}.csv"));
        let file = CsvFile::create(path, CONTROL_HEADER, flush_every)?;
        Ok(Self { variable, file })
    }

    /// Open a log in the configured directory, or `None` when logging is off.
    pub fn from_config(
        config: &LoggingConfig,
        variable: impl Into<String>,
    ) -> Result<Option<Self>, RecordError> {
        config
            .log_dir
            .as_ref()
            .map(|dir| Self::create(dir, variable, config.flush_every))
            .transpose()
    }

    /// Append one sample.
    pub fn record(&mut self, measured: f64, reference: f64, control: f64) -> Result<(), RecordError> {
        self.record_sample(&ControlSample::new(reference, measured, control))
    }

    pub fn record_sample(&mut self, sample: &ControlSample) -> Result<(), RecordError> {
        self.file.write_row(sample.fields())
    }

    /// Write buffered rows to disk now.
    pub fn flush(&mut self) -> Result<(), RecordError> {
        self.file.flush()
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    /// Rows recorded so far, flushed or not.
    pub const fn rows(&self) -> u64 {
        self.file.rows
    }
}

// ---------------------------------------------------------------------------
// ManipulatorLog
// ---------------------------------------------------------------------------

/// Per-cycle [`ManipulatorFrame`]s of one arm.
#[derive(Debug)]
pub struct ManipulatorLog {
    arm: String,
    joint_count: usize,
    file: CsvFile,
}

impl ManipulatorLog {
    /// Create `<dir>/<arm>_manipulator_log.csv` for an arm with
    /// `joint_count` joints.
    pub fn create(
        dir: impl AsRef<Path>,
        arm: impl Into<String>,
        joint_count: usize,
        flush_every: usize,
    ) -> Result<Self, RecordError> {
        let arm = arm.into();
        let path = dir.as_ref().join(format!("{arm}_manipulator_log.csv"));
        let file = CsvFile::create(path, &manipulator_header(joint_count), flush_every)?;
        Ok(Self {
            arm,
            joint_count,
            file,
        })
    }

    pub fn from_config(
        config: &LoggingConfig,
        arm: impl Into<String>,
        joint_count: usize,
    ) -> Result<Option<Self>, RecordError> {
        config
            .log_dir
            .as_ref()
            .map(|dir| Self::create(dir, arm, joint_count, config.flush_every))
            .transpose()
    }

    /// Append one frame.
    ///
    /// # Errors
    ///
    /// [`RecordError::JointCount`] if the frame's torques do not match the
    /// header, [`RecordError::Io`] on write failure.
    pub fn record(&mut self, frame: &ManipulatorFrame) -> Result<(), RecordError> {
        if frame.joint_torques.len() != self.joint_count {
            return Err(RecordError::JointCount {
                expected: self.joint_count,
                got: frame.joint_torques.len(),
            });
        }
        self.file.write_row(frame.fields())
    }

    pub fn flush(&mut self) -> Result<(), RecordError> {
        self.file.flush()
    }

    pub fn arm(&self) -> &str {
        &self.arm
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    pub const fn rows(&self) -> u64 {
        self.file.rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
