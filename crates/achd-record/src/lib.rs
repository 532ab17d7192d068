//! `achd-record`: CSV logs of the per-cycle controller values.
//!
//! Two sinks are provided:
//!
//! | Sink               | File                          | One row per                 |
//! |--------------------|-------------------------------|-----------------------------|
//! | [`ControlLog`]     | `control_log_<variable>.csv`  | control-law evaluation      |
//! | [`ManipulatorLog`] | `<arm>_manipulator_log.csv`   | control cycle of one arm    |
//!
//! Both open their file on construction, buffer rows, write them out every
//! `flush_every` rows and flush the remainder when dropped. Logging happens
//! at the caller's cycle boundary; nothing here is called by the solver.

pub mod error;
pub mod recorder;
pub mod types;

pub use error::RecordError;
pub use recorder::{ControlLog, ManipulatorLog};
pub use types::{manipulator_header, ControlSample, ManipulatorFrame, CONTROL_HEADER};
