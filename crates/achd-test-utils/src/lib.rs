//! Shared test fixtures for achd crates.
//!
//! Robot descriptions live here as URDF strings so every crate tests
//! against the same geometry without touching the filesystem.

pub mod urdf;

pub use urdf::{write_fixture, PENDULUM, PENDULUM_WITH_TOOL, SIX_DOF_ARM, TWO_LINK_PLANAR};
