//! Error types for URDF loading.

use std::path::PathBuf;

/// Errors that can occur while loading a robot description.
#[derive(Debug, thiserror::Error)]
pub enum UrdfError {
    /// Failed to read the URDF file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse URDF XML content.
    #[error("URDF parse error: {0}")]
    Parse(String),

    /// A referenced link was not found in the model.
    #[error("missing link: {0}")]
    MissingLink(String),

    /// A referenced joint was not found in the model.
    #[error("missing joint: {0}")]
    MissingJoint(String),

    /// Invalid or unsupported joint type.
    #[error("unsupported joint type: {0}")]
    UnsupportedJointType(String),

    /// The URDF has no root link (no link that is never a child).
    #[error("no root link found")]
    NoRootLink,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            UrdfError::Parse("bad xml".into()).to_string(),
            "URDF parse error: bad xml"
        );
        assert_eq!(
            UrdfError::MissingLink("tool_frame".into()).to_string(),
            "missing link: tool_frame"
        );
        assert_eq!(
            UrdfError::MissingJoint("elbow".into()).to_string(),
            "missing joint: elbow"
        );
        assert_eq!(
            UrdfError::UnsupportedJointType("Spherical".into()).to_string(),
            "unsupported joint type: Spherical"
        );
        assert_eq!(UrdfError::NoRootLink.to_string(), "no root link found");
    }

    #[test]
    fn io_error_includes_path() {
        let e = UrdfError::Io {
            path: PathBuf::from("/tmp/gen3.urdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/gen3.urdf"));
        assert!(msg.contains("not found"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn error_is_send_sync() {
        assert_send_sync::<UrdfError>();
    }
}
