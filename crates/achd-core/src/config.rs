use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_dt() -> f64 {
    0.001
}
const fn default_gravity() -> [f64; 3] {
    [0.0, 0.0, -9.81]
}
const fn default_flush_every() -> usize {
    100
}
fn default_arm_name() -> String {
    "arm".into()
}

// ---------------------------------------------------------------------------
// ControlConfig
// ---------------------------------------------------------------------------

/// Fixed-rate control loop parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Control period in seconds (default: 0.001 = 1000 Hz).
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Gravity vector [x, y, z] in m/s^2, expressed in the chain base frame.
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            gravity: default_gravity(),
        }
    }
}

impl ControlConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidControlDt(self.dt));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "control.gravity".into(),
                message: "components must be finite".into(),
            });
        }
        Ok(())
    }

    /// Control rate in Hz.
    pub fn control_hz(&self) -> f64 {
        1.0 / self.dt
    }

    /// Root acceleration that models gravity in the dynamics recursion
    /// (`-gravity`, as a `[linear, angular]` 6-vector).
    pub fn root_acceleration(&self) -> [f64; 6] {
        [
            -self.gravity[0],
            -self.gravity[1],
            -self.gravity[2],
            0.0,
            0.0,
            0.0,
        ]
    }
}

// ---------------------------------------------------------------------------
// ArmConfig
// ---------------------------------------------------------------------------

/// Robot description and chain endpoints for one manipulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    #[serde(default = "default_arm_name")]
    pub name: String,
    pub urdf_path: PathBuf,
    pub base_link: String,
    pub tool_link: String,
    /// Initial joint positions in chain order (rad or m). Empty means all zero.
    #[serde(default)]
    pub initial_joint_positions: Vec<f64>,
}

impl ArmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_link.is_empty() {
            return Err(ConfigError::MissingField("arm.base_link".into()));
        }
        if self.tool_link.is_empty() {
            return Err(ConfigError::MissingField("arm.tool_link".into()));
        }
        if self.initial_joint_positions.iter().any(|q| !q.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "arm.initial_joint_positions".into(),
                message: "values must be finite".into(),
            });
        }
        Ok(())
    }

    /// Initial joint positions, or `None` when the config leaves them unset.
    pub fn initial_q(&self) -> Option<&[f64]> {
        (!self.initial_joint_positions.is_empty()).then_some(self.initial_joint_positions.as_slice())
    }
}

// ---------------------------------------------------------------------------
// LoggingConfig
// ---------------------------------------------------------------------------

/// Where and how often the per-cycle CSV logs are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output directory. `None` disables file logging.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rows buffered before a write to disk (default: 100).
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            flush_every: default_flush_every(),
        }
    }
}

// ---------------------------------------------------------------------------
// ControllerConfig
// ---------------------------------------------------------------------------

/// Complete controller configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub control: ControlConfig,
    pub arm: ArmConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ControllerConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.control.validate()?;
        self.arm.validate()?;
        if self.logging.flush_every == 0 {
            return Err(ConfigError::InvalidValue {
                field: "logging.flush_every".into(),
                message: "must be > 0".into(),
            });
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_TOML: &str = r#"
        [control]
        dt = 0.002
        gravity = [0.0, 0.0, -9.8]

        [arm]
        name = "kinova_left"
        urdf_path = "urdf/gen3.urdf"
        base_link = "base_link"
        tool_link = "bracelet_link"
        initial_joint_positions = [0.0, 0.26, 0.0, 2.26, 0.0, -0.95, -1.57]

        [logging]
        log_dir = "/tmp/achd_logs"
        flush_every = 50
    "#;

    // ---- ControlConfig ----

    #[test]
    fn control_config_default_values() {
        let cfg = ControlConfig::default();
        assert!((cfg.dt - 0.001).abs() < f64::EPSILON);
        assert!((cfg.gravity[2] + 9.81).abs() < f64::EPSILON);
        assert!((cfg.control_hz() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn control_config_rejects_non_positive_dt() {
        for dt in [0.0, -0.001, f64::NAN] {
            let cfg = ControlConfig {
                dt,
                ..ControlConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidControlDt(_))
            ));
        }
    }

    #[test]
    fn control_config_rejects_non_finite_gravity() {
        let cfg = ControlConfig {
            gravity: [0.0, f64::INFINITY, -9.81],
            ..ControlConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn root_acceleration_opposes_gravity() {
        let cfg = ControlConfig::default();
        assert_eq!(cfg.root_acceleration(), [0.0, 0.0, 9.81, 0.0, 0.0, 0.0]);
    }

    // ---- ControllerConfig ----

    #[test]
    fn controller_config_full_toml() {
        let cfg = ControllerConfig::from_toml_str(FULL_TOML).unwrap();
        assert!((cfg.control.dt - 0.002).abs() < f64::EPSILON);
        assert_eq!(cfg.arm.name, "kinova_left");
        assert_eq!(cfg.arm.tool_link, "bracelet_link");
        assert_eq!(cfg.arm.initial_q().map(<[f64]>::len), Some(7));
        assert_eq!(cfg.logging.flush_every, 50);
        assert_eq!(cfg.logging.log_dir, Some(PathBuf::from("/tmp/achd_logs")));
    }

    #[test]
    fn controller_config_defaults_applied() {
        let cfg = ControllerConfig::from_toml_str(
            r#"
            [arm]
            urdf_path = "arm.urdf"
            base_link = "base"
            tool_link = "tool"
        "#,
        )
        .unwrap();
        assert_eq!(cfg.control, ControlConfig::default());
        assert_eq!(cfg.logging, LoggingConfig::default());
        assert_eq!(cfg.arm.name, "arm");
        assert!(cfg.arm.initial_q().is_none());
    }

    #[test]
    fn controller_config_missing_arm_is_parse_error() {
        let result = ControllerConfig::from_toml_str("[control]\ndt = 0.001\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn controller_config_rejects_empty_tool_link() {
        let result = ControllerConfig::from_toml_str(
            r#"
            [arm]
            urdf_path = "arm.urdf"
            base_link = "base"
            tool_link = ""
        "#,
        );
        assert!(matches!(result, Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn controller_config_rejects_zero_flush_every() {
        let result = ControllerConfig::from_toml_str(
            r#"
            [arm]
            urdf_path = "arm.urdf"
            base_link = "base"
            tool_link = "tool"

            [logging]
            flush_every = 0
        "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn controller_config_from_file() {
        let dir = std::env::temp_dir().join("achd_test_controller_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("controller.toml");
        std::fs::write(&path, FULL_TOML).unwrap();

        let cfg = ControllerConfig::from_file(&path).unwrap();
        assert_eq!(cfg.arm.base_link, "base_link");

        // Cleanup
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn controller_config_from_file_not_found() {
        let result = ControllerConfig::from_file("/nonexistent/path/controller.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
