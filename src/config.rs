//! Run configuration read from a TOML file.
//!
//! ```toml
//! meshFile = "bay.msh"      # or meshName
//! nSteps = 500              # or dt = 0.001
//! tEnd = 0.5
//! writeFrequency = 10       # optional, frames every 10 steps
//! logName = "logfile"       # optional, log written to logfile.log
//! borders = [[0.0, 0.45], [0.0, 0.2]]   # optional fishing ground
//! xStart = [0.35, 0.45]     # optional slick centre
//! sigma2 = 0.01             # optional slick spread
//! outputDir = "output"      # optional frame directory
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::mesh::geometry::Point2;
use crate::simulation::{DEFAULT_SIGMA2, DEFAULT_X_START};
use crate::types::Bounds2D;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required config entry: {0}")]
    Missing(&'static str),

    #[error("invalid value for '{key}': {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// File layout, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    #[serde(alias = "meshName")]
    mesh_file: Option<PathBuf>,
    dt: Option<f64>,
    n_steps: Option<i64>,
    t_end: Option<f64>,
    write_frequency: Option<i64>,
    #[serde(default = "default_log_name")]
    log_name: String,
    borders: Option<[[f64; 2]; 2]>,
    x_start: Option<Point2>,
    sigma2: Option<f64>,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

fn default_log_name() -> String {
    "logfile".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Validated run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub mesh_file: PathBuf,
    pub dt: f64,
    /// Set when the file gives a step count instead of dt
    pub n_steps: Option<usize>,
    pub t_end: f64,
    pub write_frequency: Option<usize>,
    pub log_name: String,
    pub fishing_ground: Bounds2D,
    pub x_start: Point2,
    pub sigma2: f64,
    pub output_dir: PathBuf,
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// Path of the log file: `<dir>/<logName>.log`.
    pub fn log_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.log", self.log_name))
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let mesh_file = raw.mesh_file.ok_or(ConfigError::Missing("meshFile"))?;
        let t_end = raw.t_end.ok_or(ConfigError::Missing("tEnd"))?;
        if !t_end.is_finite() || t_end <= 0.0 {
            return Err(invalid("tEnd", t_end, "must be > 0"));
        }

        let (dt, n_steps) = match (raw.dt, raw.n_steps) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    key: "dt",
                    value: "dt and nSteps".to_string(),
                    reason: "give either dt or nSteps, not both",
                });
            }
            (None, None) => return Err(ConfigError::Missing("dt or nSteps")),
            (Some(dt), None) => {
                if !dt.is_finite() || dt <= 0.0 {
                    return Err(invalid("dt", dt, "must be > 0"));
                }
                (dt, None)
            }
            (None, Some(n)) => {
                let n = usize::try_from(n)
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| invalid("nSteps", n, "must be > 0"))?;
                (t_end / n as f64, Some(n))
            }
        };

        let write_frequency = match raw.write_frequency {
            None | Some(0) => None,
            Some(f) => Some(
                usize::try_from(f).map_err(|_| invalid("writeFrequency", f, "must be >= 0"))?,
            ),
        };

        let fishing_ground = match raw.borders {
            Some(ranges) => Bounds2D::from_ranges(ranges).ok_or_else(|| {
                invalid(
                    "borders",
                    format!("{:?}", ranges),
                    "need [[xmin, xmax], [ymin, ymax]] with min < max",
                )
            })?,
            None => Bounds2D::fishing_ground(),
        };

        let sigma2 = raw.sigma2.unwrap_or(DEFAULT_SIGMA2);
        if !sigma2.is_finite() || sigma2 <= 0.0 {
            return Err(invalid("sigma2", sigma2, "must be > 0"));
        }

        if raw.log_name.trim().is_empty() {
            return Err(invalid("logName", "\"\"", "must not be empty"));
        }

        Ok(Self {
            mesh_file,
            dt,
            n_steps,
            t_end,
            write_frequency,
            log_name: raw.log_name,
            fishing_ground,
            x_start: raw.x_start.unwrap_or(DEFAULT_X_START),
            sigma2,
            output_dir: raw.output_dir,
        })
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawConfig = toml::from_str(s)?;
        Self::validate(raw)
    }
}

fn invalid(key: &'static str, value: impl ToString, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_happy_path_with_defaults() {
        let cfg: Config = r#"
meshName = "bay.msh"
nSteps = 100
tEnd = 1.0
borders = [[0.0, 0.45], [0.0, 0.2]]
"#
        .parse()
        .unwrap();

        assert_eq!(cfg.mesh_file, PathBuf::from("bay.msh"));
        assert_eq!(cfg.n_steps, Some(100));
        assert!((cfg.dt - 0.01).abs() < 1e-15);
        assert_eq!(cfg.t_end, 1.0);
        assert_eq!(cfg.fishing_ground, Bounds2D::fishing_ground());

        assert_eq!(cfg.write_frequency, None);
        assert_eq!(cfg.log_name, "logfile");
        assert_eq!(cfg.x_start, DEFAULT_X_START);
        assert_eq!(cfg.sigma2, DEFAULT_SIGMA2);
        assert_eq!(cfg.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_explicit_values() {
        let cfg: Config = r#"
meshFile = "meshes/bay.msh"
dt = 0.002
tEnd = 0.5
writeFrequency = 25
logName = "run1"
xStart = [0.3, 0.4]
sigma2 = 0.02
outputDir = "frames"
"#
        .parse()
        .unwrap();

        assert_eq!(cfg.dt, 0.002);
        assert_eq!(cfg.n_steps, None);
        assert_eq!(cfg.write_frequency, Some(25));
        assert_eq!(cfg.x_start, [0.3, 0.4]);
        assert_eq!(cfg.sigma2, 0.02);
        assert_eq!(cfg.log_path(Path::new("logs")), PathBuf::from("logs/run1.log"));
    }

    #[test]
    fn test_missing_mesh_file() {
        let err = "nSteps = 100\ntEnd = 1.0\n".parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("meshFile")));
    }

    #[test]
    fn test_missing_time_step() {
        let err = "meshFile = \"a.msh\"\ntEnd = 1.0\n".parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_missing_end_time() {
        let err = "meshFile = \"a.msh\"\ndt = 0.1\n".parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("tEnd")));
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("meshFile = \"a.msh\"\ndt = 0.0\ntEnd = 1.0\n", "dt"),
            ("meshFile = \"a.msh\"\ndt = -0.1\ntEnd = 1.0\n", "dt"),
            ("meshFile = \"a.msh\"\nnSteps = 0\ntEnd = 1.0\n", "nSteps"),
            ("meshFile = \"a.msh\"\ndt = 0.1\ntEnd = 0.0\n", "tEnd"),
            ("meshFile = \"a.msh\"\ndt = 0.1\ntEnd = 1.0\nsigma2 = -1.0\n", "sigma2"),
            (
                "meshFile = \"a.msh\"\ndt = 0.1\ntEnd = 1.0\nborders = [[1.0, 0.0], [0.0, 1.0]]\n",
                "borders",
            ),
            ("meshFile = \"a.msh\"\ndt = 0.1\nnSteps = 5\ntEnd = 1.0\n", "dt"),
        ];
        for (text, expected_key) in cases {
            match text.parse::<Config>() {
                Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, expected_key),
                other => panic!("expected invalid {}, got {:?}", expected_key, other),
            }
        }
    }

    #[test]
    fn test_write_frequency_zero_disables_output() {
        let cfg: Config = "meshFile = \"a.msh\"\ndt = 0.1\ntEnd = 1.0\nwriteFrequency = 0\n"
            .parse()
            .unwrap();
        assert_eq!(cfg.write_frequency, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = "meshFile = \"a.msh\"\ndt = 0.1\ntEnd = 1.0\nfoo = 1\n"
            .parse::<Config>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "meshFile = \"bay.msh\"\ndt = 0.01\ntEnd = 0.1").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.mesh_file, PathBuf::from("bay.msh"));
    }

    #[test]
    fn test_file_not_found() {
        let err = Config::load(Path::new("file not found")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
