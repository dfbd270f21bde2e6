//! Runtime configuration, layered from code defaults, an optional
//! `Inpaintd.toml`, and `INPAINTD_*` environment variables.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root under which per-request input/output directories are created.
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Installation root of the predictor; it runs with this as its cwd.
    #[serde(default = "default_predictor_dir")]
    pub predictor_dir: PathBuf,

    /// Model weights directory, expected to be populated at startup.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    #[serde(default = "default_python_bin")]
    pub python_bin: String,

    /// How many characters of predictor stderr to keep in failure responses.
    #[serde(default = "default_stderr_limit")]
    pub stderr_limit: usize,

    /// Maximum seconds to wait for the predictor. Absent means wait forever.
    #[serde(default)]
    pub inference_timeout_secs: Option<u64>,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from("/workspace")
}

fn default_predictor_dir() -> PathBuf {
    PathBuf::from("/workspace/lama")
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("/workspace/lama/big-lama")
}

fn default_python_bin() -> String {
    "python3".into()
}

fn default_stderr_limit() -> usize {
    2000
}

fn default_bind_addr() -> String {
    "0.0.0.0:7860".into()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            workspace_root: default_workspace_root(),
            predictor_dir: default_predictor_dir(),
            model_dir: default_model_dir(),
            python_bin: default_python_bin(),
            stderr_limit: default_stderr_limit(),
            inference_timeout_secs: None,
            bind_addr: default_bind_addr(),
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("Inpaintd").required(false))
            .add_source(config::Environment::with_prefix("INPAINTD"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_deployment_layout() {
        let s = Settings::default();
        assert_eq!(s.workspace_root, PathBuf::from("/workspace"));
        assert_eq!(s.predictor_dir, PathBuf::from("/workspace/lama"));
        assert_eq!(s.model_dir, PathBuf::from("/workspace/lama/big-lama"));
        assert_eq!(s.python_bin, "python3");
        assert_eq!(s.stderr_limit, 2000);
        assert_eq!(s.inference_timeout_secs, None);
        assert_eq!(s.bind_addr, "0.0.0.0:7860");
    }

    #[test]
    fn empty_sources_deserialize_to_defaults() {
        let cfg = config::Config::builder().build().unwrap();
        let s: Settings = cfg.try_deserialize().unwrap();
        assert_eq!(s.workspace_root, Settings::default().workspace_root);
        assert_eq!(s.stderr_limit, 2000);
    }

    #[test]
    fn toml_values_override_defaults() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                "workspace_root = \"/tmp/ws\"\ninference_timeout_secs = 90\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let s: Settings = cfg.try_deserialize().unwrap();
        assert_eq!(s.workspace_root, PathBuf::from("/tmp/ws"));
        assert_eq!(s.inference_timeout_secs, Some(90));
        assert_eq!(s.python_bin, "python3");
    }
}
