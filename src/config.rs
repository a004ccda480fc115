use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "cmakew.toml";

#[derive(Debug, Default, Deserialize)]
struct CmakeSection {
    binary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectSection {
    configuration: Option<String>,
    build_folder: Option<String>,
    toolchain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    cmake: Option<CmakeSection>,
    project: Option<ProjectSection>,
    env: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CmakewConfig {
    pub cmake_binary: String,
    pub configuration: String,
    pub build_folder: Utf8PathBuf,
    pub toolchain: Option<Utf8PathBuf>,
    /// Overlaid on the ambient environment for the configure step.
    pub env: BTreeMap<String, String>,
}

impl CmakewConfig {
    pub fn load_from_path(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        let raw: RawConfig = toml::from_str(&data).with_context(|| format!("parsing {path}"))?;
        Ok(Self::from_raw(raw))
    }

    /// Like [`CmakewConfig::load_from_path`], but a missing file yields defaults.
    pub fn load_or_default(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::from_raw(RawConfig::default()))
        }
    }

    /// Relative paths are kept as written: cmake runs with `-S .`, so they are
    /// relative to the working directory, not to the config file.
    fn from_raw(raw: RawConfig) -> Self {
        let cmake = raw.cmake.unwrap_or_default();
        let project = raw.project.unwrap_or_default();
        Self {
            cmake_binary: cmake.binary.unwrap_or_else(|| "cmake".to_string()),
            configuration: project
                .configuration
                .unwrap_or_else(|| "Debug".to_string()),
            build_folder: Utf8PathBuf::from(
                project.build_folder.unwrap_or_else(|| "build".to_string()),
            ),
            toolchain: project.toolchain.map(Utf8PathBuf::from),
            env: raw.env.unwrap_or_default(),
        }
    }
}
