use std::collections::BTreeMap;
use std::env;

use anyhow::{anyhow, Context, Result};
use camino::Utf8PathBuf;
use cmakew_cmake::Cmake;
use cmakew_exec::Env;
use tracing::info;

use crate::config::CmakewConfig;

#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    pub configuration: Option<String>,
    pub build_folder: Option<Utf8PathBuf>,
    pub toolchain: Option<Utf8PathBuf>,
    pub verbose: bool,
    pub env: Vec<(String, String)>,
}

pub fn run(cfg: &CmakewConfig, opts: ConfigureOptions) -> Result<()> {
    let configuration = opts
        .configuration
        .unwrap_or_else(|| cfg.configuration.clone());
    let build_folder = opts.build_folder.unwrap_or_else(|| cfg.build_folder.clone());
    let toolchain = opts
        .toolchain
        .or_else(|| cfg.toolchain.clone())
        .ok_or_else(|| {
            anyhow!("no toolchain file configured; pass --toolchain or set project.toolchain")
        })?;
    // Variables that are not valid UTF-8 cannot be carried into an explicit environment.
    let ambient = env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
    let child_env = child_env(ambient, &cfg.env, &opts.env);

    info!("configuring {build_folder} ({configuration}) with toolchain {toolchain}");
    Cmake::with_binary(&cfg.cmake_binary)
        .configure(
            &configuration,
            &build_folder,
            &toolchain,
            opts.verbose,
            child_env.as_ref(),
        )
        .with_context(|| format!("cmake configure of {build_folder} failed"))?;
    info!("configured {build_folder}");
    Ok(())
}

/// Ambient variables overlaid with config entries, then command-line entries.
/// `None` when there is nothing to overlay, so the child simply inherits.
fn child_env(
    ambient: impl IntoIterator<Item = (String, String)>,
    from_config: &BTreeMap<String, String>,
    from_cli: &[(String, String)],
) -> Option<Env> {
    if from_config.is_empty() && from_cli.is_empty() {
        return None;
    }
    let mut merged: Env = ambient.into_iter().collect();
    merged.extend(from_config.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged.extend(from_cli.iter().cloned());
    Some(merged)
}

/// Parses a `KEY=VALUE` pair for `--env`.
pub fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}
