use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use cmakew_cmake::Cmake;
use tracing::{info, warn};

use crate::config::CmakewConfig;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub build_folder: Option<Utf8PathBuf>,
    pub verbose: bool,
}

pub fn run(cfg: &CmakewConfig, opts: BuildOptions) -> Result<()> {
    let build_folder = opts.build_folder.unwrap_or_else(|| cfg.build_folder.clone());
    if !build_folder.join("CMakeCache.txt").exists() {
        warn!("{build_folder} does not look configured; run `cmakew configure` first");
    }
    info!("building {build_folder}");
    Cmake::with_binary(&cfg.cmake_binary)
        .build(&build_folder, opts.verbose)
        .with_context(|| format!("cmake build of {build_folder} failed"))?;
    info!("built {build_folder}");
    Ok(())
}
