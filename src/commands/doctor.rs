use anyhow::Result;
use cmakew_cmake::Cmake;
use serde::Serialize;

use crate::config::CmakewConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    cmake_binary: String,
    /// Where `cmake_binary` resolves to, or null when configure/build would fail to spawn it.
    cmake_resolved: Option<String>,
    toolchain: Option<String>,
    toolchain_exists: bool,
    build_folder: String,
    build_folder_configured: bool,
}

pub fn run(cfg: &CmakewConfig) -> Result<()> {
    let report = DoctorReport {
        cmake_binary: cfg.cmake_binary.clone(),
        cmake_resolved: Cmake::with_binary(&cfg.cmake_binary)
            .resolve()
            .map(|path| path.to_string()),
        toolchain: cfg.toolchain.as_ref().map(|tc| tc.to_string()),
        toolchain_exists: cfg.toolchain.as_ref().is_some_and(|tc| tc.exists()),
        build_folder: cfg.build_folder.to_string(),
        build_folder_configured: cfg.build_folder.join("CMakeCache.txt").exists(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
