use camino::{Utf8Path, Utf8PathBuf};
use cmakew_exec::{Env, Executor, ProcessExecutionError, SystemExecutor};
use tracing::debug;
use which::which;

const DEFAULT_BINARY: &str = "cmake";

/// Runs the cmake configure and build steps with a fixed command line.
#[derive(Debug, Clone)]
pub struct Cmake<E = SystemExecutor> {
    executable: String,
    executor: E,
}

impl Cmake {
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_BINARY)
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self::with_executor(binary, SystemExecutor)
    }
}

impl Default for Cmake {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Executor> Cmake<E> {
    pub fn with_executor(binary: impl Into<String>, executor: E) -> Self {
        Self {
            executable: binary.into(),
            executor,
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Resolves the configured executable the way a spawn would: through
    /// `PATH` for a bare name, or by checking an explicit path directly.
    /// `None` when nothing runnable is found.
    pub fn resolve(&self) -> Option<Utf8PathBuf> {
        let path = which(&self.executable).ok()?;
        Some(Utf8PathBuf::from_path_buf(path).unwrap_or_else(|p| {
            Utf8PathBuf::from(p.to_string_lossy().to_string())
        }))
    }

    pub fn configure_args(
        &self,
        configuration: &str,
        build_folder: &Utf8Path,
        toolchain_path: &Utf8Path,
        verbose: bool,
    ) -> Vec<String> {
        let mut cmd = vec![
            self.executable.clone(),
            "-DCMAKE_EXPORT_COMPILE_COMMANDS=ON".to_string(),
            format!("-DCMAKE_TOOLCHAIN_FILE={toolchain_path}"),
            "-DENABLE_TESTING=ON".to_string(),
            format!("-DCMAKE_BUILD_TYPE={configuration}"),
        ];
        if verbose {
            cmd.extend(["--log-level=TRACE".to_string(), "-Wdev".to_string()]);
        }
        cmd.extend([
            "-S".to_string(),
            ".".to_string(),
            "-B".to_string(),
            build_folder.to_string(),
        ]);
        cmd
    }

    pub fn build_args(&self, build_folder: &Utf8Path, verbose: bool) -> Vec<String> {
        let mut cmd = vec![
            self.executable.clone(),
            "--build".to_string(),
            build_folder.to_string(),
        ];
        if verbose {
            cmd.push("--verbose".to_string());
        }
        cmd
    }

    /// Generates the build tree in `build_folder` from the current directory.
    ///
    /// `env` of `None` inherits the calling process environment.
    pub fn configure(
        &self,
        configuration: &str,
        build_folder: &Utf8Path,
        toolchain_path: &Utf8Path,
        verbose: bool,
        env: Option<&Env>,
    ) -> Result<(), ProcessExecutionError> {
        let cmd = self.configure_args(configuration, build_folder, toolchain_path, verbose);
        debug!("configuring {build_folder} ({configuration})");
        self.executor.execute(&cmd, env, true).map(|_| ())
    }

    pub fn build(
        &self,
        build_folder: &Utf8Path,
        verbose: bool,
    ) -> Result<(), ProcessExecutionError> {
        let cmd = self.build_args(build_folder, verbose);
        debug!("building {build_folder}");
        self.executor.execute(&cmd, None, true).map(|_| ())
    }
}
