mod commands;
mod config;

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use commands::build::{self, BuildOptions};
use commands::configure::{self, parse_env_pair, ConfigureOptions};
use commands::doctor;
use config::{CmakewConfig, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(
    name = "cmakew",
    version,
    about = "Configure and build CMake projects with a fixed command line"
)]
struct Cli {
    /// Path to the cmakew config file. Relative paths inside it are taken
    /// relative to the current directory, which is also the cmake source dir.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: Utf8PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the build tree (cmake -S . -B <build-folder>)
    Configure {
        /// Build type, e.g. Debug or Release
        #[arg(long)]
        configuration: Option<String>,
        #[arg(long)]
        build_folder: Option<Utf8PathBuf>,
        /// CMake toolchain file
        #[arg(long)]
        toolchain: Option<Utf8PathBuf>,
        /// Trace-level cmake logging and developer warnings
        #[arg(long, action = clap::ArgAction::SetTrue)]
        verbose: bool,
        /// Extra environment for cmake, repeatable
        #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,
    },
    /// Build a configured tree (cmake --build <build-folder>)
    Build {
        #[arg(long)]
        build_folder: Option<Utf8PathBuf>,
        #[arg(long, action = clap::ArgAction::SetTrue)]
        verbose: bool,
    },
    /// Report cmake, toolchain and build folder state as JSON
    Doctor,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Some(command) => {
            let cfg = CmakewConfig::load_or_default(&cli.config)?;
            match command {
                Commands::Configure {
                    configuration,
                    build_folder,
                    toolchain,
                    verbose,
                    env,
                } => configure::run(
                    &cfg,
                    ConfigureOptions {
                        configuration,
                        build_folder,
                        toolchain,
                        verbose,
                        env,
                    },
                ),
                Commands::Build {
                    build_folder,
                    verbose,
                } => build::run(
                    &cfg,
                    BuildOptions {
                        build_folder,
                        verbose,
                    },
                ),
                Commands::Doctor => doctor::run(&cfg),
            }
        }
        None => {
            print_top_level_help();
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn print_top_level_help() {
    println!("cmakew: fixed-command-line cmake driver\n");
    println!("Common workflows:");
    println!("  cmakew configure --toolchain cmake/host.cmake   # cmake -S . -B build");
    println!("  cmakew build                                    # cmake --build build");
    println!("  cmakew doctor                                   # check cmake + toolchain\n");
    println!("Defaults come from {DEFAULT_CONFIG_FILE} when present.");
    println!("For full help: cmakew --help or cmakew help <command>.");
}
