use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use subpath_rewriter::SiteProject;

/// Prefix relative references in generated HTML with the deployment base path.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
  /// Directory containing the site configuration and build output.
  #[arg(long, default_value = ".")]
  project_dir: PathBuf,

  /// Build output directory, relative to the project directory.
  #[arg(long)]
  dist: Option<PathBuf>,

  /// Configuration file to read instead of discovering one.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Base path to apply, skipping configuration entirely.
  #[arg(long)]
  base_path: Option<String>,
}

fn main() -> ExitCode {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let cli = Cli::parse();
  let project = SiteProject {
    project_dir: cli.project_dir,
    config_path: cli.config,
    out_dir: cli.dist,
    base_path: cli.base_path,
  };

  match project.rewrite() {
    Ok(_) => ExitCode::SUCCESS,
    Err(err) => {
      error!("{err:#}");
      ExitCode::FAILURE
    }
  }
}
