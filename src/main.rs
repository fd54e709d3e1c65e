use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use slice_assets::{AssetsBuilder, AssetsConfig, EsbuildBundler, Manifest};
use tracing_subscriber::EnvFilter;

/// Bundle app and slice assets with esbuild and write the asset manifest.
#[derive(Debug, Parser)]
#[command(name = "slice-assets", version, about)]
struct Cli {
  /// Project root containing `app/` and `slices/`.
  #[arg(long, global = true, default_value = ".")]
  root: PathBuf,

  /// Configuration file; defaults to `assets.config.{json,yml}` in the project root.
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Bundle every entry point and write the manifest.
  Build {
    /// Path to the esbuild executable.
    #[arg(long)]
    esbuild: Option<PathBuf>,

    /// Disable minification.
    #[arg(long)]
    no_minify: bool,

    /// Disable source maps.
    #[arg(long)]
    no_sourcemap: bool,
  },
  /// Print the entry points a build would bundle.
  Entries {
    /// Print as a JSON object of logical name to source path.
    #[arg(long)]
    json: bool,
  },
  /// Resolve a logical asset key through the written manifest.
  Lookup {
    /// Logical key, e.g. `admin/index.js`.
    key: String,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: u8) {
  let default_level = match verbose {
    0 => "info",
    1 => "debug",
    _ => "trace",
  };
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let root = fs::canonicalize(&cli.root)
    .with_context(|| format!("project root {} does not exist", cli.root.display()))?;
  let config = match &cli.config {
    Some(path) => AssetsConfig::from_path(&root.join(path))?,
    None => AssetsConfig::discover(&root)?,
  };
  let context = config.to_context(&root)?;

  match cli.command {
    Command::Build {
      esbuild,
      no_minify,
      no_sourcemap,
    } => {
      let mut options = config.esbuild.clone();
      if esbuild.is_some() {
        options.executable = esbuild;
      }
      options.minify &= !no_minify;
      options.sourcemap &= !no_sourcemap;

      let bundler = EsbuildBundler::locate(&root, options)?;
      let artifacts = AssetsBuilder::new(&context).build(&bundler)?;
      println!(
        "Wrote {} ({} entries)",
        artifacts.manifest_path.display(),
        artifacts.manifest.len()
      );
    }
    Command::Entries { json } => {
      let entries = AssetsBuilder::new(&context).plan()?;
      if json {
        let map: serde_json::Map<String, serde_json::Value> = entries
          .iter()
          .map(|entry| (entry.name, entry.source.display().to_string().into()))
          .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
      } else {
        for entry in entries.iter() {
          println!("{}\t{}", entry.name, entry.source.display());
        }
      }
    }
    Command::Lookup { key } => {
      let manifest = Manifest::load(&context.layout.manifest_path())?;
      let url = manifest
        .get(&key)
        .ok_or_else(|| anyhow!("'{key}' is not in the asset manifest"))?;
      println!("{url}");
    }
  }

  Ok(())
}
