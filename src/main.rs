use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ldraw_packer::config::PackerConfig;
use ldraw_packer::lookup::lookup_from_config;
use ldraw_packer::{LibraryLayout, Packer};

/// Pack an LDraw model and every part it references into a single MPD file.
#[derive(Parser, Debug)]
#[command(name = "ldraw-packer", version)]
struct Cli {
  /// Root model to pack (.ldr, .mpd or .dat)
  model: PathBuf,

  /// LDraw library root (overrides LDRAW_DIR and the config file)
  #[arg(long)]
  library: Option<PathBuf>,

  /// Rebrickable API key used to translate parts missing from the library
  #[arg(long)]
  api_key: Option<String>,

  /// Output file (defaults to `<model>_packed.mpd` next to the model)
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Enable verbose logging (can be used multiple times: -v, -vv, -vvv)
  #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
  verbose: u8,
}

fn main() -> ExitCode {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      // Usage problems are not failures of a packing run.
      let _ = err.print();
      return ExitCode::SUCCESS;
    }
  };

  init_logging(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      log::error!("{err:#}");
      ExitCode::FAILURE
    }
  }
}

fn init_logging(verbose: u8) {
  let log_level = match verbose {
    0 => log::LevelFilter::Warn,
    1 => log::LevelFilter::Info,
    2 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };

  env_logger::Builder::from_default_env()
    .filter_level(log_level)
    .format_timestamp(None)
    .format_module_path(false)
    .format_target(false)
    .format(|buf, record| {
      use std::io::Write;
      writeln!(buf, "[{}] {}", record.level(), record.args())
    })
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let cwd = env::current_dir().context("failed to determine the working directory")?;
  let mut config = PackerConfig::discover(&cwd);
  if let Some(library) = cli.library {
    config.library_dir = library;
  }
  if let Some(key) = cli.api_key {
    config.api_key = Some(key);
  }

  let layout: LibraryLayout = config.to_layout();
  let lookup = lookup_from_config(&config).context("failed to set up the part lookup")?;
  let packer = Packer::new(&layout, &config.library_dir, lookup.as_ref());

  let report = packer
    .pack(&cli.model, cli.output.as_deref())
    .with_context(|| format!("failed to pack {}", cli.model.display()))?;

  println!(
    "{} ({} documents)",
    report.output_path.display(),
    report.embedded.len()
  );
  if !report.unsupported.is_empty() {
    eprintln!("unsupported parts: {}", report.unsupported.join(", "));
  }

  Ok(())
}
