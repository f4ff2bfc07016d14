use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};

use gamut_engine::assets::DirAssets;
use gamut_engine::device::GpuInit;
use gamut_engine::driver::FilterMode;
use gamut_engine::logging::{init_logging, LoggingConfig};
use gamut_engine::render::{QuadRenderer, RendererConfig, DEFAULT_ASSET};
use gamut_engine::window::{Runtime, RuntimeConfig};

#[derive(Parser, Debug)]
#[command(
    name = "gamut-viewer",
    version,
    about = "Show a Display-P3 image converted to sRGB on the GPU."
)]
struct Cli {
    /// Directory the image is read from.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Image file name inside the assets directory.
    #[arg(long, default_value = DEFAULT_ASSET)]
    image: String,

    #[arg(long, value_enum, default_value_t = Filter::Nearest)]
    min_filter: Filter,

    #[arg(long, value_enum, default_value_t = Filter::Linear)]
    mag_filter: Filter,

    /// Window title.
    #[arg(long, default_value = "gamut")]
    title: String,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Filter {
    Nearest,
    Linear,
}

impl From<Filter> for FilterMode {
    fn from(f: Filter) -> Self {
        match f {
            Filter::Nearest => FilterMode::Nearest,
            Filter::Linear => FilterMode::Linear,
        }
    }
}

fn main() {
    if let Err(err) = try_main() {
        log::error!("gamut-viewer exited with error: {err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        default_level: match cli.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        },
        ..LoggingConfig::default()
    });

    let assets = DirAssets::new(&cli.assets);
    log::info!("reading `{}` from {}", cli.image, assets.root().display());

    let renderer = QuadRenderer::new(
        RendererConfig {
            asset_name: cli.image,
            min_filter: cli.min_filter.into(),
            mag_filter: cli.mag_filter.into(),
            ..RendererConfig::default()
        },
        assets,
    );

    Runtime::run(
        RuntimeConfig { title: cli.title, ..RuntimeConfig::default() },
        GpuInit::default(),
        renderer,
    )
    .context("viewer runtime failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_renderer() {
        let cli = Cli::parse_from(["gamut-viewer"]);
        assert_eq!(cli.image, DEFAULT_ASSET);
        assert_eq!(FilterMode::from(cli.min_filter), RendererConfig::default().min_filter);
        assert_eq!(FilterMode::from(cli.mag_filter), RendererConfig::default().mag_filter);
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["gamut-viewer", "-vv", "--mag-filter", "nearest"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.mag_filter, Filter::Nearest));
    }
}
