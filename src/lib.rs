pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod error;
pub mod extract;
pub mod pipeline;

pub use cli::Cli;
pub use config::Config;
pub use error::BuildError;
pub use pipeline::{BuildSummary, Builder};

use cli::Commands;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    if matches!(cli.command, Some(Commands::Init)) {
        return cli::cmd_init(cli.config.as_deref());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(level) = &cli.log_level {
        config.general.log_level.clone_from(level);
    }

    match &cli.command {
        Some(Commands::Build(args)) => args.apply(&mut config),
        Some(Commands::Verify(args)) => args.apply(&mut config),
        Some(Commands::Init) | None => cli.build.apply(&mut config),
    }
    config.validate()?;

    init_tracing(&config);

    match cli.command {
        Some(Commands::Verify(args)) => cli::cmd_verify(&config, args.json).await,
        _ => cli::cmd_build(&config).await,
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let json = config.general.log_format == "json";
    let pretty_layer = (!json).then(|| tracing_subscriber::fmt::layer());
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty_layer)
        .with(json_layer)
        .init();
}
