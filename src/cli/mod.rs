//! Command-line interface for the movie catalog builder.

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Builds the offline MovieChain catalog from IMDb TSV dumps
#[derive(Parser, Debug)]
#[command(name = "moviechain")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the search paths
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "moviechain=trace"
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Arguments for `build` when no subcommand is given
    #[command(flatten)]
    pub build: BuildArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the catalog database (default)
    #[command(alias = "b")]
    Build(BuildArgs),

    /// Run the sanity queries against an existing catalog
    #[command(alias = "v")]
    Verify(VerifyArgs),

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Directory containing the four IMDb .tsv files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory the database is written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// File name of the database
    #[arg(long)]
    pub database_name: Option<String>,

    /// Skip the post-build sanity queries
    #[arg(long)]
    pub skip_verify: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct VerifyArgs {
    /// Directory holding the database
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// File name of the database
    #[arg(long)]
    pub database_name: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl BuildArgs {
    pub fn apply(&self, config: &mut crate::Config) {
        if let Some(dir) = &self.data_dir {
            config.build.data_dir.clone_from(dir);
        }
        if let Some(dir) = &self.output_dir {
            config.build.output_dir.clone_from(dir);
        }
        if let Some(name) = &self.database_name {
            config.build.database_name.clone_from(name);
        }
        if self.skip_verify {
            config.verify.enabled = false;
        }
    }
}

impl VerifyArgs {
    pub fn apply(&self, config: &mut crate::Config) {
        if let Some(dir) = &self.output_dir {
            config.build.output_dir.clone_from(dir);
        }
        if let Some(name) = &self.database_name {
            config.build.database_name.clone_from(name);
        }
    }
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[test]
    fn bare_invocation_builds_with_flags() {
        let cli = Cli::parse_from([
            "moviechain",
            "--data-dir",
            "/data",
            "--skip-verify",
        ]);
        assert!(cli.command.is_none());
        assert_eq!(cli.build.data_dir, Some(PathBuf::from("/data")));

        let mut config = Config::default();
        cli.build.apply(&mut config);
        assert_eq!(config.build.data_dir, PathBuf::from("/data"));
        assert!(!config.verify.enabled);
    }

    #[test]
    fn build_subcommand_overrides_output() {
        let cli = Cli::parse_from([
            "moviechain",
            "build",
            "--output-dir",
            "out",
            "--database-name",
            "test.sqlite",
        ]);
        let Some(Commands::Build(args)) = cli.command else {
            panic!("expected build subcommand");
        };

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.build.database_path(), PathBuf::from("out/test.sqlite"));
        assert!(config.verify.enabled);
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from(["moviechain", "verify", "--json", "--log-level", "debug"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Some(Commands::Verify(VerifyArgs { json: true, .. }))));
    }
}
