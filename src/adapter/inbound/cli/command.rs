//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Prediction-market dislocation digests and copilot
#[derive(Parser, Debug)]
#[command(name = "pmd")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scheduled passes until interrupted
    Run(RunArgs),
    /// Run a single pass and print its report
    Once,
    /// Show how a market title is grouped into a theme
    Theme(ThemeArgs),
    /// Show a user's effective settings
    Settings(SettingsArgs),
    /// Validate the configuration file
    Check,
}

#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Do not listen for Telegram button callbacks
    #[arg(long)]
    pub no_callbacks: bool,
}

#[derive(clap::Args, Debug)]
pub struct ThemeArgs {
    /// Market title
    pub title: String,

    /// Market category
    #[arg(long)]
    pub category: Option<String>,

    /// Market slug
    #[arg(long)]
    pub slug: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SettingsArgs {
    /// User id from the `[[users]]` table
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_config_toml() {
        let cli = Cli::parse_from(["pmd", "once"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert_eq!(cli.color, ColorChoice::Auto);
        assert!(matches!(cli.command, Commands::Once));
    }

    #[test]
    fn theme_takes_title_and_options() {
        let cli = Cli::parse_from([
            "pmd",
            "theme",
            "Bitcoin above 100k on Jan 5?",
            "--category",
            "crypto",
        ]);
        match cli.command {
            Commands::Theme(args) => {
                assert_eq!(args.title, "Bitcoin above 100k on Jan 5?");
                assert_eq!(args.category.as_deref(), Some("crypto"));
                assert!(args.slug.is_none());
            }
            other => panic!("expected theme, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["pmd", "run", "--no-callbacks", "--json", "-c", "alt.toml"]);
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert!(matches!(cli.command, Commands::Run(RunArgs { no_callbacks: true })));
    }

    #[test]
    fn settings_requires_a_user() {
        assert!(Cli::try_parse_from(["pmd", "settings"]).is_err());
    }
}
