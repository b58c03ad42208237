use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::config::{Config, LabelStyle, OutputFormat};
use crate::output::{render_path_listing, render_report};
use crate::providers::{CollectOptions, TeamCityProvider};
use crate::usage::TemplateUsage;

#[derive(Parser)]
#[command(name = "cfpaths")]
#[command(
    author,
    version,
    about = "Map CloudFormation template paths to the TeamCity jobs that deploy them",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./cfpaths.{toml,json,yaml,yml} when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// TeamCity server base URL
    #[arg(short, long, env = "TEAMCITY_SERVER")]
    server: Option<String>,

    #[arg(short, long, env = "TEAMCITY_USERNAME")]
    username: Option<String>,

    #[arg(short, long, env = "TEAMCITY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Map each template path to the build configurations that reference it
    Map {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Build parameter holding the template path
        #[arg(short = 'P', long)]
        parameter: Option<String>,

        /// How jobs are labelled
        #[arg(short, long, value_enum)]
        label: Option<LabelStyle>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Re-resolve project paths for every job instead of memoizing them
        #[arg(long, default_value_t = false)]
        no_cache: bool,
    },
    /// List the distinct template paths referenced by any build configuration
    Paths {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Build parameter holding the template path
        #[arg(short = 'P', long)]
        parameter: Option<String>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

impl Cli {
    async fn collect(
        &self,
        config: &Config,
        connection: &ConnectionArgs,
        options: &CollectOptions,
    ) -> Result<TemplateUsage> {
        let settings = config.teamcity.resolve(
            connection.server.as_deref(),
            connection.username.as_deref(),
            connection.password.as_deref(),
            connection.timeout,
        )?;

        let provider =
            TeamCityProvider::new(&settings).context("Failed to set up TeamCity client")?;

        Ok(provider.collect_template_usage(options).await)
    }

    fn emit(&self, report: &str) -> Result<()> {
        if let Some(output_path) = &self.output {
            std::fs::write(output_path, report)
                .with_context(|| format!("Failed to write report: {}", output_path.display()))?;
            info!("Report written to: {}", output_path.display());
        } else {
            print!("{report}");
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let pretty = self.pretty || config.report.pretty;

        if self.output.is_some() {
            console::set_colors_enabled(false);
        }

        match &self.command {
            Commands::Map {
                connection,
                parameter,
                label,
                format,
                no_cache,
            } => {
                let options = CollectOptions {
                    parameter: parameter
                        .clone()
                        .unwrap_or_else(|| config.report.parameter.clone()),
                    label_style: label.unwrap_or(config.report.label),
                    memoize_projects: !(*no_cache || config.report.no_cache),
                };

                let usage = self.collect(&config, connection, &options).await?;
                let report = render_report(&usage, format.unwrap_or(config.report.format), pretty)?;
                self.emit(&report)
            }
            Commands::Paths {
                connection,
                parameter,
                format,
            } => {
                let options = CollectOptions {
                    parameter: parameter
                        .clone()
                        .unwrap_or_else(|| config.report.parameter.clone()),
                    label_style: LabelStyle::Name,
                    memoize_projects: false,
                };

                let usage = self.collect(&config, connection, &options).await?;
                let report =
                    render_path_listing(&usage, format.unwrap_or(config.report.format), pretty)?;
                self.emit(&report)
            }
        }
    }
}
