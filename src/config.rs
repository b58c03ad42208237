use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::auth::Credentials;

/// Parameter that records which CloudFormation template a build configuration deploys.
pub const DEFAULT_PARAMETER: &str = "system.cloudformation-template.file-path";

/// Configuration file structure for cfpaths.
///
/// Lets users keep the server address and report preferences in a file instead of
/// repeating them on every run. Command-line flags and environment variables win over
/// anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// TeamCity connection settings
    #[serde(default)]
    pub teamcity: TeamCityConfig,

    /// Report preferences
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TeamCityConfig {
    /// TeamCity server base URL
    pub server: Option<String>,

    /// Basic-auth username
    pub username: Option<String>,

    /// Basic-auth password
    pub password: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Build parameter whose value is collected
    #[serde(default = "default_parameter")]
    pub parameter: String,

    /// How each job is labelled in the report
    #[serde(default)]
    pub label: LabelStyle,

    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,

    /// Disable project path memoization
    #[serde(default)]
    pub no_cache: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            parameter: default_parameter(),
            label: LabelStyle::default(),
            format: OutputFormat::default(),
            pretty: false,
            no_cache: false,
        }
    }
}

/// How a build configuration is rendered under its template path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LabelStyle {
    /// Build configuration name only
    Name,
    /// Full project path followed by the configuration name
    #[default]
    ProjectPath,
    /// Project path, name and the date of the last successful build
    LastRun,
}

impl LabelStyle {
    pub fn needs_project_path(self) -> bool {
        matches!(self, Self::ProjectPath | Self::LastRun)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Table,
    Json,
    Csv,
}

/// Resolved connection settings for one run.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub server: String,
    pub credentials: Option<Credentials>,
    pub timeout: Option<Duration>,
}

fn default_parameter() -> String {
    DEFAULT_PARAMETER.to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./cfpaths.toml
    /// 3. ./cfpaths.json
    /// 4. ./cfpaths.yaml
    /// 5. ./cfpaths.yml
    ///
    /// Returns default configuration if no file is found. An explicitly given path
    /// that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["cfpaths.toml", "cfpaths.json", "cfpaths.yaml", "cfpaths.yml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

impl TeamCityConfig {
    /// Merges command-line values over the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if no server URL is available from either source.
    pub fn resolve(
        &self,
        server: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<ConnectionSettings> {
        let Some(server) = server
            .map(ToString::to_string)
            .or_else(|| self.server.clone())
            .filter(|s| !s.trim().is_empty())
        else {
            bail!("TeamCity server URL not set (use --server, TEAMCITY_SERVER or the config file)");
        };

        let username = username.map(ToString::to_string).or_else(|| self.username.clone());
        let password = password.map(ToString::to_string).or_else(|| self.password.clone());

        let credentials = Credentials::from_parts(username, password);
        if credentials.is_none() {
            warn!("No TeamCity credentials configured, requests will be sent unauthenticated");
        }

        Ok(ConnectionSettings {
            server,
            credentials,
            timeout: timeout_secs.or(self.timeout_secs).map(Duration::from_secs),
        })
    }
}
