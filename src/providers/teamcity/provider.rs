use log::{debug, info, warn};

use crate::config::{ConnectionSettings, LabelStyle};
use crate::error::Result;
use crate::output::PhaseProgress;
use crate::usage::TemplateUsage;

use super::client::TeamCityClient;
use super::last_run::format_build_date;
use super::project_path::{ProjectPathResolver, PATH_SEPARATOR};
use super::types::{BuildConfiguration, Parameter};

/// What to collect and how to label it.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Build parameter whose value is the template path
    pub parameter: String,
    pub label_style: LabelStyle,
    /// Memoize project path resolution within the run
    pub memoize_projects: bool,
}

/// TeamCity template usage provider.
///
/// Walks every build configuration on the server, reads its parameters and groups the
/// configurations by the value of the target parameter. Lookups run one after another.
/// A failed lookup is logged and skipped so one bad configuration cannot stop the
/// scan; the number of such failures is reported on the result.
pub struct TeamCityProvider {
    client: TeamCityClient,
    server: String,
}

impl TeamCityProvider {
    /// Creates a provider for the given server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is invalid.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let client = TeamCityClient::new(settings)?;

        Ok(Self {
            client,
            server: settings.server.clone(),
        })
    }

    /// Builds the template path to job mapping.
    ///
    /// Progress is displayed in two phases:
    /// 1. Listing build configurations
    /// 2. Scanning each configuration's parameters (and resolving labels for matches)
    ///
    /// An unreachable server produces an empty mapping, not an error.
    pub async fn collect_template_usage(&self, options: &CollectOptions) -> TemplateUsage {
        info!(
            "Collecting '{}' values from {}",
            options.parameter,
            self.client.rest_url()
        );

        let mut usage = TemplateUsage::new(&self.server, &options.parameter, options.label_style);

        let progress = PhaseProgress::start_phase_1();
        let build_types = self.list_build_types(&mut usage).await;
        usage.total_build_types = build_types.len();

        if build_types.is_empty() {
            warn!("No build configurations found on {}", self.server);
        }

        let progress = progress.finish_phase_1_start_phase_2(build_types.len());
        let mut resolver = ProjectPathResolver::new(options.memoize_projects);

        for build_type in &build_types {
            progress.advance(&build_type.name);

            let parameters = self.build_parameters(build_type, &mut usage).await;
            let file_paths: Vec<&str> = matching_values(&parameters, &options.parameter).collect();
            if file_paths.is_empty() {
                continue;
            }

            let label = self
                .describe(build_type, options.label_style, &mut resolver, &mut usage)
                .await;

            for file_path in file_paths {
                debug!("{} -> {file_path}", build_type.id);
                usage.record(file_path, label.clone());
            }
        }

        usage.failed_lookups += resolver.failed_lookups();
        progress.finish_phase_2(usage.file_paths.len());

        info!(
            "Found {} template paths referenced by {} jobs across {} build configurations ({} failed lookups)",
            usage.file_paths.len(),
            usage.total_jobs(),
            usage.total_build_types,
            usage.failed_lookups
        );

        usage
    }

    async fn list_build_types(&self, usage: &mut TemplateUsage) -> Vec<BuildConfiguration> {
        match self.client.fetch_build_types().await {
            Ok(build_types) => build_types,
            Err(e) => {
                warn!("Failed to list build configurations: {e}");
                usage.failed_lookups += 1;
                Vec::new()
            }
        }
    }

    async fn build_parameters(
        &self,
        build_type: &BuildConfiguration,
        usage: &mut TemplateUsage,
    ) -> Vec<Parameter> {
        match self.client.fetch_parameters(&build_type.id).await {
            Ok(parameters) => parameters,
            Err(e) => {
                warn!("Failed to fetch parameters for {}: {e}", build_type.id);
                usage.failed_lookups += 1;
                Vec::new()
            }
        }
    }

    async fn describe(
        &self,
        build_type: &BuildConfiguration,
        style: LabelStyle,
        resolver: &mut ProjectPathResolver,
        usage: &mut TemplateUsage,
    ) -> String {
        let project_path = if style.needs_project_path() {
            resolver.resolve(&self.client, &build_type.project_id).await
        } else {
            None
        };

        let last_run = if style == LabelStyle::LastRun {
            self.last_run_date(&build_type.id, usage).await
        } else {
            None
        };

        format_label(
            style,
            &build_type.name,
            project_path.as_deref(),
            last_run.as_deref(),
        )
    }

    async fn last_run_date(&self, build_type_id: &str, usage: &mut TemplateUsage) -> Option<String> {
        let build = match self.client.fetch_last_successful_build(build_type_id).await {
            Ok(build) => build?,
            Err(e) => {
                warn!("Failed to fetch last successful build for {build_type_id}: {e}");
                usage.failed_lookups += 1;
                return None;
            }
        };

        let timestamp = build.timestamp()?;
        match format_build_date(timestamp) {
            Ok(date) => Some(date),
            Err(e) => {
                warn!("Ignoring last run of {build_type_id}: {e}");
                usage.failed_lookups += 1;
                None
            }
        }
    }
}

/// Values of every parameter named `name`, in declaration order.
fn matching_values<'a>(
    parameters: &'a [Parameter],
    name: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    parameters
        .iter()
        .filter(move |parameter| parameter.name == name)
        .map(Parameter::value)
}

/// Renders a job label for the report.
///
/// Without a resolved project path the label starts at the configuration name.
fn format_label(
    style: LabelStyle,
    name: &str,
    project_path: Option<&str>,
    last_run: Option<&str>,
) -> String {
    let full_name = match (style, project_path) {
        (LabelStyle::Name, _) | (_, None) => name.to_string(),
        (_, Some(path)) => format!("{path}{PATH_SEPARATOR}{name}"),
    };

    match (style, last_run) {
        (LabelStyle::LastRun, Some(date)) => format!("{full_name} (Last run: {date})"),
        (LabelStyle::LastRun, None) => format!("{full_name} (No date or runs found)"),
        _ => full_name,
    }
}
