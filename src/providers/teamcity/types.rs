use serde::{Deserialize, Serialize};

/// A TeamCity build configuration ("build type").
///
/// Immutable snapshot of one CI job definition as returned by `/app/rest/buildTypes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
    /// Build configuration ID (e.g., "Infra_DeployVpc")
    pub id: String,
    /// Display name
    pub name: String,
    /// ID of the project that owns this configuration
    pub project_id: String,
}

/// A name/value parameter declared on a build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// TeamCity omits the value of unset parameters or sends it as `null`
    #[serde(default)]
    pub value: Option<String>,
}

impl Parameter {
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}

/// A TeamCity project (folder-like grouping of build configurations).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Display name
    pub name: String,
    /// Parent project ID; absent (or empty) for the root project
    #[serde(default)]
    pub parent_project_id: Option<String>,
}

impl Project {
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_project_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}

/// A finished build, used only for its timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    #[serde(default)]
    pub finish_date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}

impl BuildRecord {
    /// Finish timestamp, or the start timestamp when the build has no finish date.
    pub fn timestamp(&self) -> Option<&str> {
        self.finish_date.as_deref().or(self.start_date.as_deref())
    }
}

/// Response from `/app/rest/buildTypes`.
#[derive(Debug, Deserialize)]
pub(super) struct BuildTypesResponse {
    #[serde(rename = "buildType", default)]
    pub build_type: Vec<BuildConfiguration>,
}

/// Response from `/app/rest/buildTypes/{id}/parameters`.
#[derive(Debug, Deserialize)]
pub(super) struct ParametersResponse {
    #[serde(default)]
    pub property: Vec<Parameter>,
}

/// Response from `/app/rest/buildTypes/{id}/builds/`.
#[derive(Debug, Deserialize)]
pub(super) struct BuildsResponse {
    #[serde(default)]
    pub build: Vec<BuildRecord>,
}
