use log::debug;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Credentials;
use crate::config::ConnectionSettings;
use crate::error::{CfPathsError, Result};

use super::types::{
    BuildConfiguration, BuildRecord, BuildTypesResponse, BuildsResponse, Parameter,
    ParametersResponse, Project,
};

const USER_AGENT: &str = concat!("cfpaths/", env!("CARGO_PKG_VERSION"));
const BODY_EXCERPT_LEN: usize = 512;

/// Read-only client for the TeamCity REST API.
///
/// Every request asks for JSON and carries HTTP Basic credentials when they are
/// configured. Failures are returned to the caller; deciding whether a failed lookup
/// is fatal is left to the provider.
pub struct TeamCityClient {
    client: Client,
    rest_url: Url,
    credentials: Option<Credentials>,
}

impl TeamCityClient {
    /// Creates a client rooted at `{server}/app/rest/`.
    ///
    /// A context path on the server URL (e.g. `https://host/teamcity`) is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is malformed or the HTTP client cannot be built.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CfPathsError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut base = Url::parse(&settings.server)
            .map_err(|e| CfPathsError::Config(format!("Invalid server URL: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let rest_url = base
            .join("app/rest/")
            .map_err(|e| CfPathsError::Config(format!("Invalid REST API URL: {e}")))?;

        Ok(Self {
            client,
            rest_url,
            credentials: settings.credentials.clone(),
        })
    }

    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    /// Lists every build configuration visible to the configured user.
    pub async fn fetch_build_types(&self) -> Result<Vec<BuildConfiguration>> {
        let url = self.endpoint(&["buildTypes"])?;
        let response: BuildTypesResponse = self.get_json(url).await?;
        Ok(response.build_type)
    }

    /// Fetches the declared parameters of one build configuration.
    pub async fn fetch_parameters(&self, build_type_id: &str) -> Result<Vec<Parameter>> {
        let url = self.endpoint(&["buildTypes", build_type_id, "parameters"])?;
        let response: ParametersResponse = self.get_json(url).await?;
        Ok(response.property)
    }

    pub async fn fetch_project(&self, project_id: &str) -> Result<Project> {
        let url = self.endpoint(&["projects", project_id])?;
        self.get_json(url).await
    }

    /// Fetches the most recent successful build, if the configuration has one.
    pub async fn fetch_last_successful_build(
        &self,
        build_type_id: &str,
    ) -> Result<Option<BuildRecord>> {
        let mut url = self.endpoint(&["buildTypes", build_type_id, "builds", ""])?;
        url.query_pairs_mut()
            .append_pair("count", "1")
            .append_pair("status", "SUCCESS");

        let response: BuildsResponse = self.get_json(url).await?;
        Ok(response.build.into_iter().next())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.rest_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CfPathsError::Config(format!("Server URL cannot be a base: {}", self.rest_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(credentials) = &self.credentials {
            request.basic_auth(credentials.username(), Some(credentials.password()))
        } else {
            request
        }
    }

    async fn get_json<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!("GET {url}");

        let request = self.auth_request(
            self.client
                .get(url.clone())
                .header(ACCEPT, HeaderValue::from_static("application/json")),
        );

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CfPathsError::Api {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| {
            debug!("Undecodable body from {}: {}", url.path(), excerpt(&body));
            CfPathsError::Decode {
                endpoint: url.path().to_string(),
                source,
            }
        })
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_LEN {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(BODY_EXCERPT_LEN).collect();
        format!("{cut}...")
    }
}
