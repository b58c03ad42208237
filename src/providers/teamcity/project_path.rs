use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, warn};

use super::client::TeamCityClient;

pub const PATH_SEPARATOR: &str = " / ";

/// Upper bound on ancestors followed for a single project.
const MAX_PROJECT_DEPTH: usize = 64;

/// Resolves a project ID into its `Root / Mid / Leaf` display path.
///
/// Resolutions are memoized per project ID for the lifetime of the resolver when
/// memoization is enabled. The memo only saves requests; results are identical.
pub struct ProjectPathResolver {
    memo: Option<HashMap<String, Option<String>>>,
    failed_lookups: usize,
}

impl ProjectPathResolver {
    pub fn new(memoize: bool) -> Self {
        Self {
            memo: memoize.then(HashMap::new),
            failed_lookups: 0,
        }
    }

    /// Number of project fetches that failed, including truncated walks.
    pub fn failed_lookups(&self) -> usize {
        self.failed_lookups
    }

    /// Returns the slash-joined path from the root project down to `project_id`.
    ///
    /// Returns `None` only when `project_id` itself cannot be fetched. A failure
    /// further up the chain truncates the path at the last resolved ancestor, and so
    /// does a parent chain that loops or exceeds the depth bound.
    pub async fn resolve(&mut self, client: &TeamCityClient, project_id: &str) -> Option<String> {
        if let Some(hit) = self.memo.as_ref().and_then(|memo| memo.get(project_id)) {
            debug!("Project path cache hit for {project_id}");
            return hit.clone();
        }

        let resolved = self.walk(client, project_id).await;

        if let Some(memo) = self.memo.as_mut() {
            memo.insert(project_id.to_string(), resolved.clone());
        }

        resolved
    }

    async fn walk(&mut self, client: &TeamCityClient, project_id: &str) -> Option<String> {
        let project = match client.fetch_project(project_id).await {
            Ok(project) => project,
            Err(e) => {
                warn!("Failed to fetch project {project_id}: {e}");
                self.failed_lookups += 1;
                return None;
            }
        };

        let mut names = VecDeque::from([project.name.clone()]);
        let mut visited = HashSet::from([project_id.to_string()]);
        let mut parent = project.parent_id().map(ToString::to_string);

        while let Some(parent_id) = parent.take() {
            if !visited.insert(parent_id.clone()) {
                warn!("Project hierarchy of {project_id} loops back to {parent_id}, truncating path");
                break;
            }
            if names.len() >= MAX_PROJECT_DEPTH {
                warn!(
                    "Project hierarchy of {project_id} is deeper than {MAX_PROJECT_DEPTH} levels, truncating path"
                );
                break;
            }

            match client.fetch_project(&parent_id).await {
                Ok(ancestor) => {
                    parent = ancestor.parent_id().map(ToString::to_string);
                    names.push_front(ancestor.name);
                }
                Err(e) => {
                    warn!("Failed to fetch parent project {parent_id} of {project_id}, truncating path: {e}");
                    self.failed_lookups += 1;
                    break;
                }
            }
        }

        Some(Vec::from(names).join(PATH_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionSettings;
    use mockito::{Mock, ServerGuard};

    fn project_mock(server: &mut ServerGuard, id: &str, name: &str, parent: Option<&str>) -> Mock {
        let body = match parent {
            Some(parent) => {
                format!(r#"{{"id":"{id}","name":"{name}","parentProjectId":"{parent}"}}"#)
            }
            None => format!(r#"{{"id":"{id}","name":"{name}"}}"#),
        };
        server
            .mock("GET", format!("/app/rest/projects/{id}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
    }

    async fn mock_project(
        server: &mut ServerGuard,
        id: &str,
        name: &str,
        parent: Option<&str>,
    ) -> Mock {
        project_mock(server, id, name, parent).create_async().await
    }

    fn client_for(server: &ServerGuard) -> TeamCityClient {
        TeamCityClient::new(&ConnectionSettings {
            server: server.url(),
            credentials: None,
            timeout: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolves_full_chain() {
        let mut server = mockito::Server::new_async().await;
        let _leaf = mock_project(&mut server, "Leaf", "Leaf", Some("Mid")).await;
        let _mid = mock_project(&mut server, "Mid", "Mid", Some("Root")).await;
        let _root = mock_project(&mut server, "Root", "Root", None).await;

        let client = client_for(&server);
        let mut resolver = ProjectPathResolver::new(false);

        assert_eq!(
            resolver.resolve(&client, "Leaf").await,
            Some("Root / Mid / Leaf".to_string())
        );
        assert_eq!(resolver.failed_lookups(), 0);
    }

    #[tokio::test]
    async fn test_mid_chain_failure_truncates() {
        let mut server = mockito::Server::new_async().await;
        let _leaf = mock_project(&mut server, "Leaf", "Leaf", Some("Mid")).await;
        let _mid = server
            .mock("GET", "/app/rest/projects/Mid")
            .with_status(500)
            .create_async()
            .await;
        let _root = mock_project(&mut server, "Root", "Root", None).await;

        let client = client_for(&server);
        let mut resolver = ProjectPathResolver::new(false);

        assert_eq!(resolver.resolve(&client, "Leaf").await, Some("Leaf".to_string()));
        assert_eq!(resolver.failed_lookups(), 1);
    }

    #[tokio::test]
    async fn test_initial_failure_is_absent() {
        let mut server = mockito::Server::new_async().await;
        let _gone = server
            .mock("GET", "/app/rest/projects/Gone")
            .with_status(404)
            .with_body("No project found")
            .create_async()
            .await;

        let client = client_for(&server);
        let mut resolver = ProjectPathResolver::new(true);

        assert_eq!(resolver.resolve(&client, "Gone").await, None);
        assert_eq!(resolver.failed_lookups(), 1);
    }

    #[tokio::test]
    async fn test_cyclic_hierarchy_stops() {
        let mut server = mockito::Server::new_async().await;
        let _a = mock_project(&mut server, "A", "Alpha", Some("B")).await;
        let _b = mock_project(&mut server, "B", "Beta", Some("A")).await;

        let client = client_for(&server);
        let mut resolver = ProjectPathResolver::new(false);

        assert_eq!(
            resolver.resolve(&client, "A").await,
            Some("Beta / Alpha".to_string())
        );
    }

    #[tokio::test]
    async fn test_deep_hierarchy_truncates_at_depth_bound() {
        let mut server = mockito::Server::new_async().await;
        let chain_len = MAX_PROJECT_DEPTH + 16;
        let mut mocks = Vec::with_capacity(chain_len);
        for level in 0..chain_len {
            let id = format!("P{level}");
            let parent = (level + 1 < chain_len).then(|| format!("P{}", level + 1));
            mocks.push(mock_project(&mut server, &id, &id, parent.as_deref()).await);
        }

        let client = client_for(&server);
        let mut resolver = ProjectPathResolver::new(false);

        let path = resolver.resolve(&client, "P0").await.unwrap();
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();

        assert_eq!(segments.len(), MAX_PROJECT_DEPTH);
        assert_eq!(segments.first(), Some(&"P63"));
        assert_eq!(segments.last(), Some(&"P0"));
        assert_eq!(resolver.failed_lookups(), 0);
    }

    #[tokio::test]
    async fn test_self_parent_stops() {
        let mut server = mockito::Server::new_async().await;
        let _loop = mock_project(&mut server, "Loop", "Loop", Some("Loop")).await;

        let client = client_for(&server);
        let mut resolver = ProjectPathResolver::new(false);

        assert_eq!(resolver.resolve(&client, "Loop").await, Some("Loop".to_string()));
    }

    #[tokio::test]
    async fn test_memoized_resolution_fetches_once() {
        let mut server = mockito::Server::new_async().await;
        let leaf = project_mock(&mut server, "Leaf", "Leaf", Some("Root"))
            .expect(1)
            .create_async()
            .await;
        let root = project_mock(&mut server, "Root", "Root", None)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let mut resolver = ProjectPathResolver::new(true);

        for _ in 0..3 {
            assert_eq!(
                resolver.resolve(&client, "Leaf").await,
                Some("Root / Leaf".to_string())
            );
        }

        leaf.assert_async().await;
        root.assert_async().await;
    }

    #[tokio::test]
    async fn test_without_memo_walks_every_time() {
        let mut server = mockito::Server::new_async().await;
        let leaf = project_mock(&mut server, "Leaf", "Leaf", None)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        let mut resolver = ProjectPathResolver::new(false);

        resolver.resolve(&client, "Leaf").await;
        resolver.resolve(&client, "Leaf").await;

        leaf.assert_async().await;
    }
}
