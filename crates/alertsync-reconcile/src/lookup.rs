//! Organization-wide lookups.

use alertsync_client::ProjectsClient;
use alertsync_core::walk_pages;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::ReconcileError;

/// Maps every project id in an organization to its slug.
///
/// All pages are fetched; an error on any page fails the whole lookup.
pub async fn project_slugs(
    client: &dyn ProjectsClient,
    organization: &str,
) -> Result<IndexMap<String, String>, ReconcileError> {
    let slugs = walk_pages(
        |cursor| client.list_projects(organization, cursor),
        |project| (project.id, project.slug),
    )
    .await
    .map_err(ReconcileError::Transport)?;

    debug!(org = organization, count = slugs.len(), "Resolved project slugs");
    Ok(slugs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertsync_client::ClientError;
    use alertsync_client_memory::InMemoryClient;

    #[tokio::test]
    async fn test_walks_every_page() {
        let client = InMemoryClient::new().with_page_size(2);
        for i in 1..=5 {
            client.add_project("acme", &i.to_string(), &format!("project-{i}"));
        }
        client.add_project("other", "99", "elsewhere");

        let slugs = project_slugs(&client, "acme").await.unwrap();
        assert_eq!(slugs.len(), 5);
        assert_eq!(slugs["3"], "project-3");
        assert!(!slugs.contains_key("99"));
    }

    #[tokio::test]
    async fn test_error_discards_partial_result() {
        let client = InMemoryClient::new().with_page_size(1);
        client.add_project("acme", "1", "web");
        client.add_project("acme", "2", "api");
        client.fail_next(ClientError::transport("connection reset"));

        let err = project_slugs(&client, "acme").await.unwrap_err();
        assert!(err.transport_error().is_some());
    }
}
