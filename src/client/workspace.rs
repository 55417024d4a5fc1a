//! Workspace management (REST `/rest/workspaces`).

use serde_json::json;

use super::{ClientResponse, GeoServerClient};
use crate::error::HarnessResult;

impl GeoServerClient {
    /// Create a workspace. Returns 201 on success, 409 if it already exists.
    pub async fn create_workspace(
        &self,
        name: &str,
        isolated: bool,
        set_default: bool,
    ) -> HarnessResult<ClientResponse> {
        let body = json!({
            "workspace": {
                "name": name,
                "isolated": isolated,
            }
        });

        let response = self.post_json("/rest/workspaces.json", &body).await?;

        if set_default && response.status.is_success() {
            self.set_default_workspace(name).await?;
        }

        Ok(response)
    }

    pub async fn get_workspace(&self, name: &str) -> HarnessResult<ClientResponse> {
        self.get(&format!("/rest/workspaces/{}.json", name)).await
    }

    /// Update an existing workspace, e.g. to toggle its isolated flag.
    pub async fn update_workspace(
        &self,
        name: &str,
        isolated: bool,
    ) -> HarnessResult<ClientResponse> {
        let body = json!({
            "workspace": {
                "name": name,
                "isolated": isolated,
            }
        });

        self.put_json(&format!("/rest/workspaces/{}.json", name), &body)
            .await
    }

    /// Delete a workspace and everything it contains.
    pub async fn delete_workspace(&self, name: &str) -> HarnessResult<ClientResponse> {
        self.delete(&format!("/rest/workspaces/{}.json?recurse=true", name))
            .await
    }

    pub async fn set_default_workspace(&self, name: &str) -> HarnessResult<ClientResponse> {
        let body = json!({ "workspace": { "name": name } });
        self.put_json("/rest/workspaces/default.json", &body).await
    }

    /// Delete-then-create, for tests that want a clean slate regardless of
    /// what a previous aborted run left behind.
    pub async fn recreate_workspace(&self, name: &str) -> HarnessResult<ClientResponse> {
        self.delete_workspace(name).await?;
        self.create_workspace(name, false, false).await
    }
}
