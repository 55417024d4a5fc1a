//! Style management (REST `.../styles`): SLD upload and deletion.

use std::path::Path;

use super::{ClientResponse, GeoServerClient};
use crate::error::HarnessResult;

const SLD_CONTENT_TYPE: &str = "application/vnd.ogc.sld+xml";

impl GeoServerClient {
    /// Upload an SLD document as a named style in a workspace.
    pub async fn create_style(
        &self,
        workspace: &str,
        name: &str,
        sld: impl Into<bytes::Bytes>,
    ) -> HarnessResult<ClientResponse> {
        self.post_raw(
            &format!("/rest/workspaces/{}/styles?name={}", workspace, name),
            sld.into(),
            SLD_CONTENT_TYPE,
        )
        .await
    }

    /// Upload an SLD file from disk as a named style in a workspace.
    pub async fn create_style_from_file(
        &self,
        workspace: &str,
        name: &str,
        path: impl AsRef<Path>,
    ) -> HarnessResult<ClientResponse> {
        let sld = tokio::fs::read(path.as_ref()).await?;
        self.create_style(workspace, name, sld).await
    }

    pub async fn get_style(
        &self,
        workspace: &str,
        name: &str,
    ) -> HarnessResult<ClientResponse> {
        self.get(&format!("/rest/workspaces/{}/styles/{}.json", workspace, name))
            .await
    }

    pub async fn delete_style(
        &self,
        workspace: &str,
        name: &str,
    ) -> HarnessResult<ClientResponse> {
        self.delete(&format!(
            "/rest/workspaces/{}/styles/{}?purge=true&recurse=true",
            workspace, name
        ))
        .await
    }
}
