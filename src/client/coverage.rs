//! Coverage stores and coverages (REST `.../coveragestores`).
//!
//! ImageMosaic stores can be created three ways: pointing the store at an
//! external directory (the web UI workflow), uploading a zipped mosaic
//! configuration, or creating an empty store and harvesting granules into it.

use regex::Regex;
use serde_json::json;

use super::{ClientResponse, GeoServerClient};
use crate::error::HarnessResult;

impl GeoServerClient {
    /// Create an ImageMosaic coverage store from a directory visible to the
    /// server. Answers 201 or 202 depending on whether coverages were
    /// auto-configured.
    pub async fn create_imagemosaic_from_directory(
        &self,
        workspace: &str,
        store: &str,
        directory: &str,
    ) -> HarnessResult<ClientResponse> {
        self.put_raw(
            &format!(
                "/rest/workspaces/{}/coveragestores/{}/external.imagemosaic",
                workspace, store
            ),
            directory.to_string(),
            "text/plain",
        )
        .await
    }

    /// Upload a zipped ImageMosaic configuration (datastore.properties,
    /// indexer.properties, ...) to create the store.
    pub async fn create_imagemosaic_from_zip(
        &self,
        workspace: &str,
        store: &str,
        zip_bytes: Vec<u8>,
    ) -> HarnessResult<ClientResponse> {
        self.put_raw(
            &format!(
                "/rest/workspaces/{}/coveragestores/{}/file.imagemosaic?configure=none",
                workspace, store
            ),
            zip_bytes,
            "application/zip",
        )
        .await
    }

    /// Harvest granules from a directory or file into an existing store.
    pub async fn harvest_granules(
        &self,
        workspace: &str,
        store: &str,
        path: &str,
    ) -> HarnessResult<ClientResponse> {
        self.post_raw(
            &format!(
                "/rest/workspaces/{}/coveragestores/{}/external.imagemosaic",
                workspace, store
            ),
            path.to_string(),
            "text/plain",
        )
        .await
    }

    /// List the coverages a store exposes, including unconfigured ones.
    pub async fn list_coverages(
        &self,
        workspace: &str,
        store: &str,
    ) -> HarnessResult<ClientResponse> {
        self.get(&format!(
            "/rest/workspaces/{}/coveragestores/{}/coverages.xml?list=all",
            workspace, store
        ))
        .await
    }

    pub async fn create_coverage(
        &self,
        workspace: &str,
        store: &str,
        name: &str,
        title: &str,
    ) -> HarnessResult<ClientResponse> {
        let body = json!({
            "coverage": {
                "name": name,
                "nativeName": name,
                "title": title,
                "enabled": true,
            }
        });

        self.post_json(
            &format!(
                "/rest/workspaces/{}/coveragestores/{}/coverages.json",
                workspace, store
            ),
            &body,
        )
        .await
    }

    pub async fn get_coverage(
        &self,
        workspace: &str,
        store: &str,
        name: &str,
    ) -> HarnessResult<ClientResponse> {
        self.get(&format!(
            "/rest/workspaces/{}/coveragestores/{}/coverages/{}.json",
            workspace, store, name
        ))
        .await
    }

    pub async fn delete_coverage_store(
        &self,
        workspace: &str,
        store: &str,
    ) -> HarnessResult<ClientResponse> {
        self.delete(&format!(
            "/rest/workspaces/{}/coveragestores/{}.json?recurse=true&purge=all",
            workspace, store
        ))
        .await
    }
}

/// Extract coverage names from a `coverages.xml?list=all` listing.
pub fn coverage_names(listing: &str) -> Vec<String> {
    // The listing is trivial XML; scraping the one element we need beats
    // carrying a full XML parser.
    let re = Regex::new(r"<coverageName>([^<]+)</coverageName>").expect("static regex");
    re.captures_iter(listing)
        .map(|c| c[1].to_string())
        .collect()
}
