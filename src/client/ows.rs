//! OWS front doors: WMS rendering and capabilities, legends, WFS features,
//! WMTS tiles, and the per-workspace WMS locale setting the i18n tests toggle.

use regex::Regex;
use serde_json::json;

use super::{ClientResponse, GeoServerClient};
use crate::error::HarnessResult;

/// Parameters for a WMS GetMap request.
#[derive(Debug, Clone)]
pub struct GetMapRequest {
    pub layers: Vec<String>,
    pub styles: Vec<String>,
    pub bbox: (f64, f64, f64, f64),
    pub width: u32,
    pub height: u32,
    pub epsg: u32,
    pub format: String,
    pub transparent: bool,
    pub language: Option<String>,
}

impl GetMapRequest {
    pub fn new(layer: &str, bbox: (f64, f64, f64, f64), width: u32, height: u32) -> Self {
        Self {
            layers: vec![layer.to_string()],
            styles: Vec::new(),
            bbox,
            width,
            height,
            epsg: 2056,
            format: "image/png".to_string(),
            transparent: false,
            language: None,
        }
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.styles.push(style.to_string());
        self
    }

    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language.map(|l| l.to_string());
        self
    }

    pub fn with_epsg(mut self, epsg: u32) -> Self {
        self.epsg = epsg;
        self
    }

    fn query(&self) -> Vec<(String, String)> {
        let (minx, miny, maxx, maxy) = self.bbox;
        let mut query = vec![
            ("SERVICE".to_string(), "WMS".to_string()),
            ("VERSION".to_string(), "1.1.1".to_string()),
            ("REQUEST".to_string(), "GetMap".to_string()),
            ("LAYERS".to_string(), self.layers.join(",")),
            ("STYLES".to_string(), self.styles.join(",")),
            (
                "BBOX".to_string(),
                format!("{},{},{},{}", minx, miny, maxx, maxy),
            ),
            ("WIDTH".to_string(), self.width.to_string()),
            ("HEIGHT".to_string(), self.height.to_string()),
            ("SRS".to_string(), format!("EPSG:{}", self.epsg)),
            ("FORMAT".to_string(), self.format.clone()),
            ("TRANSPARENT".to_string(), self.transparent.to_string()),
        ];

        if let Some(language) = &self.language {
            query.push(("LANGUAGE".to_string(), language.clone()));
        }

        query
    }
}

impl GeoServerClient {
    /// Render a map through the workspace-local WMS endpoint.
    pub async fn get_map(
        &self,
        workspace: &str,
        request: &GetMapRequest,
    ) -> HarnessResult<ClientResponse> {
        self.get_with_query(&format!("/{}/wms", workspace), &request.query())
            .await
    }

    /// Fetch the WMS capabilities document for a workspace, optionally
    /// negotiating a language via `AcceptLanguages`.
    pub async fn get_wms_capabilities(
        &self,
        workspace: &str,
        language: Option<&str>,
    ) -> HarnessResult<ClientResponse> {
        let mut query = vec![
            ("service".to_string(), "WMS".to_string()),
            ("version".to_string(), "1.3.0".to_string()),
            ("request".to_string(), "GetCapabilities".to_string()),
        ];
        if let Some(language) = language {
            query.push(("AcceptLanguages".to_string(), language.to_string()));
        }

        self.get_with_query(&format!("/{}/wms", workspace), &query)
            .await
    }

    /// Fetch a legend as JSON for a layer/style pair.
    pub async fn get_legend_graphic(
        &self,
        workspace: &str,
        layer: &str,
        style: &str,
        language: Option<&str>,
    ) -> HarnessResult<ClientResponse> {
        let mut query = vec![
            ("service".to_string(), "WMS".to_string()),
            ("version".to_string(), "1.3.0".to_string()),
            ("request".to_string(), "GetLegendGraphic".to_string()),
            ("format".to_string(), "application/json".to_string()),
            ("layer".to_string(), format!("{}:{}", workspace, layer)),
            ("style".to_string(), style.to_string()),
        ];
        if let Some(language) = language {
            query.push(("language".to_string(), language.to_string()));
        }

        self.get_with_query(&format!("/{}/ows", workspace), &query)
            .await
    }

    /// Fetch features as GeoJSON through WFS.
    pub async fn get_feature(
        &self,
        workspace: &str,
        type_name: &str,
        count: Option<u32>,
    ) -> HarnessResult<ClientResponse> {
        let mut query = vec![
            ("service".to_string(), "WFS".to_string()),
            ("version".to_string(), "2.0.0".to_string()),
            ("request".to_string(), "GetFeature".to_string()),
            (
                "typeNames".to_string(),
                format!("{}:{}", workspace, type_name),
            ),
            ("outputFormat".to_string(), "application/json".to_string()),
        ];
        if let Some(count) = count {
            query.push(("count".to_string(), count.to_string()));
        }

        self.get_with_query(&format!("/{}/wfs", workspace), &query)
            .await
    }

    /// Fetch a single tile through the integrated tile cache.
    pub async fn get_wmts_tile(
        &self,
        layer: &str,
        tile_matrix_set: &str,
        zoom: u32,
        row: u32,
        col: u32,
    ) -> HarnessResult<ClientResponse> {
        let query = vec![
            ("SERVICE".to_string(), "WMTS".to_string()),
            ("VERSION".to_string(), "1.0.0".to_string()),
            ("REQUEST".to_string(), "GetTile".to_string()),
            ("LAYER".to_string(), layer.to_string()),
            ("STYLE".to_string(), String::new()),
            ("TILEMATRIXSET".to_string(), tile_matrix_set.to_string()),
            (
                "TILEMATRIX".to_string(),
                format!("{}:{}", tile_matrix_set, zoom),
            ),
            ("TILEROW".to_string(), row.to_string()),
            ("TILECOL".to_string(), col.to_string()),
            ("FORMAT".to_string(), "image/png".to_string()),
        ];

        self.get_with_query("/gwc/service/wmts", &query).await
    }

    /// Set the default locale of the workspace-local WMS service.
    pub async fn set_default_locale_for_service(
        &self,
        workspace: &str,
        locale: &str,
    ) -> HarnessResult<ClientResponse> {
        let body = json!({ "wms": { "defaultLocale": locale } });
        self.put_json(
            &format!("/rest/services/wms/workspaces/{}/settings.json", workspace),
            &body,
        )
        .await
    }

    /// Clear the default locale of the workspace-local WMS service.
    pub async fn unset_default_locale_for_service(
        &self,
        workspace: &str,
    ) -> HarnessResult<ClientResponse> {
        let body = json!({ "wms": { "defaultLocale": null } });
        self.put_json(
            &format!("/rest/services/wms/workspaces/{}/settings.json", workspace),
            &body,
        )
        .await
    }
}

/// Extract `(name, title)` pairs for the named layers of a WMS capabilities
/// document. The root layer carries no `<Name>` and is skipped.
pub fn wms_layer_titles(capabilities: &str) -> Vec<(String, String)> {
    let re = Regex::new(r"(?s)<Name>([^<]+)</Name>\s*<Title>([^<]*)</Title>")
        .expect("static regex");
    re.captures_iter(capabilities)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}
