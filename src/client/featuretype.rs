//! Feature type creation (REST `.../featuretypes`).
//!
//! Creating a feature type with an attribute list against a PostGIS datastore
//! makes the server create the backing table, so tests can insert rows through
//! the session database connection right after.

use serde_json::{json, Value};

use super::{ClientResponse, GeoServerClient};
use crate::error::{HarnessError, HarnessResult};

/// An attribute of a feature type: a geometry column or a scalar field.
#[derive(Debug, Clone)]
pub struct FeatureTypeAttribute {
    pub name: String,
    pub kind: AttributeKind,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Point,
    Line,
    Polygon,
    String,
    Integer,
    Float,
}

impl AttributeKind {
    fn binding(self) -> &'static str {
        match self {
            AttributeKind::Point => "org.locationtech.jts.geom.Point",
            AttributeKind::Line => "org.locationtech.jts.geom.LineString",
            AttributeKind::Polygon => "org.locationtech.jts.geom.Polygon",
            AttributeKind::String => "java.lang.String",
            AttributeKind::Integer => "java.lang.Integer",
            AttributeKind::Float => "java.lang.Double",
        }
    }
}

impl FeatureTypeAttribute {
    pub fn new(name: &str, kind: AttributeKind, required: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required,
        }
    }

    /// The usual single required geometry column.
    pub fn geometry(name: &str, kind: AttributeKind) -> Self {
        Self::new(name, kind, true)
    }

    fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "binding": self.kind.binding(),
            "minOccurs": if self.required { 1 } else { 0 },
            "maxOccurs": 1,
            "nillable": !self.required,
        })
    }
}

/// A localizable title, serialized as the REST API's `internationalTitle` map.
///
/// `default` maps to the empty-string key the server uses for the fallback
/// language.
#[derive(Debug, Clone, Default)]
pub struct InternationalTitle {
    entries: Vec<(String, String)>,
}

impl InternationalTitle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, title: &str) -> Self {
        self.entries.push((String::new(), title.to_string()));
        self
    }

    pub fn with_language(mut self, language: &str, title: &str) -> Self {
        self.entries
            .push((language.to_string(), title.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (language, title) in &self.entries {
            map.insert(language.clone(), Value::String(title.clone()));
        }
        Value::Object(map)
    }
}

/// Native and lat/lon bounding boxes for the coordinate systems the tests use.
///
/// EPSG:2056 is Swiss LV95, EPSG:3857 bounds come from the Web Mercator
/// gridset definition.
fn epsg_bbox(epsg: u32) -> Option<(Value, Value)> {
    let (native, latlon) = match epsg {
        2056 => (
            json!({
                "crs": { "@class": "projected", "$": "EPSG:2056" },
                "minx": 2485071.58, "miny": 1075346.31,
                "maxx": 2828515.82, "maxy": 1299941.79,
            }),
            json!({
                "crs": "EPSG:4326",
                "minx": 5.96, "miny": 45.82,
                "maxx": 10.49, "maxy": 47.81,
            }),
        ),
        4326 => (
            json!({
                "crs": "EPSG:4326",
                "minx": -180.0, "miny": -90.0,
                "maxx": 180.0, "maxy": 90.0,
            }),
            json!({
                "crs": "EPSG:4326",
                "minx": -180.0, "miny": -90.0,
                "maxx": 180.0, "maxy": 90.0,
            }),
        ),
        3857 => (
            json!({
                "crs": { "@class": "projected", "$": "EPSG:3857" },
                "minx": -20037508.34, "miny": -20037508.34,
                "maxx": 20037508.34, "maxy": 20037508.34,
            }),
            json!({
                "crs": "EPSG:4326",
                "minx": -180.0, "miny": -85.0511287798,
                "maxx": 180.0, "maxy": 85.0511287798,
            }),
        ),
        _ => return None,
    };

    Some((native, latlon))
}

impl GeoServerClient {
    /// Create a feature type (and its backing table) in a datastore.
    pub async fn create_feature_type(
        &self,
        workspace: &str,
        datastore: &str,
        name: &str,
        attributes: &[FeatureTypeAttribute],
        epsg: u32,
        title: Option<&InternationalTitle>,
    ) -> HarnessResult<ClientResponse> {
        let (native_bbox, latlon_bbox) =
            epsg_bbox(epsg).ok_or(HarnessError::UnknownEpsg(epsg))?;

        let attribute_values: Vec<Value> = attributes.iter().map(|a| a.to_value()).collect();

        let mut feature_type = json!({
            "name": name,
            "nativeName": name,
            "srs": format!("EPSG:{}", epsg),
            "enabled": true,
            "nativeBoundingBox": native_bbox,
            "latLonBoundingBox": latlon_bbox,
            "attributes": { "attribute": attribute_values },
        });

        match title {
            Some(title) if !title.is_empty() => {
                feature_type["internationalTitle"] = title.to_value();
            }
            _ => {
                feature_type["title"] = Value::String(name.to_string());
            }
        }

        let body = json!({ "featureType": feature_type });

        self.post_json(
            &format!(
                "/rest/workspaces/{}/datastores/{}/featuretypes.json",
                workspace, datastore
            ),
            &body,
        )
        .await
    }

    pub async fn get_feature_type(
        &self,
        workspace: &str,
        datastore: &str,
        name: &str,
    ) -> HarnessResult<ClientResponse> {
        self.get(&format!(
            "/rest/workspaces/{}/datastores/{}/featuretypes/{}.json",
            workspace, datastore, name
        ))
        .await
    }

    pub async fn delete_feature_type(
        &self,
        workspace: &str,
        datastore: &str,
        name: &str,
    ) -> HarnessResult<ClientResponse> {
        self.delete(&format!(
            "/rest/workspaces/{}/datastores/{}/featuretypes/{}.json?recurse=true",
            workspace, datastore, name
        ))
        .await
    }
}
