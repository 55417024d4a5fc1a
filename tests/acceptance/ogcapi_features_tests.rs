//! OGC API Features acceptance tests.
//!
//! Verifies the workspace-local `/ogc/features/v1` surface: collection
//! listing, single-collection metadata, GeoJSON items, pagination and bbox
//! filtering, plus the classic WFS front door over the same data.

use reqwest::StatusCode;

use geoharness::client::featuretype::{AttributeKind, FeatureTypeAttribute};

use crate::common::AcceptanceContext;

fn point_attributes(fields: &[(&str, AttributeKind)]) -> Vec<FeatureTypeAttribute> {
    let mut attributes = vec![FeatureTypeAttribute::geometry("geom", AttributeKind::Point)];
    for (name, kind) in fields {
        attributes.push(FeatureTypeAttribute::new(name, *kind, false));
    }
    attributes
}

/// The collections endpoint lists every feature type in the workspace.
#[tokio::test]
#[ignore = "requires a running GeoServer (GEOSERVER_URL) and PostGIS (DATABASE_URL)"]
async fn collections_list_contains_created_feature_types() {
    let ctx = AcceptanceContext::new();
    let stack = ctx.stack.clone();

    stack
        .run(async {
            let (workspace, datastore, schema) =
                ("ogcapi_collections", "ogcapi_collections_ds", "ogcapi_collections");
            ctx.db_session(schema).await;
            ctx.workspace_with_datastore(workspace, datastore, schema).await;

            let cities = point_attributes(&[
                ("name", AttributeKind::String),
                ("population", AttributeKind::Integer),
            ]);
            ctx.client
                .create_feature_type(workspace, datastore, "cities", &cities, 2056, None)
                .await
                .expect("create cities")
                .assert_status(StatusCode::CREATED);

            let roads = vec![
                FeatureTypeAttribute::geometry("geom", AttributeKind::Line),
                FeatureTypeAttribute::new("name", AttributeKind::String, true),
            ];
            ctx.client
                .create_feature_type(workspace, datastore, "roads", &roads, 2056, None)
                .await
                .expect("create roads")
                .assert_status(StatusCode::CREATED);

            let response = ctx
                .client
                .get(&format!(
                    "/{}/ogc/features/v1/collections?f=application/json",
                    workspace
                ))
                .await
                .expect("collections request");
            response.assert_status(StatusCode::OK);

            let body: serde_json::Value = response.json().expect("collections JSON");
            let collections = body["collections"]
                .as_array()
                .expect("collections must be an array");
            let ids: Vec<&str> = collections
                .iter()
                .filter_map(|c| c["id"].as_str())
                .collect();
            assert!(ids.contains(&"cities"), "cities missing from {:?}", ids);
            assert!(ids.contains(&"roads"), "roads missing from {:?}", ids);

            let cities = collections
                .iter()
                .find(|c| c["id"] == "cities")
                .expect("cities collection");
            assert!(cities["title"].is_string());
            assert!(cities["extent"]["spatial"].is_object());
        })
        .await;
}

/// Single-collection metadata carries id, extent and an items link.
#[tokio::test]
#[ignore = "requires a running GeoServer (GEOSERVER_URL) and PostGIS (DATABASE_URL)"]
async fn single_collection_metadata() {
    let ctx = AcceptanceContext::new();
    let stack = ctx.stack.clone();

    stack
        .run(async {
            let (workspace, datastore, schema) =
                ("ogcapi_single", "ogcapi_single_ds", "ogcapi_single");
            ctx.db_session(schema).await;
            ctx.workspace_with_datastore(workspace, datastore, schema).await;

            let attributes = point_attributes(&[("name", AttributeKind::String)]);
            ctx.client
                .create_feature_type(workspace, datastore, "single", &attributes, 2056, None)
                .await
                .expect("create feature type")
                .assert_status(StatusCode::CREATED);

            // The REST view of the new feature type exists as well.
            ctx.client
                .get_feature_type(workspace, datastore, "single")
                .await
                .expect("get feature type")
                .assert_status(StatusCode::OK);

            let response = ctx
                .client
                .get(&format!(
                    "/{}/ogc/features/v1/collections/{}:single?f=application/json",
                    workspace, workspace
                ))
                .await
                .expect("collection request");
            response.assert_status(StatusCode::OK);

            let body: serde_json::Value = response.json().expect("collection JSON");
            assert_eq!(body["id"], "single");
            assert!(body["extent"].is_object());

            let links = body["links"].as_array().expect("links array");
            assert!(
                links.iter().any(|l| l["rel"] == "items"),
                "collection must link to its items"
            );

            // Deleting the feature type removes the collection.
            ctx.client
                .delete_feature_type(workspace, datastore, "single")
                .await
                .expect("delete feature type")
                .assert_status(StatusCode::OK);
            let gone = ctx
                .client
                .get(&format!(
                    "/{}/ogc/features/v1/collections/{}:single?f=application/json",
                    workspace, workspace
                ))
                .await
                .expect("collection request");
            assert_eq!(gone.status, StatusCode::NOT_FOUND);
        })
        .await;
}

/// Items come back as a GeoJSON FeatureCollection with the inserted rows.
#[tokio::test]
#[ignore = "requires a running GeoServer (GEOSERVER_URL) and PostGIS (DATABASE_URL)"]
async fn items_as_geojson() {
    let ctx = AcceptanceContext::new();
    let stack = ctx.stack.clone();

    stack
        .run(async {
            let (workspace, datastore, schema) =
                ("ogcapi_items", "ogcapi_items_ds", "ogcapi_items");
            let session = ctx.db_session(schema).await;
            ctx.workspace_with_datastore(workspace, datastore, schema).await;

            let attributes = point_attributes(&[
                ("name", AttributeKind::String),
                ("category", AttributeKind::String),
            ]);
            ctx.client
                .create_feature_type(workspace, datastore, "items", &attributes, 2056, None)
                .await
                .expect("create feature type")
                .assert_status(StatusCode::CREATED);

            session
                .execute(
                    "INSERT INTO items (geom, name, category) VALUES \
                     (public.ST_SetSRID(public.ST_MakePoint(2600000, 1200000), 2056), 'City A', 'city'), \
                     (public.ST_SetSRID(public.ST_MakePoint(2601000, 1201000), 2056), 'City B', 'city'), \
                     (public.ST_SetSRID(public.ST_MakePoint(2602000, 1202000), 2056), 'City C', 'city')",
                )
                .await
                .expect("insert rows");
            assert_eq!(session.count("items").await.expect("count"), 3);

            let response = ctx
                .client
                .get(&format!(
                    "/{}/ogc/features/v1/collections/{}:items/items?f=application/geo%2Bjson",
                    workspace, workspace
                ))
                .await
                .expect("items request");
            response.assert_status(StatusCode::OK);

            let body: serde_json::Value = response.json().expect("items JSON");
            assert_eq!(body["type"], "FeatureCollection");
            let features = body["features"].as_array().expect("features array");
            assert_eq!(features.len(), 3);

            let feature = &features[0];
            assert_eq!(feature["type"], "Feature");
            assert_eq!(feature["geometry"]["type"], "Point");
            assert!(feature["properties"]["name"].is_string());
        })
        .await;
}

/// The limit parameter pages through items.
#[tokio::test]
#[ignore = "requires a running GeoServer (GEOSERVER_URL) and PostGIS (DATABASE_URL)"]
async fn items_pagination_limit() {
    let ctx = AcceptanceContext::new();
    let stack = ctx.stack.clone();

    stack
        .run(async {
            let (workspace, datastore, schema) =
                ("ogcapi_limit", "ogcapi_limit_ds", "ogcapi_limit");
            let session = ctx.db_session(schema).await;
            ctx.workspace_with_datastore(workspace, datastore, schema).await;

            let attributes = point_attributes(&[("name", AttributeKind::String)]);
            ctx.client
                .create_feature_type(workspace, datastore, "paged", &attributes, 2056, None)
                .await
                .expect("create feature type")
                .assert_status(StatusCode::CREATED);

            session
                .execute(
                    "INSERT INTO paged (geom, name) \
                     SELECT public.ST_SetSRID(public.ST_MakePoint(2600000 + i * 100, 1200000), 2056), \
                            'feature ' || i \
                     FROM generate_series(1, 5) AS i",
                )
                .await
                .expect("insert rows");

            let response = ctx
                .client
                .get(&format!(
                    "/{}/ogc/features/v1/collections/{}:paged/items?f=application/geo%2Bjson&limit=2",
                    workspace, workspace
                ))
                .await
                .expect("items request");
            response.assert_status(StatusCode::OK);

            let body: serde_json::Value = response.json().expect("items JSON");
            assert_eq!(body["features"].as_array().expect("features").len(), 2);

            let links = body["links"].as_array().expect("links array");
            assert!(
                links.iter().any(|l| l["rel"] == "next"),
                "paged response must link to the next page"
            );
        })
        .await;
}

/// Spatial filtering with bbox returns only intersecting features.
#[tokio::test]
#[ignore = "requires a running GeoServer (GEOSERVER_URL) and PostGIS (DATABASE_URL)"]
async fn items_bbox_filter() {
    let ctx = AcceptanceContext::new();
    let stack = ctx.stack.clone();

    stack
        .run(async {
            let (workspace, datastore, schema) = ("ogcapi_bbox", "ogcapi_bbox_ds", "ogcapi_bbox");
            let session = ctx.db_session(schema).await;
            ctx.workspace_with_datastore(workspace, datastore, schema).await;

            let attributes = point_attributes(&[("name", AttributeKind::String)]);
            ctx.client
                .create_feature_type(workspace, datastore, "filtered", &attributes, 4326, None)
                .await
                .expect("create feature type")
                .assert_status(StatusCode::CREATED);

            session
                .execute(
                    "INSERT INTO filtered (geom, name) VALUES \
                     (public.ST_SetSRID(public.ST_MakePoint(7.45, 46.95), 4326), 'inside'), \
                     (public.ST_SetSRID(public.ST_MakePoint(13.40, 52.52), 4326), 'outside')",
                )
                .await
                .expect("insert rows");

            let response = ctx
                .client
                .get(&format!(
                    "/{}/ogc/features/v1/collections/{}:filtered/items\
                     ?f=application/geo%2Bjson&bbox=7,46,8,48",
                    workspace, workspace
                ))
                .await
                .expect("items request");
            response.assert_status(StatusCode::OK);

            let body: serde_json::Value = response.json().expect("items JSON");
            let features = body["features"].as_array().expect("features array");
            assert_eq!(features.len(), 1);
            assert_eq!(features[0]["properties"]["name"], "inside");
        })
        .await;
}

/// The same rows are reachable through classic WFS GetFeature.
#[tokio::test]
#[ignore = "requires a running GeoServer (GEOSERVER_URL) and PostGIS (DATABASE_URL)"]
async fn wfs_get_feature_matches_inserted_rows() {
    let ctx = AcceptanceContext::new();
    let stack = ctx.stack.clone();

    stack
        .run(async {
            let (workspace, datastore, schema) = ("wfs_basic", "wfs_basic_ds", "wfs_basic");
            let session = ctx.db_session(schema).await;
            ctx.workspace_with_datastore(workspace, datastore, schema).await;

            let attributes = point_attributes(&[("name", AttributeKind::String)]);
            ctx.client
                .create_feature_type(workspace, datastore, "points", &attributes, 2056, None)
                .await
                .expect("create feature type")
                .assert_status(StatusCode::CREATED);

            session
                .execute(
                    "INSERT INTO points (geom, name) VALUES \
                     (public.ST_SetSRID(public.ST_MakePoint(2600000, 1200000), 2056), 'one'), \
                     (public.ST_SetSRID(public.ST_MakePoint(2601000, 1201000), 2056), 'two')",
                )
                .await
                .expect("insert rows");

            let response = ctx
                .client
                .get_feature(workspace, "points", Some(10))
                .await
                .expect("GetFeature request");
            response.assert_status(StatusCode::OK);

            let body: serde_json::Value = response.json().expect("GeoJSON body");
            assert_eq!(body["features"].as_array().expect("features").len(), 2);
        })
        .await;
}
