//! Cluster lifecycle against a mock Galaxy, driven through the resource
//! traits the way the host drives them.

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

mod common;

use common::*;
use mockito::{Matcher, Server};
use serde_json::json;
use tfplug::context::Context;
use tfplug::resource::Resource;
use tfplug::types::{AttributePath, Dynamic};

const CLUSTER: &str = "galaxy_cluster";

fn planned_cluster() -> tfplug::types::DynamicValue {
    state(&[
        ("cluster_id", Dynamic::Unknown),
        ("name", s("analytics")),
        ("cloud_region_id", s("aws-us-east1")),
        ("min_workers", n(1.0)),
        ("max_workers", n(4.0)),
        ("idle_stop_minutes", n(15.0)),
        ("private_link_cluster", Dynamic::Bool(false)),
        ("result_cache_enabled", Dynamic::Bool(true)),
        ("result_cache_default_visibility_seconds", n(3600.0)),
        ("warp_resiliency_enabled", Dynamic::Bool(false)),
        ("catalog_refs", Dynamic::Unknown),
        ("processing_mode", Dynamic::Unknown),
        ("cluster_state", Dynamic::Unknown),
        ("trino_uri", Dynamic::Unknown),
    ])
}

const CLUSTER_BODY: &str = r#"{
    "clusterId": "w-1",
    "name": "analytics",
    "cloudRegionId": "aws-us-east1",
    "minWorkers": 1,
    "maxWorkers": 4.0,
    "idleStopMinutes": 15,
    "privateLinkCluster": false,
    "resultCacheEnabled": true,
    "resultCacheDefaultVisibilitySeconds": 3600,
    "warpResiliencyEnabled": false,
    "catalogRefs": [],
    "clusterState": "RUNNING",
    "trinoUri": "https://analytics.trino.galaxy.starburst.io"
}"#;

#[tokio::test]
async fn create_reads_back_the_server_record() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let create = server
        .mock("POST", "/public/api/v1/cluster")
        .match_header("authorization", "Bearer tok")
        .match_body(Matcher::PartialJson(json!({
            "name": "analytics",
            "cloudRegionId": "aws-us-east1",
            "minWorkers": 1,
            "maxWorkers": 4,
            "resultCacheEnabled": true,
            "resultCacheDefaultVisibilitySeconds": 3600
        })))
        .with_status(200)
        .with_body(CLUSTER_BODY)
        .create_async()
        .await;

    let resource = resource(&server, CLUSTER).await;
    let response = resource
        .create(Context::new(), create_request(CLUSTER, planned_cluster()))
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.new_state;
    assert_eq!(string_at(&state, "cluster_id"), "w-1");
    assert_eq!(string_at(&state, "cluster_state"), "RUNNING");
    assert_eq!(
        state
            .get_number(&AttributePath::new("result_cache_default_visibility_seconds"))
            .unwrap(),
        3600.0
    );
    assert_eq!(
        state.get_number(&AttributePath::new("max_workers")).unwrap(),
        4.0
    );
    // not returned by the server, so null rather than unknown
    assert_eq!(
        state.get(&AttributePath::new("processing_mode")),
        Some(&Dynamic::Null)
    );
    assert_eq!(
        state.get(&AttributePath::new("catalog_refs")),
        Some(&Dynamic::List(vec![]))
    );
    create.assert_async().await;
}

#[tokio::test]
async fn requested_warpspeed_omitted_by_server_folds_to_null() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let create = server
        .mock("POST", "/public/api/v1/cluster")
        .match_body(Matcher::PartialJson(json!({ "processingMode": "WarpSpeed" })))
        .with_body(CLUSTER_BODY)
        .create_async()
        .await;

    let mut planned = planned_cluster();
    planned
        .set_string(&AttributePath::new("processing_mode"), "WarpSpeed".to_string())
        .unwrap();
    let resource = resource(&server, CLUSTER).await;
    let response = resource
        .create(Context::new(), create_request(CLUSTER, planned))
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response
            .new_state
            .get(&AttributePath::new("processing_mode")),
        Some(&Dynamic::Null)
    );
    create.assert_async().await;
}

#[tokio::test]
async fn read_of_deleted_cluster_drops_it_from_state() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _gone = server
        .mock("GET", "/public/api/v1/cluster/w-1")
        .with_status(404)
        .with_body(r#"{"message":"cluster not found"}"#)
        .create_async()
        .await;

    let resource = resource(&server, CLUSTER).await;
    let response = resource
        .read(
            Context::new(),
            read_request(CLUSTER, state(&[("cluster_id", s("w-1"))])),
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert!(response.new_state.is_none());
}

#[tokio::test]
async fn read_failure_keeps_state_and_reports() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _denied = server
        .mock("GET", "/public/api/v1/cluster/w-1")
        .with_status(403)
        .with_body(r#"{"message":"forbidden"}"#)
        .create_async()
        .await;

    let resource = resource(&server, CLUSTER).await;
    let current = state(&[("cluster_id", s("w-1"))]);
    let response = resource
        .read(Context::new(), read_request(CLUSTER, current.clone()))
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Failed to read cluster");
    assert!(response.diagnostics[0].detail.contains("w-1"));
    assert_eq!(response.new_state, Some(current));
}

#[tokio::test]
async fn update_patches_and_refolds() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let patch = server
        .mock("PATCH", "/public/api/v1/cluster/w-1")
        .match_body(Matcher::PartialJson(json!({ "maxWorkers": 8 })))
        .with_body(CLUSTER_BODY.replace("\"maxWorkers\": 4.0", "\"maxWorkers\": 8"))
        .create_async()
        .await;

    let resource = resource(&server, CLUSTER).await;
    let mut prior = planned_cluster();
    prior
        .set_string(&AttributePath::new("cluster_id"), "w-1".to_string())
        .unwrap();
    let mut planned = prior.clone();
    planned
        .set_number(&AttributePath::new("max_workers"), 8.0)
        .unwrap();

    let response = resource
        .update(Context::new(), update_request(CLUSTER, prior, planned))
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response
            .new_state
            .get_number(&AttributePath::new("max_workers"))
            .unwrap(),
        8.0
    );
    patch.assert_async().await;
}

#[tokio::test]
async fn update_with_empty_answer_reads_back() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _patch = server
        .mock("PATCH", "/public/api/v1/cluster/w-1")
        .with_status(204)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/public/api/v1/cluster/w-1")
        .with_body(CLUSTER_BODY)
        .expect(1)
        .create_async()
        .await;

    let resource = resource(&server, CLUSTER).await;
    let mut prior = planned_cluster();
    prior
        .set_string(&AttributePath::new("cluster_id"), "w-1".to_string())
        .unwrap();

    let response = resource
        .update(
            Context::new(),
            update_request(CLUSTER, prior.clone(), prior),
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        string_at(&response.new_state, "trino_uri"),
        "https://analytics.trino.galaxy.starburst.io"
    );
    get.assert_async().await;
}

#[tokio::test]
async fn update_of_deleted_cluster_is_an_error() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _gone = server
        .mock("PATCH", "/public/api/v1/cluster/w-1")
        .with_status(404)
        .create_async()
        .await;

    let resource = resource(&server, CLUSTER).await;
    let mut prior = planned_cluster();
    prior
        .set_string(&AttributePath::new("cluster_id"), "w-1".to_string())
        .unwrap();

    let response = resource
        .update(
            Context::new(),
            update_request(CLUSTER, prior.clone(), prior.clone()),
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0].detail.contains("no longer exists"));
    assert_eq!(response.new_state, prior);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let delete = server
        .mock("DELETE", "/public/api/v1/cluster/w-1")
        .with_status(404)
        .expect(2)
        .create_async()
        .await;

    let resource = resource(&server, CLUSTER).await;
    for _ in 0..2 {
        let response = resource
            .delete(
                Context::new(),
                delete_request(CLUSTER, state(&[("cluster_id", s("w-1"))])),
            )
            .await;
        assert!(response.diagnostics.is_empty());
    }
    delete.assert_async().await;
}

#[tokio::test]
async fn unreadable_create_response_still_records_the_id() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _create = server
        .mock("POST", "/public/api/v1/cluster")
        .with_body(r#"{"clusterId":"w-9","catalogRefs":5}"#)
        .create_async()
        .await;

    let resource = resource(&server, CLUSTER).await;
    let response = resource
        .create(Context::new(), create_request(CLUSTER, planned_cluster()))
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Failed to create cluster");
    assert_eq!(string_at(&response.new_state, "cluster_id"), "w-9");
    assert_eq!(
        response.new_state.get(&AttributePath::new("cluster_state")),
        Some(&Dynamic::Null)
    );
}

#[tokio::test]
async fn cancelled_context_skips_the_call() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let create = server
        .mock("POST", "/public/api/v1/cluster")
        .expect(0)
        .create_async()
        .await;

    let resource = resource(&server, CLUSTER).await;
    let ctx = Context::new();
    ctx.cancel();
    let response = resource
        .create(ctx, create_request(CLUSTER, planned_cluster()))
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0].detail.contains("cancelled"));
    assert!(response.new_state.is_null());
    create.assert_async().await;
}

#[tokio::test]
async fn invalid_worker_range_fails_validation() {
    let server = Server::new_async().await;
    let resource = resource(&server, CLUSTER).await;
    let mut config = planned_cluster();
    config
        .set_number(&AttributePath::new("min_workers"), 5.0)
        .unwrap();

    let response = resource
        .validate(
            Context::new(),
            tfplug::resource::ValidateResourceConfigRequest {
                type_name: CLUSTER.to_string(),
                config,
                client_capabilities: Default::default(),
            },
        )
        .await;

    assert!(response
        .diagnostics
        .iter()
        .any(|d| d.summary == "Invalid worker range"));
}
