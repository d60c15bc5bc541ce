//! Role grants edit one element of the parent's grant list. The mock keeps
//! the parent's list the way Galaxy would, so every test can check what
//! the server ends up holding.

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

mod common;

use common::*;
use mockito::{Mock, Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tfplug::context::Context;
use tfplug::resource::{ImportResourceStateRequest, Resource, ResourceWithImportState};
use tfplug::types::{AttributePath, ClientCapabilities, Dynamic, DynamicValue};

const GRANT: &str = "galaxy_role_grant";

/// Parent role `r-parent` whose grant list lives in `grants`
struct ParentRole {
    grants: Arc<Mutex<Value>>,
    patches: Arc<Mutex<usize>>,
    _mocks: Vec<Mock>,
}

impl ParentRole {
    async fn serve(server: &mut ServerGuard, initial: Value) -> Self {
        let grants = Arc::new(Mutex::new(initial));
        let patches = Arc::new(Mutex::new(0));

        let read = grants.clone();
        let get = server
            .mock("GET", "/public/api/v1/role/r-parent")
            .with_body_from_request(move |_| {
                let grants = read.lock().unwrap().clone();
                json!({
                    "roleId": "r-parent",
                    "roleName": "parent",
                    "directlyGrantedRoles": grants,
                })
                .to_string()
                .into_bytes()
            })
            .create_async()
            .await;

        let write = grants.clone();
        let count = patches.clone();
        let patch = server
            .mock("PATCH", "/public/api/v1/role/r-parent")
            .with_body_from_request(move |request| {
                let body: Value = serde_json::from_slice(request.body().unwrap()).unwrap();
                *write.lock().unwrap() = body["directlyGrantedRoles"].clone();
                *count.lock().unwrap() += 1;
                b"{}".to_vec()
            })
            .create_async()
            .await;

        let child = server
            .mock("GET", "/public/api/v1/role/r-child")
            .with_body(r#"{"roleId":"r-child","roleName":"child"}"#)
            .create_async()
            .await;

        Self {
            grants,
            patches,
            _mocks: vec![get, patch, child],
        }
    }

    fn grants(&self) -> Value {
        self.grants.lock().unwrap().clone()
    }

    fn patches(&self) -> usize {
        *self.patches.lock().unwrap()
    }
}

fn planned_grant() -> DynamicValue {
    state(&[
        ("id", Dynamic::Unknown),
        ("role_id", s("r-parent")),
        ("granted_role_id", s("r-child")),
        ("admin_option", Dynamic::Bool(false)),
        ("granted_role_name", Dynamic::Unknown),
    ])
}

#[tokio::test]
async fn grant_is_added_then_removed() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let parent = ParentRole::serve(&mut server, json!([])).await;
    let resource = resource(&server, GRANT).await;

    let created = resource
        .create(Context::new(), create_request(GRANT, planned_grant()))
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    assert_eq!(string_at(&created.new_state, "id"), "r-parent/r-child");
    assert_eq!(string_at(&created.new_state, "granted_role_name"), "child");
    assert_eq!(
        parent.grants(),
        json!([{ "roleId": "r-child", "roleName": "child", "adminOption": false }])
    );

    let deleted = resource
        .delete(
            Context::new(),
            delete_request(GRANT, created.new_state.clone()),
        )
        .await;
    assert!(deleted.diagnostics.is_empty());
    assert_eq!(parent.grants(), json!([]));
}

#[tokio::test]
async fn unrelated_grants_survive() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let other = json!({ "roleId": "r-other", "roleName": "other", "adminOption": true });
    let parent = ParentRole::serve(&mut server, json!([other.clone()])).await;
    let resource = resource(&server, GRANT).await;

    let created = resource
        .create(Context::new(), create_request(GRANT, planned_grant()))
        .await;
    assert!(created.diagnostics.is_empty());
    assert_eq!(parent.grants().as_array().unwrap().len(), 2);

    resource
        .delete(Context::new(), delete_request(GRANT, created.new_state))
        .await;
    assert_eq!(parent.grants(), json!([other]));
}

#[tokio::test]
async fn existing_grant_is_a_conflict() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let parent = ParentRole::serve(
        &mut server,
        json!([{ "roleId": "r-child", "roleName": "child", "adminOption": false }]),
    )
    .await;
    let resource = resource(&server, GRANT).await;

    let response = resource
        .create(Context::new(), create_request(GRANT, planned_grant()))
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0].detail.contains("already granted"));
    assert!(response.new_state.is_null());
    assert_eq!(parent.patches(), 0);
}

#[tokio::test]
async fn grant_written_but_not_confirmed_stays_in_state() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let patched = Arc::new(Mutex::new(false));

    let seen = patched.clone();
    let _get = server
        .mock("GET", "/public/api/v1/role/r-parent")
        .with_body_from_request(move |_| {
            if *seen.lock().unwrap() {
                b"<html>upstream reset</html>".to_vec()
            } else {
                br#"{"roleId":"r-parent","roleName":"parent","directlyGrantedRoles":[]}"#.to_vec()
            }
        })
        .create_async()
        .await;
    let flag = patched.clone();
    let patch = server
        .mock("PATCH", "/public/api/v1/role/r-parent")
        .with_status(204)
        .with_body_from_request(move |_| {
            *flag.lock().unwrap() = true;
            vec![]
        })
        .expect(1)
        .create_async()
        .await;
    let _child = server
        .mock("GET", "/public/api/v1/role/r-child")
        .with_body(r#"{"roleId":"r-child","roleName":"child"}"#)
        .create_async()
        .await;
    let resource = resource(&server, GRANT).await;

    let response = resource
        .create(Context::new(), create_request(GRANT, planned_grant()))
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0].detail.contains("r-parent/r-child"));
    assert_eq!(string_at(&response.new_state, "id"), "r-parent/r-child");
    assert_eq!(string_at(&response.new_state, "granted_role_id"), "r-child");
    assert_eq!(
        response.new_state.get(&AttributePath::new("granted_role_name")),
        Some(&Dynamic::Null)
    );
    patch.assert_async().await;
}

#[tokio::test]
async fn removing_an_absent_grant_writes_nothing() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let parent = ParentRole::serve(&mut server, json!([])).await;
    let resource = resource(&server, GRANT).await;

    let response = resource
        .delete(
            Context::new(),
            delete_request(
                GRANT,
                state(&[
                    ("id", s("r-parent/r-child")),
                    ("role_id", s("r-parent")),
                    ("granted_role_id", s("r-child")),
                ]),
            ),
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert_eq!(parent.patches(), 0);
}

#[tokio::test]
async fn read_of_revoked_grant_drops_it() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _parent = ParentRole::serve(&mut server, json!([])).await;
    let resource = resource(&server, GRANT).await;

    let response = resource
        .read(
            Context::new(),
            read_request(
                GRANT,
                state(&[("role_id", s("r-parent")), ("granted_role_id", s("r-child"))]),
            ),
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert!(response.new_state.is_none());
}

#[tokio::test]
async fn concurrent_grants_on_one_parent_are_not_lost() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let parent = ParentRole::serve(&mut server, json!([])).await;
    let _second_child = server
        .mock("GET", "/public/api/v1/role/r-second")
        .with_body(r#"{"roleId":"r-second","roleName":"second"}"#)
        .create_async()
        .await;
    let resource = Arc::new(resource(&server, GRANT).await);

    let mut second = planned_grant();
    second
        .set_string(
            &AttributePath::new("granted_role_id"),
            "r-second".to_string(),
        )
        .unwrap();

    let (a, b) = tokio::join!(
        resource.create(Context::new(), create_request(GRANT, planned_grant())),
        resource.create(Context::new(), create_request(GRANT, second)),
    );
    assert!(a.diagnostics.is_empty(), "{:?}", a.diagnostics);
    assert!(b.diagnostics.is_empty(), "{:?}", b.diagnostics);
    assert_eq!(parent.grants().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn import_splits_the_compound_id_and_reads() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _parent = ParentRole::serve(
        &mut server,
        json!([{ "roleId": "r-child", "roleName": "child", "adminOption": true }]),
    )
    .await;
    let resource = resource(&server, GRANT).await;

    let imported = resource
        .as_import_state()
        .unwrap()
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: GRANT.to_string(),
                id: "r-parent/r-child".to_string(),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(imported.diagnostics.is_empty());
    let imported_state = imported.imported_resources[0].state.clone();
    assert_eq!(string_at(&imported_state, "role_id"), "r-parent");

    let read = resource
        .read(Context::new(), read_request(GRANT, imported_state))
        .await;
    let state = read.new_state.unwrap();
    assert_eq!(string_at(&state, "id"), "r-parent/r-child");
    assert!(state.get_bool(&AttributePath::new("admin_option")).unwrap());
}

#[tokio::test]
async fn import_rejects_a_single_part_id() {
    let server = Server::new_async().await;
    let resource = resource(&server, GRANT).await;

    let imported = resource
        .as_import_state()
        .unwrap()
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: GRANT.to_string(),
                id: "r-parent".to_string(),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert_eq!(imported.diagnostics.len(), 1);
    assert!(imported.imported_resources.is_empty());
}
