#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

mod common;

use common::*;
use mockito::{Matcher, Server};
use serde_json::json;
use tfplug::context::Context;
use tfplug::resource::{ImportResourceStateRequest, Resource, ResourceWithImportState};
use tfplug::types::{AttributePath, ClientCapabilities, Dynamic};

const PASSWORD: &str = "galaxy_service_account_password";

#[tokio::test]
async fn generated_password_survives_later_reads() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _create = server
        .mock("POST", "/public/api/v1/serviceAccount/sa-1/password")
        .match_body(Matcher::Json(json!({ "description": "ci" })))
        .with_body(
            r#"{"serviceAccountPasswordId":"pw-1","description":"ci","password":"s3cret","passwordPrefix":"s3c","created":"2024-05-01T00:00:00Z"}"#,
        )
        .create_async()
        .await;
    let _get = server
        .mock("GET", "/public/api/v1/serviceAccount/sa-1/password/pw-1")
        .with_body(
            r#"{"serviceAccountPasswordId":"pw-1","description":"ci","passwordPrefix":"s3c","created":"2024-05-01T00:00:00Z"}"#,
        )
        .create_async()
        .await;

    let resource = resource(&server, PASSWORD).await;
    let created = resource
        .create(
            Context::new(),
            create_request(
                PASSWORD,
                state(&[
                    ("service_account_password_id", Dynamic::Unknown),
                    ("service_account_id", s("sa-1")),
                    ("description", s("ci")),
                    ("password", Dynamic::Unknown),
                    ("password_prefix", Dynamic::Unknown),
                    ("created", Dynamic::Unknown),
                ]),
            ),
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    assert_eq!(string_at(&created.new_state, "password"), "s3cret");

    let read = resource
        .read(Context::new(), read_request(PASSWORD, created.new_state.clone()))
        .await;
    assert!(read.diagnostics.is_empty());
    assert_eq!(read.new_state, Some(created.new_state));
}

#[tokio::test]
async fn import_by_compound_id_then_read_is_stable() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let get = server
        .mock("GET", "/public/api/v1/serviceAccount/sa-1/password/pw-1")
        .with_body(
            r#"{"serviceAccountPasswordId":"pw-1","description":"ci","passwordPrefix":"s3c","created":"2024-05-01T00:00:00Z"}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let resource = resource(&server, PASSWORD).await;
    let imported = resource
        .as_import_state()
        .unwrap()
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: PASSWORD.to_string(),
                id: "sa-1/pw-1".to_string(),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(imported.diagnostics.is_empty());
    let imported_state = imported.imported_resources[0].state.clone();
    assert_eq!(string_at(&imported_state, "service_account_id"), "sa-1");
    assert_eq!(
        string_at(&imported_state, "service_account_password_id"),
        "pw-1"
    );

    let first = resource
        .read(Context::new(), read_request(PASSWORD, imported_state))
        .await
        .new_state
        .unwrap();
    assert_eq!(string_at(&first, "password_prefix"), "s3c");

    let second = resource
        .read(Context::new(), read_request(PASSWORD, first.clone()))
        .await;
    assert!(second.diagnostics.is_empty());
    assert_eq!(second.new_state, Some(first));
    get.assert_async().await;
}

#[tokio::test]
async fn deleting_a_deleted_password_succeeds() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _delete = server
        .mock("DELETE", "/public/api/v1/serviceAccount/sa-1/password/pw-1")
        .with_status(404)
        .create_async()
        .await;

    let resource = resource(&server, PASSWORD).await;
    let response = resource
        .delete(
            Context::new(),
            delete_request(
                PASSWORD,
                state(&[
                    ("service_account_id", s("sa-1")),
                    ("service_account_password_id", s("pw-1")),
                ]),
            ),
        )
        .await;
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn masked_password_echo_never_replaces_the_secret() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _get = server
        .mock("GET", "/public/api/v1/serviceAccount/sa-1/password/pw-1")
        .with_body(
            r#"{"serviceAccountPasswordId":"pw-1","description":"ci","password":"********","passwordPrefix":"s3c","created":"2024-05-01T00:00:00Z"}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let resource = resource(&server, PASSWORD).await;
    let read = resource
        .read(
            Context::new(),
            read_request(
                PASSWORD,
                state(&[
                    ("service_account_password_id", s("pw-1")),
                    ("service_account_id", s("sa-1")),
                    ("description", s("ci")),
                    ("password", s("s3cret")),
                ]),
            ),
        )
        .await;
    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    assert_eq!(string_at(&read.new_state.unwrap(), "password"), "s3cret");

    // nothing to preserve after an import; the mask must not stand in
    let imported = resource
        .read(
            Context::new(),
            read_request(
                PASSWORD,
                state(&[
                    ("service_account_password_id", s("pw-1")),
                    ("service_account_id", s("sa-1")),
                ]),
            ),
        )
        .await
        .new_state
        .unwrap();
    assert_eq!(
        imported.get(&AttributePath::new("password")),
        Some(&Dynamic::Null)
    );
}
