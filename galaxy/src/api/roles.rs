//! Roles and the role grant list

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::Client;
use super::common::entity_path;
use super::error::ApiError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only meaningful on create; never echoed back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_to_creating_role: Option<bool>,
    #[serde(skip_serializing)]
    pub owner_role_id: Option<String>,
}

/// One element of a role's `directlyGrantedRoles` list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleGrant {
    /// The granted role, not the parent
    pub role_id: String,
    #[serde(default)]
    pub role_name: String,
    #[serde(default)]
    pub admin_option: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GrantList {
    #[serde(default)]
    directly_granted_roles: Vec<RoleGrant>,
}

pub struct RolesApi<'a> {
    client: &'a Client,
}

impl<'a> RolesApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, role_id: &str) -> Result<Role, ApiError> {
        self.client.get(&entity_path("role", role_id)).await
    }

    /// Name of a role, needed when building grant elements
    pub async fn role_name(&self, role_id: &str) -> Result<String, ApiError> {
        let path = entity_path("role", role_id);
        let role = self.get(role_id).await?;
        role.role_name.ok_or(ApiError::Mapping {
            method: "GET".to_string(),
            path,
            message: "response has no roleName".to_string(),
        })
    }

    /// Current grant list of a role, in server order
    pub async fn grants(&self, role_id: &str) -> Result<Vec<RoleGrant>, ApiError> {
        let list: GrantList = self.client.get(&entity_path("role", role_id)).await?;
        Ok(list.directly_granted_roles)
    }

    /// Replaces the full grant list of a role
    pub async fn set_grants(&self, role_id: &str, grants: &[RoleGrant]) -> Result<(), ApiError> {
        debug!(role_id, count = grants.len(), "writing role grant list");
        let body = GrantList {
            directly_granted_roles: grants.to_vec(),
        };
        let _: serde_json::Value = self
            .client
            .patch(&entity_path("role", role_id), &body)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn grants_default_to_empty_list() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/oauth/v2/token")
            .with_body(r#"{"access_token":"tok"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/public/api/v1/role/r-1")
            .with_body(r#"{"roleId":"r-1","roleName":"parent"}"#)
            .create_async()
            .await;
        let client =
            Client::with_config(&server.url(), "id", "secret", ClientConfig::default()).unwrap();

        assert!(client.roles().grants("r-1").await.unwrap().is_empty());
        assert_eq!(client.roles().role_name("r-1").await.unwrap(), "parent");
    }

    #[tokio::test]
    async fn set_grants_patches_full_list() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/oauth/v2/token")
            .with_body(r#"{"access_token":"tok"}"#)
            .create_async()
            .await;
        let mock = server
            .mock("PATCH", "/public/api/v1/role/r-1")
            .match_body(Matcher::Json(serde_json::json!({
                "directlyGrantedRoles": [
                    {"roleId": "r-2", "roleName": "child", "adminOption": false},
                    {"roleId": "r-3", "roleName": "other", "adminOption": true}
                ]
            })))
            .with_status(204)
            .create_async()
            .await;
        let client =
            Client::with_config(&server.url(), "id", "secret", ClientConfig::default()).unwrap();

        let grants = vec![
            RoleGrant {
                role_id: "r-2".to_string(),
                role_name: "child".to_string(),
                admin_option: false,
            },
            RoleGrant {
                role_id: "r-3".to_string(),
                role_name: "other".to_string(),
                admin_option: true,
            },
        ];
        client.roles().set_grants("r-1", &grants).await.unwrap();
        mock.assert_async().await;
    }
}
