//! Service accounts and their passwords

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::Client;
use super::common::entity_path;
use super::error::ApiError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_role_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_initial_password: Option<bool>,
    /// Present only in the create response
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(skip_serializing)]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountPassword {
    #[serde(skip_serializing)]
    pub service_account_password_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Present only in the create response
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(skip_serializing)]
    pub password_prefix: Option<String>,
    #[serde(skip_serializing)]
    pub created: Option<String>,
}

pub struct ServiceAccountsApi<'a> {
    client: &'a Client,
}

impl<'a> ServiceAccountsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn passwords_path(service_account_id: &str) -> String {
        format!("{}/password", entity_path("serviceAccount", service_account_id))
    }

    fn password_path(service_account_id: &str, password_id: &str) -> String {
        entity_path(&Self::passwords_path(service_account_id), password_id)
    }

    pub async fn create_password(
        &self,
        service_account_id: &str,
        request: &ServiceAccountPassword,
    ) -> Result<ServiceAccountPassword, ApiError> {
        debug!(service_account_id, "creating service account password");
        self.client
            .post(&Self::passwords_path(service_account_id), request)
            .await
    }

    pub async fn get_password(
        &self,
        service_account_id: &str,
        password_id: &str,
    ) -> Result<ServiceAccountPassword, ApiError> {
        self.client
            .get(&Self::password_path(service_account_id, password_id))
            .await
    }

    /// Deleting an already deleted password succeeds
    pub async fn delete_password(
        &self,
        service_account_id: &str,
        password_id: &str,
    ) -> Result<(), ApiError> {
        match self
            .client
            .delete(&Self::password_path(service_account_id, password_id))
            .await
        {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }
}
