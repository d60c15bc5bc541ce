//! `galaxy_service_account_password`
//!
//! Passwords live under their service account, so this adapter talks to the
//! nested endpoints directly. The secret is only ever returned by create.

use async_trait::async_trait;
use tfplug::plan_modifier::RequiresReplace;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;
use tracing::debug;

use super::adapter::{EntityAdapter, EntityDescriptor};
use super::attributes::identity;
use super::fold::{PlanReader, StateBuilder};
use crate::api::service_accounts::ServiceAccountPassword;
use crate::api::ApiError;
use crate::error::GalaxyError;
use crate::provider_data::GalaxyProviderData;

#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceAccountPasswordAdapter;

impl ServiceAccountPasswordAdapter {
    fn fold(&self, service_account_id: &str, password: ServiceAccountPassword) -> DynamicValue {
        StateBuilder::new()
            .string(
                "service_account_password_id",
                password.service_account_password_id.as_deref(),
            )
            .string("service_account_id", Some(service_account_id))
            .string("description", password.description.as_deref())
            .string("password", password.password.as_deref())
            .string("password_prefix", password.password_prefix.as_deref())
            .string("created", password.created.as_deref())
            .build()
    }
}

impl EntityDescriptor for ServiceAccountPasswordAdapter {
    fn type_name(&self) -> String {
        "galaxy_service_account_password".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an additional password of a service account")
            .attribute(identity(
                "service_account_password_id",
                "Server-assigned password identifier",
            ))
            .attribute(
                AttributeBuilder::new("service_account_id", AttributeType::String)
                    .description("Service account the password belongs to")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("What the password is used for")
                    .optional()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("The generated password; only available right after creation")
                    .computed()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password_prefix", AttributeType::String)
                    .description("Leading characters of the password, for identification")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created", AttributeType::String)
                    .description("Creation timestamp")
                    .computed()
                    .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "service_account_password_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["password"]
    }

    fn import_attributes(&self) -> Vec<&'static str> {
        vec!["service_account_id", "service_account_password_id"]
    }
}

#[async_trait]
impl EntityAdapter for ServiceAccountPasswordAdapter {
    async fn create(
        &self,
        data: &GalaxyProviderData,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        let reader = PlanReader::new(plan);
        let service_account_id = reader.required_string("service_account_id")?;
        let request = ServiceAccountPassword {
            description: reader.string("description"),
            ..Default::default()
        };

        let created = data
            .client
            .service_accounts()
            .create_password(&service_account_id, &request)
            .await?;
        if created.service_account_password_id.is_none() {
            return Err(ApiError::Mapping {
                method: "POST".to_string(),
                path: format!("serviceAccount/{}/password", service_account_id),
                message: "response has no serviceAccountPasswordId".to_string(),
            }
            .into());
        }
        debug!(service_account_id = %service_account_id, "service account password created");
        Ok(self.fold(&service_account_id, created))
    }

    async fn read(
        &self,
        data: &GalaxyProviderData,
        state: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        let reader = PlanReader::new(state);
        let service_account_id = reader.required_string("service_account_id")?;
        let password_id = reader.required_string("service_account_password_id")?;

        let mut password = data
            .client
            .service_accounts()
            .get_password(&service_account_id, &password_id)
            .await?;
        password
            .service_account_password_id
            .get_or_insert(password_id);
        Ok(self.fold(&service_account_id, password))
    }

    async fn update(
        &self,
        _data: &GalaxyProviderData,
        _plan: &DynamicValue,
        _prior: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        Err(GalaxyError::Configuration(
            "service account passwords cannot be changed in place; every attribute forces replacement"
                .to_string(),
        ))
    }

    async fn delete(
        &self,
        data: &GalaxyProviderData,
        state: &DynamicValue,
    ) -> Result<(), GalaxyError> {
        let reader = PlanReader::new(state);
        let service_account_id = reader.required_string("service_account_id")?;
        let password_id = reader.required_string("service_account_password_id")?;

        data.client
            .service_accounts()
            .delete_password(&service_account_id, &password_id)
            .await?;
        Ok(())
    }
}
