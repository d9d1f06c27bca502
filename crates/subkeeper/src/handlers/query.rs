//! Query-string parameters shared by the API handlers.
//!
//! Every field is taken as an optional string so that malformed values are
//! reported as validation errors with the field name, and empty values count
//! as absent.

use serde::Deserialize;
use uuid::Uuid;

use subkeeper_core::billing::{BillingFilter, BillingWindow};
use subkeeper_core::domain::ValidationError;
use subkeeper_core::pagination::{LimitPolicy, PageRequest};
use subkeeper_core::serde::deserialize_optional_string;

/// `?limit=&created_at=&id=` on every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub limit: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub id: Option<String>,
}

impl ListParams {
    pub fn page_request(&self, policy: &LimitPolicy) -> Result<PageRequest, ValidationError> {
        PageRequest::from_params(
            self.limit.as_deref(),
            self.created_at.as_deref(),
            self.id.as_deref(),
            policy,
        )
    }
}

/// `?from=MM-YYYY&to=MM-YYYY[&user_id=][&service_name=]`.
#[derive(Debug, Default, Deserialize)]
pub struct TotalParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub service_name: Option<String>,
}

impl TotalParams {
    pub fn into_filter(self) -> Result<BillingFilter, ValidationError> {
        let from = self.from.ok_or(ValidationError::Missing("from"))?;
        let to = self.to.ok_or(ValidationError::Missing("to"))?;
        let mut filter = BillingFilter::new(BillingWindow::from_months(&from, &to)?);

        if let Some(user_id) = self.user_id {
            let user_id = Uuid::parse_str(user_id.trim()).map_err(|_| {
                ValidationError::InvalidValue {
                    field: "user_id",
                    value: user_id.clone(),
                }
            })?;
            filter = filter.with_user(user_id);
        }
        if let Some(service_name) = self.service_name {
            filter = filter.with_service_name(service_name);
        }
        Ok(filter)
    }
}

/// `?email=` for the user lookup by address.
#[derive(Debug, Default, Deserialize)]
pub struct EmailParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
}

impl EmailParams {
    pub fn email(&self) -> Result<&str, ValidationError> {
        self.email.as_deref().ok_or(ValidationError::Missing("email"))
    }
}
