use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Address, AddressLabel};

/// Body for both creating and replacing an address.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddressRequest {
    pub label: AddressLabel,
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 120))]
    pub full_name: String,
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 40))]
    pub phone: String,
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 200))]
    pub line1: String,
    #[validate(length(max = 200))]
    pub line2: Option<String>,
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 100))]
    pub city: String,
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 20))]
    pub postal_code: String,
    #[validate(length(max = 500))]
    pub instructions: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AddressList {
    #[schema(value_type = Vec<Address>)]
    pub items: Vec<Address>,
}
