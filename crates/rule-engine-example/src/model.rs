use rule_engine::RuleEngineRequest;
use serde::{Deserialize, Serialize};

use crate::error::{PlaceOrderError, ValidationError};

/// Request parameter keys shared by the order workflow's rules.
pub mod keys {
    pub const CUSTOMER_NAME: &str = "customerName";
    pub const CUSTOMER_EMAIL: &str = "customerEmail";
    pub const CUSTOMER_PHONE_NUMBER: &str = "customerPhoneNumber";
    pub const CUSTOMER_ADDRESS: &str = "customerAddress";
    pub const CUSTOMER_ITEMS: &str = "customerItems";
    pub const CUSTOMER_ID: &str = "customerId";
    pub const ORDER_ID: &str = "orderId";
    pub const FAIL_AT: &str = "failAt";
}

/// A customer placing an order, as submitted by a client.
///
/// Every field is optional on the wire so that [`validate`](Self::validate)
/// can report which required one is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerOrderPostModel {
    pub name: String,
    pub address: Option<CustomerOrderAddressPostModel>,
    pub items: Option<Vec<CustomerOrderItemPostModel>>,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerOrderAddressPostModel {
    pub complete_address: String,
    pub landmark: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerOrderItemPostModel {
    pub item_id: Option<i32>,
    pub quantity: f64,
}

impl CustomerOrderPostModel {
    /// Check that every required field is present and not blank.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, in declaration order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        let address = self
            .address
            .as_ref()
            .ok_or(ValidationError::MissingField("address"))?;
        require("address.complete_address", &address.complete_address)?;
        let items = self
            .items
            .as_ref()
            .ok_or(ValidationError::MissingField("items"))?;
        if let Some(index) = items.iter().position(|item| item.item_id.is_none()) {
            return Err(ValidationError::MissingItemId { index });
        }
        require("email", &self.email)?;
        require("phone_number", &self.phone_number)?;
        Ok(())
    }

    /// Validate the order and map it onto the request parameters the
    /// workflow's rules read.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::Validation` if a required field is missing.
    pub fn to_request(&self) -> Result<RuleEngineRequest, PlaceOrderError> {
        self.validate()?;

        let mut request = RuleEngineRequest::new();
        request.insert(keys::CUSTOMER_NAME, self.name.as_str());
        request.insert(keys::CUSTOMER_EMAIL, self.email.as_str());
        request.insert(keys::CUSTOMER_PHONE_NUMBER, self.phone_number.as_str());
        request
            .insert_serialized(keys::CUSTOMER_ADDRESS, &self.address)
            .map_err(PlaceOrderError::Request)?;
        request
            .insert_serialized(keys::CUSTOMER_ITEMS, &self.items)
            .map_err(PlaceOrderError::Request)?;
        Ok(request)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}
