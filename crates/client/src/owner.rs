//! Typed view over the user-info payload

use salla_auth::Principal;
use serde_json::Value;

/// Resource owner as returned by `GET /oauth2/user/info`
///
/// Wraps the raw `data` payload and exposes the fixed nested paths. A path
/// the payload lacks reads as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceOwner {
    principal: Principal,
    raw: Value,
}

impl ResourceOwner {
    #[must_use]
    pub fn from_data(raw: Value) -> Self {
        Self { principal: Principal::from_user_info(&raw), raw }
    }

    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.principal.id.as_ref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.principal.name.as_deref()
    }

    /// `store.id`
    #[deprecated(note = "Salla exposes the merchant as the stable identity; use `merchant_id`")]
    #[must_use]
    pub fn store_id(&self) -> Option<&Value> {
        self.principal.store_id.as_ref()
    }

    /// `store.name`
    #[deprecated(note = "Salla exposes the merchant as the stable identity; use `merchant_name`")]
    #[must_use]
    pub fn store_name(&self) -> Option<&str> {
        self.principal.store_name.as_deref()
    }

    /// `merchant.id`
    #[must_use]
    pub fn merchant_id(&self) -> Option<&Value> {
        self.principal.merchant_id.as_ref()
    }

    /// `merchant.name`
    #[must_use]
    pub fn merchant_name(&self) -> Option<&str> {
        self.principal.merchant_name.as_deref()
    }

    /// The projected principal
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Untouched `data` payload
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    #[must_use]
    pub fn into_raw(self) -> Value {
        self.raw
    }
}

impl From<ResourceOwner> for Principal {
    fn from(owner: ResourceOwner) -> Self {
        owner.principal
    }
}
