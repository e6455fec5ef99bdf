//! Salla endpoint catalog
//!
//! Each [`Endpoint`] resolves to an HTTP method and an absolute URL against
//! the configured API and accounts base URLs.

use std::fmt;

use reqwest::Method;
use serde_json::{json, Value};

/// Default merchant API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.salla.dev/admin/v2";

/// Order status slug sent by [`Endpoint::CancelOrder`]
pub const CANCELED_SLUG: &str = "canceled";

/// Order status slug sent by [`Endpoint::RefundOrder`]
pub const RESTORED_SLUG: &str = "restored";

/// Base URLs the catalog resolves against (no trailing slash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrls {
    pub api: String,
    pub accounts: String,
}

impl BaseUrls {
    /// Build from raw URLs, trimming trailing slashes
    #[must_use]
    pub fn new(api: impl Into<String>, accounts: impl Into<String>) -> Self {
        Self {
            api: api.into().trim_end_matches('/').to_string(),
            accounts: accounts.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, salla_auth::types::DEFAULT_ACCOUNTS_URL)
    }
}

/// Every remote resource the facade can reach
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    ResourceOwner,
    Orders,
    CreateOrder,
    Customers,
    ProductBySku(String),
    Branches,
    BulkQuantities,
    CancelOrder(String),
    RefundOrder(String),
    OrderTags(String),
}

impl Endpoint {
    /// Move `order_id` to the `canceled` status
    #[must_use]
    pub fn cancel_order(order_id: impl fmt::Display) -> Self {
        Self::CancelOrder(order_id.to_string())
    }

    /// Move `order_id` to the `restored` status
    #[must_use]
    pub fn refund_order(order_id: impl fmt::Display) -> Self {
        Self::RefundOrder(order_id.to_string())
    }

    /// Tag list of `order_id`
    #[must_use]
    pub fn order_tags(order_id: impl fmt::Display) -> Self {
        Self::OrderTags(order_id.to_string())
    }

    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::ResourceOwner
            | Self::Orders
            | Self::Customers
            | Self::ProductBySku(_)
            | Self::Branches => Method::GET,
            Self::CreateOrder
            | Self::BulkQuantities
            | Self::CancelOrder(_)
            | Self::RefundOrder(_)
            | Self::OrderTags(_) => Method::POST,
        }
    }

    /// Absolute URL of this endpoint
    ///
    /// Path segments supplied by the caller (SKU, order id) are
    /// percent-encoded.
    #[must_use]
    pub fn url(&self, base: &BaseUrls) -> String {
        let api = &base.api;
        match self {
            Self::ResourceOwner => format!("{}/oauth2/user/info", base.accounts),
            Self::Orders | Self::CreateOrder => format!("{api}/orders"),
            Self::Customers => format!("{api}/customers"),
            Self::ProductBySku(sku) => format!("{api}/products/sku/{}", urlencoding::encode(sku)),
            Self::Branches => format!("{api}/branches"),
            Self::BulkQuantities => format!("{api}/products/quantities/bulkSkus"),
            Self::CancelOrder(id) | Self::RefundOrder(id) => {
                format!("{api}/orders/{}/status", urlencoding::encode(id))
            }
            Self::OrderTags(id) => format!("{api}/orders/{}/tags", urlencoding::encode(id)),
        }
    }

    /// Body the endpoint always sends, independent of the caller
    #[must_use]
    pub fn fixed_body(&self) -> Option<Value> {
        match self {
            Self::CancelOrder(_) => Some(json!({ "slug": CANCELED_SLUG })),
            Self::RefundOrder(_) => Some(json!({ "slug": RESTORED_SLUG })),
            _ => None,
        }
    }
}
