//! Resource endpoint facade
//!
//! One method per Salla endpoint. Each takes an optional token override;
//! `None` (or an empty string) uses the current access token.

use std::fmt;
use std::sync::Arc;

use salla_auth::CredentialState;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::endpoints::{BaseUrls, Endpoint};
use crate::errors::ApiError;
use crate::executor::RequestExecutor;
use crate::owner::ResourceOwner;
use crate::transport::HttpTransport;

/// Salla merchant API client
#[derive(Clone)]
pub struct SallaApi {
    executor: RequestExecutor,
    base: BaseUrls,
}

impl SallaApi {
    /// Create a client sending through `transport`
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<CredentialState>,
        base: BaseUrls,
    ) -> Self {
        Self { executor: RequestExecutor::new(transport, credentials), base }
    }

    #[must_use]
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    #[must_use]
    pub fn base_urls(&self) -> &BaseUrls {
        &self.base
    }

    /// Call `endpoint` with an explicit body (falls back to the endpoint's
    /// fixed body)
    ///
    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn call(
        &self,
        endpoint: Endpoint,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let body = body.or_else(|| endpoint.fixed_body());
        let url = endpoint.url(&self.base);
        self.executor.execute(endpoint.method(), &url, body.as_ref(), token).await
    }

    async fn call_with<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body).map_err(ApiError::InvalidBody)?;
        self.call(endpoint, Some(body), token).await
    }

    /// Details of the authorized merchant user
    ///
    /// Without a token override the result also becomes the principal of
    /// the current login.
    ///
    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn get_resource_owner(&self, token: Option<&str>) -> Result<ResourceOwner, ApiError> {
        let updates_principal = token.map_or(true, str::is_empty);
        let sent_token = self.executor.resolve_token(token);

        let data = self.call(Endpoint::ResourceOwner, None, Some(sent_token.as_str())).await?;
        let owner = ResourceOwner::from_data(data);

        if updates_principal {
            let credentials = self.executor.credentials();
            if credentials.set_principal_if(&sent_token, owner.principal().clone()) {
                debug!("Principal updated from resource owner");
            } else {
                debug!("Credentials changed during owner lookup; principal left as is");
            }
        }

        Ok(owner)
    }

    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn get_all_orders(&self, token: Option<&str>) -> Result<Value, ApiError> {
        self.call(Endpoint::Orders, None, token).await
    }

    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn get_all_customers(&self, token: Option<&str>) -> Result<Value, ApiError> {
        self.call(Endpoint::Customers, None, token).await
    }

    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn get_product_details(
        &self,
        sku: &str,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.call(Endpoint::ProductBySku(sku.to_string()), None, token).await
    }

    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn get_all_branches(&self, token: Option<&str>) -> Result<Value, ApiError> {
        self.call(Endpoint::Branches, None, token).await
    }

    /// Bulk-update product quantities by SKU
    ///
    /// `body` is sent as-is, e.g. `{"skus": [{"sku": "X", "quantity": 5}]}`.
    ///
    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn post_bulk_quantities<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.call_with(Endpoint::BulkQuantities, body, token).await
    }

    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn post_order<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.call_with(Endpoint::CreateOrder, body, token).await
    }

    /// Move an order to the `canceled` status
    ///
    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn cancel_order(
        &self,
        order_id: impl fmt::Display,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.call(Endpoint::cancel_order(order_id), None, token).await
    }

    /// Move an order to the `restored` status
    ///
    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn refund_order(
        &self,
        order_id: impl fmt::Display,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.call(Endpoint::refund_order(order_id), None, token).await
    }

    /// Attach tags to an order
    ///
    /// # Errors
    /// See [`RequestExecutor::execute`]
    pub async fn post_tag<B: Serialize + ?Sized>(
        &self,
        order_id: impl fmt::Display,
        body: &B,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.call_with(Endpoint::order_tags(order_id), body, token).await
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client.
    use reqwest::header::AUTHORIZATION;
    use reqwest::Method;
    use salla_auth::Principal;
    use serde_json::json;

    use super::*;
    use crate::errors::ApiErrorKind;
    use crate::testing::MockTransport;

    fn setup() -> (SallaApi, MockTransport, Arc<CredentialState>) {
        let transport = MockTransport::new();
        let credentials = Arc::new(CredentialState::new());
        credentials.set_login("tok1".to_string(), "ref1".to_string(), Some(3600), None);
        let api =
            SallaApi::new(Arc::new(transport.clone()), credentials.clone(), BaseUrls::default());
        (api, transport, credentials)
    }

    #[tokio::test]
    async fn test_get_all_orders_returns_data() {
        let (api, transport, _) = setup();
        transport.reply(r#"{"data":[{"id":1}]}"#);

        let orders = api.get_all_orders(None).await.unwrap();

        assert_eq!(orders, json!([{"id": 1}]));
        let request = transport.last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "https://api.salla.dev/admin/v2/orders");
        assert_eq!(request.headers[AUTHORIZATION], "Bearer tok1");
    }

    #[tokio::test]
    async fn test_cancel_order() {
        let (api, transport, _) = setup();

        api.cancel_order(42, None).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://api.salla.dev/admin/v2/orders/42/status");
        assert_eq!(request.body.as_deref(), Some(r#"{"slug":"canceled"}"#));
        assert_eq!(request.headers[AUTHORIZATION], "Bearer tok1");
    }

    #[tokio::test]
    async fn test_refund_order() {
        let (api, transport, _) = setup();

        api.refund_order("42", Some("override")).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.url, "https://api.salla.dev/admin/v2/orders/42/status");
        assert_eq!(request.body.as_deref(), Some(r#"{"slug":"restored"}"#));
        assert_eq!(request.headers[AUTHORIZATION], "Bearer override");
    }

    #[tokio::test]
    async fn test_caller_bodies_are_forwarded() {
        let (api, transport, _) = setup();

        api.post_bulk_quantities(&json!({"skus": [{"sku": "X", "quantity": 5}]}), None)
            .await
            .unwrap();
        api.post_order(&json!({"customer": {"id": 3}}), None).await.unwrap();
        api.post_tag(7, &json!({"tags": ["vip"]}), None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://api.salla.dev/admin/v2/products/quantities/bulkSkus");
        let sent: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"skus": [{"sku": "X", "quantity": 5}]}));
        assert_eq!(requests[1].url, "https://api.salla.dev/admin/v2/orders");
        assert_eq!(requests[1].method, Method::POST);
        assert_eq!(requests[2].url, "https://api.salla.dev/admin/v2/orders/7/tags");
        assert_eq!(requests[2].body.as_deref(), Some(r#"{"tags":["vip"]}"#));
    }

    #[tokio::test]
    async fn test_get_endpoints() {
        let (api, transport, _) = setup();

        api.get_all_customers(None).await.unwrap();
        api.get_product_details("IPHONE-XL", None).await.unwrap();
        api.get_all_branches(None).await.unwrap();

        let urls: Vec<_> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.salla.dev/admin/v2/customers",
                "https://api.salla.dev/admin/v2/products/sku/IPHONE-XL",
                "https://api.salla.dev/admin/v2/branches",
            ]
        );
    }

    #[tokio::test]
    async fn test_resource_owner_updates_principal() {
        let (api, transport, credentials) = setup();
        transport.reply(
            r#"{"data":{"id":1,"name":"Store A","merchant":{"id":20,"name":"Merchant A"}}}"#,
        );

        let owner = api.get_resource_owner(None).await.unwrap();

        assert_eq!(transport.last_request().url, "https://accounts.salla.sa/oauth2/user/info");
        assert_eq!(owner.merchant_name(), Some("Merchant A"));
        assert_eq!(
            credentials.principal().and_then(|p| p.merchant_name),
            Some("Merchant A".to_string())
        );
    }

    #[tokio::test]
    async fn test_resource_owner_with_override_leaves_principal() {
        let (api, transport, credentials) = setup();
        transport.reply(r#"{"data":{"id":9,"name":"Other"}}"#);

        api.get_resource_owner(Some("someone-else")).await.unwrap();

        assert_eq!(credentials.principal(), None::<Principal>);
    }

    /// Completes a second login while the owner lookup is in flight
    struct ReloginTransport {
        credentials: Arc<CredentialState>,
    }

    #[async_trait::async_trait]
    impl HttpTransport for ReloginTransport {
        async fn send(
            &self,
            _request: crate::transport::ApiRequest,
        ) -> Result<String, crate::transport::TransportError> {
            self.credentials.set_login(
                "tok2".to_string(),
                "ref2".to_string(),
                Some(3600),
                Some(Principal { name: Some("Store B".to_string()), ..Principal::default() }),
            );
            Ok(r#"{"data":{"id":1,"name":"Store A"}}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_resource_owner_does_not_overwrite_newer_login() {
        let credentials = Arc::new(CredentialState::new());
        credentials.set_login("tok1".to_string(), "ref1".to_string(), Some(3600), None);
        let transport = ReloginTransport { credentials: credentials.clone() };
        let api = SallaApi::new(Arc::new(transport), credentials.clone(), BaseUrls::default());

        let owner = api.get_resource_owner(None).await.unwrap();

        assert_eq!(owner.name(), Some("Store A"));
        assert_eq!(credentials.access_token().as_deref(), Some("tok2"));
        assert_eq!(credentials.principal().and_then(|p| p.name).as_deref(), Some("Store B"));
    }

    #[tokio::test]
    async fn test_every_operation_resets_on_fetch_failure() {
        let (api, transport, credentials) = setup();

        for attempt in 0..10 {
            credentials.set_login("tok1".to_string(), "ref1".to_string(), Some(3600), None);
            transport.fail(500);

            let err = match attempt {
                0 => api.get_resource_owner(None).await.map(|_| Value::Null),
                1 => api.get_all_orders(None).await,
                2 => api.get_all_customers(None).await,
                3 => api.get_product_details("X", None).await,
                4 => api.get_all_branches(None).await,
                5 => api.post_bulk_quantities(&json!({}), None).await,
                6 => api.post_order(&json!({}), None).await,
                7 => api.cancel_order(1, None).await,
                8 => api.refund_order(1, None).await,
                _ => api.post_tag(1, &json!({}), None).await,
            }
            .unwrap_err();

            assert_eq!(err.kind(), ApiErrorKind::Fetch, "operation {attempt}");
            assert!(credentials.snapshot().is_empty(), "operation {attempt}");
        }
    }
}
