//! Typed client for the storefront HTTP API.
//!
//! Every endpoint answers with `{ success, data?, message?, error?, details? }`.
//! Successful calls return `data`; failures become [`ClientError::Api`].

use std::collections::BTreeMap;

use common::{
    Category, CategoryDraft, CategoryId, CategoryUpdate, CheckoutRequest, ContactMessage,
    ContactMessageDraft, Money, Order, OrderId, OrderStatus, Product, ProductDraft, ProductId,
    ProductUpdate, Role, StoreId, User, UserId,
};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{ClientError, Result};

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error: Option<String>,
    message: Option<String>,
    details: Option<Value>,
}

/// A user and their bearer token, as returned by sign-in calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Admin dashboard figures.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_products: usize,
    pub total_categories: usize,
    pub total_orders: usize,
    pub total_revenue: Money,
    pub pending_orders: usize,
    pub orders_by_status: BTreeMap<OrderStatus, usize>,
    pub recent_orders: Vec<Order>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeliveryFee {
    amount: Money,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct Registration<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

/// Fields of the caller's own profile to change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct StorefrontClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl StorefrontClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn envelope<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Envelope<T>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let envelope: Envelope<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(ClientError::UnexpectedResponse(e.to_string()));
            }
            Err(_) => {
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    error: status.canonical_reason().unwrap_or_default().to_string(),
                    message: String::from_utf8_lossy(&body).into_owned(),
                    details: None,
                });
            }
        };

        if !status.is_success() || !envelope.success {
            debug!(status = status.as_u16(), error = ?envelope.error, "API call failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                error: envelope.error.unwrap_or_default(),
                message: envelope.message.unwrap_or_default(),
                details: envelope.details,
            });
        }
        Ok(envelope)
    }

    async fn data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.envelope(request)
            .await?
            .data
            .ok_or_else(|| ClientError::UnexpectedResponse("response carried no data".to_string()))
    }

    /// For calls that answer with a message only.
    async fn acknowledge(&self, request: RequestBuilder) -> Result<String> {
        let envelope = self.envelope::<IgnoredAny>(request).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    // -- Accounts --

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<AuthResponse> {
        let body = Registration {
            email,
            password,
            name,
        };
        self.data(self.request(Method::POST, "api/auth/register")?.json(&body))
            .await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = Credentials { email, password };
        self.data(self.request(Method::POST, "api/auth/login")?.json(&body))
            .await
    }

    pub async fn profile(&self) -> Result<User> {
        self.data(self.request(Method::GET, "api/auth/profile")?).await
    }

    pub async fn update_profile(&self, changes: &ProfileChanges) -> Result<User> {
        self.data(self.request(Method::PUT, "api/auth/profile")?.json(changes))
            .await
    }

    pub async fn refresh(&self) -> Result<AuthResponse> {
        self.data(self.request(Method::POST, "api/auth/refresh")?).await
    }

    pub async fn logout(&self) -> Result<String> {
        self.acknowledge(self.request(Method::POST, "api/auth/logout")?)
            .await
    }

    // -- Catalog --

    pub async fn products(&self, store: Option<StoreId>) -> Result<Vec<Product>> {
        let mut request = self.request(Method::GET, "api/products")?;
        if let Some(store) = store {
            request = request.query(&[("store", store.as_str())]);
        }
        self.data(request).await
    }

    pub async fn product(&self, id: ProductId) -> Result<Product> {
        self.data(self.request(Method::GET, &format!("api/products/{id}"))?)
            .await
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        self.data(self.request(Method::POST, "api/products")?.json(draft))
            .await
    }

    pub async fn update_product(&self, id: ProductId, update: &ProductUpdate) -> Result<Product> {
        self.data(
            self.request(Method::PUT, &format!("api/products/{id}"))?
                .json(update),
        )
        .await
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<String> {
        self.acknowledge(self.request(Method::DELETE, &format!("api/products/{id}"))?)
            .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.data(self.request(Method::GET, "api/categories")?).await
    }

    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<Category> {
        self.data(self.request(Method::POST, "api/categories")?.json(draft))
            .await
    }

    pub async fn update_category(&self, id: CategoryId, update: &CategoryUpdate) -> Result<Category> {
        self.data(
            self.request(Method::PUT, &format!("api/categories/{id}"))?
                .json(update),
        )
        .await
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<String> {
        self.acknowledge(self.request(Method::DELETE, &format!("api/categories/{id}"))?)
            .await
    }

    // -- Checkout --

    pub async fn delivery_fee(&self) -> Result<Money> {
        let fee: DeliveryFee = self
            .data(self.request(Method::GET, "api/settings/delivery-fee")?)
            .await?;
        Ok(fee.amount)
    }

    #[instrument(skip(self, checkout), fields(items = checkout.items.len()))]
    pub async fn place_order(&self, checkout: &CheckoutRequest) -> Result<Order> {
        self.data(self.request(Method::POST, "api/orders")?.json(checkout))
            .await
    }

    pub async fn my_orders(&self) -> Result<Vec<Order>> {
        self.data(self.request(Method::GET, "api/orders")?).await
    }

    pub async fn order(&self, id: OrderId) -> Result<Order> {
        self.data(self.request(Method::GET, &format!("api/orders/{id}"))?)
            .await
    }

    pub async fn send_contact_message(&self, draft: &ContactMessageDraft) -> Result<ContactMessage> {
        self.data(self.request(Method::POST, "api/contact")?.json(draft))
            .await
    }

    // -- Admin --

    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        self.data(self.request(Method::GET, "api/admin/orders")?).await
    }

    pub async fn set_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        self.data(
            self.request(Method::PUT, &format!("api/admin/orders/{id}/status"))?
                .json(&serde_json::json!({ "status": status })),
        )
        .await
    }

    pub async fn delete_order(&self, id: OrderId) -> Result<String> {
        self.acknowledge(self.request(Method::DELETE, &format!("api/admin/orders/{id}"))?)
            .await
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        self.data(self.request(Method::GET, "api/admin/stats")?).await
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.data(self.request(Method::GET, "api/admin/users")?).await
    }

    pub async fn set_user_role(&self, id: UserId, role: Role) -> Result<User> {
        self.data(
            self.request(Method::PUT, &format!("api/admin/users/{id}/role"))?
                .json(&serde_json::json!({ "role": role })),
        )
        .await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<String> {
        self.acknowledge(self.request(Method::DELETE, &format!("api/admin/users/{id}"))?)
            .await
    }

    pub async fn contact_messages(&self) -> Result<Vec<ContactMessage>> {
        self.data(self.request(Method::GET, "api/admin/contact")?).await
    }

    pub async fn set_delivery_fee(&self, amount: Money) -> Result<Money> {
        let fee: DeliveryFee = self
            .data(
                self.request(Method::PUT, "api/admin/settings/delivery-fee")?
                    .json(&DeliveryFee { amount }),
            )
            .await?;
        Ok(fee.amount)
    }
}
