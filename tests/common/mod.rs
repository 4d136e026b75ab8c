#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

use storefront_api::config::AppConfig;
use storefront_api::database::Store;
use storefront_api::errors::{AppError, Result};
use storefront_api::models::lookbook::{LookbookItem, UpdateLookbookItem};
use storefront_api::models::order::{Order, OrderQuery, OrderStatus, PaymentStatus};
use storefront_api::models::product::{Product, ProductQuery, UpdateProduct};
use storefront_api::models::transaction::{PaymentTransaction, TransactionStatus};
use storefront_api::models::video::{UpdateVideo, Video};
use storefront_api::services::stripe_service::{
    CheckoutSession, CheckoutSessionRequest, CheckoutSessionStatus, PaymentGateway, WebhookEvent,
};
use storefront_api::{build_router, AppState};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const JWT_SECRET: &str = "test-jwt-secret";
pub const WEBHOOK_SIGNATURE: &str = "valid-signature";

#[derive(Default)]
pub struct MemoryStore {
    products: Mutex<Vec<Product>>,
    lookbook: Mutex<Vec<LookbookItem>>,
    videos: Mutex<Vec<Video>>,
    orders: Mutex<Vec<Order>>,
    transactions: Mutex<Vec<PaymentTransaction>>,
}

impl MemoryStore {
    pub fn orders(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }

    pub fn transactions(&self) -> Vec<PaymentTransaction> {
        self.transactions.lock().unwrap().clone()
    }
}

fn newest_first<T: Clone, F: Fn(&T) -> chrono::DateTime<Utc>>(items: &[T], key: F) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

/// Mirrors Mongo's `$set`: every field the update serializes overwrites the
/// record, absent fields are kept.
fn apply_set<T, U>(record: &mut T, update: &U)
where
    T: Serialize + DeserializeOwned,
    U: Serialize,
{
    let mut merged = serde_json::to_value(&*record).unwrap();
    if let (Value::Object(target), Value::Object(fields)) =
        (&mut merged, serde_json::to_value(update).unwrap())
    {
        target.extend(fields);
    }
    *record = serde_json::from_value(merged).unwrap();
}

fn product_matches(query: &ProductQuery, product: &Product) -> bool {
    query
        .category
        .as_deref()
        .map_or(true, |category| product.category.as_str() == category)
        && query.featured.map_or(true, |featured| product.featured == featured)
        && query
            .new_arrival
            .map_or(true, |new_arrival| product.new_arrival == new_arrival)
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let products = self.products.lock().unwrap();
        let matching: Vec<Product> = products.iter().filter(|p| product_matches(query, p)).cloned().collect();
        Ok(newest_first(&matching, |p| p.created_at))
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.products.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.products.lock().unwrap().push(product.clone());
        Ok(())
    }

    async fn update_product(&self, id: &str, update: &UpdateProduct) -> Result<Option<Product>> {
        let mut products = self.products.lock().unwrap();
        Ok(products.iter_mut().find(|p| p.id == id).map(|product| {
            apply_set(product, update);
            product.clone()
        }))
    }

    async fn delete_product(&self, id: &str) -> Result<bool> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }

    async fn list_lookbook(&self) -> Result<Vec<LookbookItem>> {
        let items = self.lookbook.lock().unwrap();
        Ok(newest_first(items.as_slice(), |i| i.created_at))
    }

    async fn insert_lookbook_item(&self, item: &LookbookItem) -> Result<()> {
        self.lookbook.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn update_lookbook_item(
        &self,
        id: &str,
        update: &UpdateLookbookItem,
    ) -> Result<Option<LookbookItem>> {
        let mut items = self.lookbook.lock().unwrap();
        Ok(items.iter_mut().find(|i| i.id == id).map(|item| {
            apply_set(item, update);
            item.clone()
        }))
    }

    async fn delete_lookbook_item(&self, id: &str) -> Result<bool> {
        let mut items = self.lookbook.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < before)
    }

    async fn list_videos(&self, active_only: bool) -> Result<Vec<Video>> {
        let videos = self.videos.lock().unwrap();
        let matching: Vec<Video> = videos
            .iter()
            .filter(|v| !active_only || v.active)
            .cloned()
            .collect();
        Ok(newest_first(&matching, |v| v.created_at))
    }

    async fn insert_video(&self, video: &Video) -> Result<()> {
        self.videos.lock().unwrap().push(video.clone());
        Ok(())
    }

    async fn update_video(&self, id: &str, update: &UpdateVideo) -> Result<Option<Video>> {
        let mut videos = self.videos.lock().unwrap();
        Ok(videos.iter_mut().find(|v| v.id == id).map(|video| {
            apply_set(video, update);
            video.clone()
        }))
    }

    async fn delete_video(&self, id: &str) -> Result<bool> {
        let mut videos = self.videos.lock().unwrap();
        let before = videos.len();
        videos.retain(|v| v.id != id);
        Ok(videos.len() < before)
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }

    async fn get_order(&self, id: &str) -> Result<Option<Order>> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>> {
        let orders = self.orders.lock().unwrap();
        let matching: Vec<Order> = orders
            .iter()
            .filter(|o| query.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        Ok(newest_first(&matching, |o| o.created_at))
    }

    async fn set_order_session(&self, order_id: &str, session_id: &str) -> Result<bool> {
        let mut orders = self.orders.lock().unwrap();
        Ok(match orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                order.session_id = Some(session_id.to_string());
                order.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>> {
        let mut orders = self.orders.lock().unwrap();
        Ok(orders.iter_mut().find(|o| o.id == order_id).map(|order| {
            order.status = status;
            order.payment_status = payment_status;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn set_order_payment_status(&self, order_id: &str, payment_status: PaymentStatus) -> Result<bool> {
        let mut orders = self.orders.lock().unwrap();
        Ok(match orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                order.payment_status = payment_status;
                order.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn insert_transaction(&self, transaction: &PaymentTransaction) -> Result<()> {
        self.transactions.lock().unwrap().push(transaction.clone());
        Ok(())
    }

    async fn find_transaction_by_session(&self, session_id: &str) -> Result<Option<PaymentTransaction>> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.session_id == session_id)
            .cloned())
    }

    async fn transition_transaction(
        &self,
        session_id: &str,
        status: TransactionStatus,
        payment_status: PaymentStatus,
    ) -> Result<Option<PaymentTransaction>> {
        let mut transactions = self.transactions.lock().unwrap();
        Ok(transactions
            .iter_mut()
            .find(|t| {
                t.session_id == session_id
                    && t.payment_status != payment_status
                    && t.payment_status != PaymentStatus::Paid
            })
            .map(|transaction| {
                transaction.status = status;
                transaction.payment_status = payment_status;
                transaction.updated_at = Utc::now();
                transaction.clone()
            }))
    }
}

/// Payment provider double. Sessions are created as `open`/`unpaid` and
/// can be flipped with [`FakeGateway::set_payment`].
#[derive(Default)]
pub struct FakeGateway {
    sessions: Mutex<HashMap<String, CheckoutSessionStatus>>,
    requests: Mutex<Vec<CheckoutSessionRequest>>,
    counter: AtomicUsize,
    pub fail_create: Mutex<bool>,
}

impl FakeGateway {
    pub fn set_payment(&self, session_id: &str, status: &str, payment_status: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(session_id).expect("unknown session");
        session.status = status.to_string();
        session.payment_status = payment_status.to_string();
    }

    pub fn session(&self, session_id: &str) -> CheckoutSessionStatus {
        self.sessions.lock().unwrap()[session_id].clone()
    }

    pub fn requests(&self) -> Vec<CheckoutSessionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession> {
        if *self.fail_create.lock().unwrap() {
            return Err(AppError::payment("provider unavailable"));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let session_id = format!("cs_test_{}", n);
        self.requests.lock().unwrap().push(request.clone());
        self.sessions.lock().unwrap().insert(
            session_id.clone(),
            CheckoutSessionStatus {
                session_id: session_id.clone(),
                status: "open".to_string(),
                payment_status: "unpaid".to_string(),
                amount_total: request.amount,
                currency: request.currency.clone(),
                metadata: request.metadata.clone(),
            },
        );

        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.test/pay/{}", session_id),
            session_id,
        })
    }

    async fn get_checkout_status(&self, session_id: &str) -> Result<CheckoutSessionStatus> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::payment("No such checkout session"))
    }

    fn parse_webhook(&self, body: &str, signature: &str) -> Result<WebhookEvent> {
        if signature != WEBHOOK_SIGNATURE {
            return Err(AppError::bad_request("Invalid webhook signature"));
        }
        let value: Value = serde_json::from_str(body)?;
        Ok(WebhookEvent {
            event_type: value["type"].as_str().unwrap_or_default().to_string(),
            object: value["data"]["object"].clone(),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<FakeGateway>,
    pub state: AppState,
}

pub fn test_config() -> AppConfig {
    let upload_dir = std::env::temp_dir().join(format!("storefront-test-{}", uuid::Uuid::new_v4()));
    let vars: HashMap<&str, String> = HashMap::from([
        ("MONGO_URL", "mongodb://unused".to_string()),
        ("JWT_SECRET", JWT_SECRET.to_string()),
        ("STRIPE_API_KEY", "sk_test_unused".to_string()),
        ("BACKEND_URL", "http://api.test".to_string()),
        ("UPLOAD_DIR", upload_dir.to_string_lossy().into_owned()),
        ("ADMIN_USERNAME", ADMIN_USER.to_string()),
        ("ADMIN_PASSWORD", ADMIN_PASSWORD.to_string()),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

impl TestApp {
    pub fn spawn() -> Self {
        let store = Arc::new(MemoryStore::default());
        let gateway = Arc::new(FakeGateway::default());
        let state = AppState::new(test_config(), store.clone(), gateway.clone());

        TestApp {
            router: build_router(state.clone()),
            store,
            gateway,
            state,
        }
    }

    pub fn admin_token(&self) -> String {
        self.state.tokens.issue(ADMIN_USER).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn json(&self, method: &str, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn admin_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let token = self.admin_token();
        self.json(method, uri, body, Some(&token)).await
    }

    pub async fn create_product(&self, name: &str, price: f64, category: &str) -> Value {
        let (status, body) = self
            .admin_json(
                "POST",
                "/api/products",
                serde_json::json!({
                    "name": name,
                    "description": format!("{} description", name),
                    "price": price,
                    "category": category,
                    "image_url": format!("https://cdn.test/{}.jpg", name),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }
}
