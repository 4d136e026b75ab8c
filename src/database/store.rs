use async_trait::async_trait;

use crate::errors::Result;
use crate::models::lookbook::{LookbookItem, UpdateLookbookItem};
use crate::models::order::{Order, OrderQuery, OrderStatus, PaymentStatus};
use crate::models::product::{Product, ProductQuery, UpdateProduct};
use crate::models::transaction::{PaymentTransaction, TransactionStatus};
use crate::models::video::{UpdateVideo, Video};

/// Document-store operations used by the handlers.
///
/// Every method maps to a single-document (or single-query) operation;
/// implementations rely on the backend's per-document atomicity and
/// never hold locks across calls. Listings come back newest first.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<()>;

    // Catalog
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>>;
    async fn get_product(&self, id: &str) -> Result<Option<Product>>;
    async fn insert_product(&self, product: &Product) -> Result<()>;
    /// Returns the updated product, or `None` when no product has this id.
    async fn update_product(&self, id: &str, update: &UpdateProduct) -> Result<Option<Product>>;
    async fn delete_product(&self, id: &str) -> Result<bool>;

    // Lookbook
    async fn list_lookbook(&self) -> Result<Vec<LookbookItem>>;
    async fn insert_lookbook_item(&self, item: &LookbookItem) -> Result<()>;
    async fn update_lookbook_item(
        &self,
        id: &str,
        update: &UpdateLookbookItem,
    ) -> Result<Option<LookbookItem>>;
    async fn delete_lookbook_item(&self, id: &str) -> Result<bool>;

    // Videos
    async fn list_videos(&self, active_only: bool) -> Result<Vec<Video>>;
    async fn insert_video(&self, video: &Video) -> Result<()>;
    async fn update_video(&self, id: &str, update: &UpdateVideo) -> Result<Option<Video>>;
    async fn delete_video(&self, id: &str) -> Result<bool>;

    // Orders
    async fn insert_order(&self, order: &Order) -> Result<()>;
    async fn get_order(&self, id: &str) -> Result<Option<Order>>;
    async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>>;
    async fn set_order_session(&self, order_id: &str, session_id: &str) -> Result<bool>;
    async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>>;
    /// Sets only the payment status, leaving the fulfilment status untouched.
    async fn set_order_payment_status(&self, order_id: &str, payment_status: PaymentStatus) -> Result<bool>;

    // Payment transactions
    async fn insert_transaction(&self, transaction: &PaymentTransaction) -> Result<()>;
    async fn find_transaction_by_session(&self, session_id: &str) -> Result<Option<PaymentTransaction>>;
    /// Moves the transaction for `session_id` to `payment_status` unless it is
    /// already there or already paid (paid is terminal). Returns the updated
    /// transaction when this call performed the change, `None` otherwise.
    async fn transition_transaction(
        &self,
        session_id: &str,
        status: TransactionStatus,
        payment_status: PaymentStatus,
    ) -> Result<Option<PaymentTransaction>>;
}
