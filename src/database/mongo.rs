use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, to_bson, to_document, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::store::Store;
use crate::errors::Result;
use crate::models::lookbook::{LookbookItem, UpdateLookbookItem};
use crate::models::order::{Order, OrderQuery, OrderStatus, PaymentStatus};
use crate::models::product::{Product, ProductQuery, UpdateProduct};
use crate::models::transaction::{PaymentTransaction, TransactionStatus};
use crate::models::video::{UpdateVideo, Video};

const PRODUCTS: &str = "products";
const LOOKBOOK: &str = "lookbook";
const VIDEOS: &str = "videos";
const ORDERS: &str = "orders";
const TRANSACTIONS: &str = "payment_transactions";

/// [`Store`] backed by a MongoDB database handle.
///
/// Records are addressed by their own `id` field; Mongo's `_id` is left to
/// the server and ignored on the way out.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        MongoStore { db }
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    async fn find_all<T>(&self, name: &str, filter: Document) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let cursor = self.collection::<T>(name).find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id<T>(&self, name: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        Ok(self.collection::<T>(name).find_one(doc! { "id": id }).await?)
    }

    async fn set_fields<T, U>(&self, name: &str, id: &str, update: &U) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
        U: Serialize,
    {
        let fields = to_document(update)?;
        let updated = self
            .collection::<T>(name)
            .find_one_and_update(doc! { "id": id }, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    async fn delete_by_id(&self, name: &str, id: &str) -> Result<bool> {
        let result = self
            .collection::<Document>(name)
            .delete_one(doc! { "id": id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

/// Matches the session's transaction unless it is already in the target
/// payment status or already paid. A concurrent caller that moved the
/// document first makes this match nothing.
fn transition_filter(session_id: &str, target: PaymentStatus) -> Document {
    doc! {
        "session_id": session_id,
        "payment_status": { "$nin": [target.as_str(), PaymentStatus::Paid.as_str()] },
    }
}

fn now() -> Result<mongodb::bson::Bson> {
    Ok(to_bson(&Utc::now())?)
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.find_all(PRODUCTS, query.to_filter()).await?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        self.find_by_id(PRODUCTS, id).await
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.collection::<Product>(PRODUCTS).insert_one(product).await?;
        Ok(())
    }

    async fn update_product(&self, id: &str, update: &UpdateProduct) -> Result<Option<Product>> {
        self.set_fields(PRODUCTS, id, update).await
    }

    async fn delete_product(&self, id: &str) -> Result<bool> {
        self.delete_by_id(PRODUCTS, id).await
    }

    async fn list_lookbook(&self) -> Result<Vec<LookbookItem>> {
        let mut items: Vec<LookbookItem> = self.find_all(LOOKBOOK, doc! {}).await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn insert_lookbook_item(&self, item: &LookbookItem) -> Result<()> {
        self.collection::<LookbookItem>(LOOKBOOK).insert_one(item).await?;
        Ok(())
    }

    async fn update_lookbook_item(
        &self,
        id: &str,
        update: &UpdateLookbookItem,
    ) -> Result<Option<LookbookItem>> {
        self.set_fields(LOOKBOOK, id, update).await
    }

    async fn delete_lookbook_item(&self, id: &str) -> Result<bool> {
        self.delete_by_id(LOOKBOOK, id).await
    }

    async fn list_videos(&self, active_only: bool) -> Result<Vec<Video>> {
        let filter = if active_only {
            doc! { "active": true }
        } else {
            doc! {}
        };
        let mut videos: Vec<Video> = self.find_all(VIDEOS, filter).await?;
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn insert_video(&self, video: &Video) -> Result<()> {
        self.collection::<Video>(VIDEOS).insert_one(video).await?;
        Ok(())
    }

    async fn update_video(&self, id: &str, update: &UpdateVideo) -> Result<Option<Video>> {
        self.set_fields(VIDEOS, id, update).await
    }

    async fn delete_video(&self, id: &str) -> Result<bool> {
        self.delete_by_id(VIDEOS, id).await
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.collection::<Order>(ORDERS).insert_one(order).await?;
        Ok(())
    }

    async fn get_order(&self, id: &str) -> Result<Option<Order>> {
        self.find_by_id(ORDERS, id).await
    }

    async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>> {
        let mut filter = doc! {};
        if let Some(status) = query.status {
            filter.insert("status", status.as_str());
        }
        let mut orders: Vec<Order> = self.find_all(ORDERS, filter).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn set_order_session(&self, order_id: &str, session_id: &str) -> Result<bool> {
        let result = self
            .collection::<Order>(ORDERS)
            .update_one(
                doc! { "id": order_id },
                doc! { "$set": { "session_id": session_id, "updated_at": now()? } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>> {
        let updated = self
            .collection::<Order>(ORDERS)
            .find_one_and_update(
                doc! { "id": order_id },
                doc! { "$set": {
                    "status": status.as_str(),
                    "payment_status": payment_status.as_str(),
                    "updated_at": now()?,
                } },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    async fn set_order_payment_status(&self, order_id: &str, payment_status: PaymentStatus) -> Result<bool> {
        let result = self
            .collection::<Order>(ORDERS)
            .update_one(
                doc! { "id": order_id },
                doc! { "$set": { "payment_status": payment_status.as_str(), "updated_at": now()? } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn insert_transaction(&self, transaction: &PaymentTransaction) -> Result<()> {
        self.collection::<PaymentTransaction>(TRANSACTIONS)
            .insert_one(transaction)
            .await?;
        Ok(())
    }

    async fn find_transaction_by_session(&self, session_id: &str) -> Result<Option<PaymentTransaction>> {
        Ok(self
            .collection::<PaymentTransaction>(TRANSACTIONS)
            .find_one(doc! { "session_id": session_id })
            .await?)
    }

    async fn transition_transaction(
        &self,
        session_id: &str,
        status: TransactionStatus,
        payment_status: PaymentStatus,
    ) -> Result<Option<PaymentTransaction>> {
        let updated = self
            .collection::<PaymentTransaction>(TRANSACTIONS)
            .find_one_and_update(
                transition_filter(session_id, payment_status),
                doc! { "$set": {
                    "status": status.as_str(),
                    "payment_status": payment_status.as_str(),
                    "updated_at": now()?,
                } },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }
}
