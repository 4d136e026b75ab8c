use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::database::Store;
use crate::dtos::checkout_dtos::{
    CartItem, CheckoutRequest, CheckoutResponse, CheckoutStatusResponse,
};
use crate::errors::{AppError, Result};
use crate::models::order::{to_minor_units, Order, OrderItem, OrderStatus, PaymentStatus};
use crate::models::transaction::{PaymentTransaction, TransactionStatus};
use crate::services::stripe_service::{
    CheckoutSessionRequest, CheckoutSessionStatus, PaymentGateway, SessionEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    MarkedPaid,
    AlreadyPaid,
    MarkedFailed,
    Unchanged,
    UnknownSession,
}

/// Coordinates the order, the payment transaction and the provider session.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn Store>,
    payments: Arc<dyn PaymentGateway>,
    currency: String,
}

impl CheckoutService {
    pub fn new(store: Arc<dyn Store>, payments: Arc<dyn PaymentGateway>, currency: String) -> Self {
        CheckoutService {
            store,
            payments,
            currency,
        }
    }

    /// Snapshots catalog name and price for every cart line. Client prices
    /// are never read. Any unknown product fails the whole cart.
    pub async fn price_cart(&self, items: &[CartItem]) -> Result<Vec<OrderItem>> {
        if items.is_empty() {
            return Err(AppError::bad_request("Cart is empty"));
        }

        let mut priced = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 {
                return Err(AppError::bad_request("Quantity must be at least 1"));
            }

            let product = self
                .store
                .get_product(&item.product_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Product {}", item.product_id)))?;

            if !product.in_stock {
                return Err(AppError::bad_request(format!(
                    "Product {} is out of stock",
                    product.name
                )));
            }

            priced.push(OrderItem {
                product_id: product.id,
                name: product.name,
                price: product.price,
                quantity: item.quantity,
                size: item.size.clone(),
                color: item.color.clone(),
            });
        }

        Ok(priced)
    }

    pub async fn create_session(&self, request: CheckoutRequest) -> Result<CheckoutResponse> {
        let items = self.price_cart(&request.items).await?;
        let order = Order::new(items, request.customer_email.clone(), request.shipping_address);
        self.store.insert_order(&order).await?;
        info!("🧾 Order {} created, total {:.2}", order.id, order.total);

        let origin = request.origin_url.trim_end_matches('/');
        let mut metadata = HashMap::new();
        metadata.insert("order_id".to_string(), order.id.clone());
        metadata.insert("source".to_string(), "web_checkout".to_string());

        let session_request = CheckoutSessionRequest {
            amount: to_minor_units(order.total),
            currency: self.currency.clone(),
            description: format!("Order {} ({} items)", order.id, order.items.len()),
            success_url: format!("{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}", origin),
            cancel_url: format!("{}/cart", origin),
            customer_email: request.customer_email,
            metadata: metadata.clone(),
        };

        let session = match self.payments.create_checkout_session(&session_request).await {
            Ok(session) => session,
            Err(e) => {
                error!("❌ Checkout session for order {} failed: {}", order.id, e);
                self.abandon_order(&order.id).await;
                return Err(e);
            }
        };

        self.store
            .set_order_session(&order.id, &session.session_id)
            .await?;

        let transaction = PaymentTransaction::new(
            session.session_id.clone(),
            order.id.clone(),
            order.total,
            self.currency.clone(),
            metadata,
        );
        self.store.insert_transaction(&transaction).await?;

        info!(
            "💳 Session {} opened for order {}",
            session.session_id, order.id
        );

        Ok(CheckoutResponse {
            url: session.url,
            session_id: session.session_id,
            order_id: order.id,
        })
    }

    /// Compensates an order whose payment session could never be opened.
    async fn abandon_order(&self, order_id: &str) {
        if let Err(e) = self
            .store
            .set_order_status(order_id, OrderStatus::Cancelled, PaymentStatus::Failed)
            .await
        {
            error!("Failed to cancel orphaned order {}: {}", order_id, e);
        }
    }

    pub async fn check_status(&self, session_id: &str) -> Result<CheckoutStatusResponse> {
        let session = self.payments.get_checkout_status(session_id).await?;
        self.reconcile(&session).await?;

        let order_id = match self.store.find_transaction_by_session(session_id).await? {
            Some(transaction) => Some(transaction.order_id),
            None => session.metadata.get("order_id").cloned(),
        };

        Ok(CheckoutStatusResponse {
            session_id: session.session_id,
            status: session.status,
            payment_status: session.payment_status,
            amount_total: session.amount_total as f64 / 100.0,
            currency: session.currency,
            order_id,
        })
    }

    /// Applies the provider's view of a session to the ledger. Safe to call
    /// any number of times for the same session.
    pub async fn reconcile(&self, session: &CheckoutSessionStatus) -> Result<ReconcileOutcome> {
        if session.is_paid() {
            return self.mark_paid(&session.session_id).await;
        }
        if session.is_expired() {
            return self
                .mark_failed(&session.session_id, TransactionStatus::Expired)
                .await;
        }
        Ok(ReconcileOutcome::Unchanged)
    }

    /// Webhook entry point. A failed asynchronous payment arrives on a
    /// `complete`/`unpaid` session, so it cannot be read off the status.
    pub async fn apply_event(
        &self,
        event: SessionEvent,
        session: &CheckoutSessionStatus,
    ) -> Result<ReconcileOutcome> {
        match event {
            SessionEvent::AsyncPaymentFailed => {
                self.mark_failed(&session.session_id, TransactionStatus::Failed)
                    .await
            }
            SessionEvent::Completed
            | SessionEvent::AsyncPaymentSucceeded
            | SessionEvent::Expired => self.reconcile(session).await,
        }
    }

    async fn mark_paid(&self, session_id: &str) -> Result<ReconcileOutcome> {
        let transition = self
            .store
            .transition_transaction(session_id, TransactionStatus::Complete, PaymentStatus::Paid)
            .await?;

        let (transaction, outcome) = match transition {
            Some(transaction) => (transaction, ReconcileOutcome::MarkedPaid),
            None => match self.store.find_transaction_by_session(session_id).await? {
                Some(transaction) => (transaction, ReconcileOutcome::AlreadyPaid),
                None => {
                    warn!("Paid session {} has no transaction record", session_id);
                    return Ok(ReconcileOutcome::UnknownSession);
                }
            },
        };

        // A retry after a failed order write finds the ledger already paid
        // and still has to settle the order.
        if self.settle_order(&transaction.order_id).await? {
            info!("✅ Order {} paid via session {}", transaction.order_id, session_id);
        }
        Ok(outcome)
    }

    /// Brings the order in line with a paid transaction. Returns whether
    /// anything was written.
    async fn settle_order(&self, order_id: &str) -> Result<bool> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        if order.status == OrderStatus::Pending {
            self.store
                .set_order_status(&order.id, OrderStatus::Paid, PaymentStatus::Paid)
                .await?;
            return Ok(true);
        }
        if order.payment_status != PaymentStatus::Paid {
            self.store
                .set_order_payment_status(&order.id, PaymentStatus::Paid)
                .await?;
            return Ok(true);
        }
        Ok(false)
    }

    async fn mark_failed(
        &self,
        session_id: &str,
        status: TransactionStatus,
    ) -> Result<ReconcileOutcome> {
        let transition = self
            .store
            .transition_transaction(session_id, status, PaymentStatus::Failed)
            .await?;

        match transition {
            Some(transaction) => {
                self.store
                    .set_order_payment_status(&transaction.order_id, PaymentStatus::Failed)
                    .await?;
                info!(
                    "Session {} {}, order {} payment failed",
                    session_id,
                    status.as_str(),
                    transaction.order_id
                );
                Ok(ReconcileOutcome::MarkedFailed)
            }
            None => Ok(ReconcileOutcome::Unchanged),
        }
    }
}
