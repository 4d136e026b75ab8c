// services/stripe_service.rs
//! Stripe Checkout client and the payment-provider seam the checkout flow
//! talks to.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Maximum age of a signed webhook before it is refused.
const WEBHOOK_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    /// Amount in minor units (cents).
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    #[serde(rename = "id")]
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionStatus {
    #[serde(rename = "id")]
    pub session_id: String,
    /// `open`, `complete` or `expired`.
    pub status: String,
    /// `paid`, `unpaid` or `no_payment_required`.
    pub payment_status: String,
    #[serde(default)]
    pub amount_total: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionStatus {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    pub fn is_expired(&self) -> bool {
        self.status == "expired"
    }
}

/// Checkout Session events that move the payment ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Completed,
    AsyncPaymentSucceeded,
    AsyncPaymentFailed,
    Expired,
}

impl SessionEvent {
    pub fn from_type(event_type: &str) -> Option<Self> {
        match event_type {
            "checkout.session.completed" => Some(SessionEvent::Completed),
            "checkout.session.async_payment_succeeded" => Some(SessionEvent::AsyncPaymentSucceeded),
            "checkout.session.async_payment_failed" => Some(SessionEvent::AsyncPaymentFailed),
            "checkout.session.expired" => Some(SessionEvent::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub event_type: String,
    /// Raw `data.object`. Its shape depends on the event type.
    pub object: Value,
}

impl WebhookEvent {
    pub fn session_event(&self) -> Option<SessionEvent> {
        SessionEvent::from_type(&self.event_type)
    }

    pub fn checkout_session(&self) -> Result<CheckoutSessionStatus> {
        serde_json::from_value(self.object.clone())
            .map_err(|e| AppError::bad_request(format!("Invalid checkout session in webhook: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct RawWebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawWebhookData,
}

#[derive(Debug, Deserialize)]
struct RawWebhookData {
    object: Value,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession>;

    async fn get_checkout_status(&self, session_id: &str) -> Result<CheckoutSessionStatus>;

    /// Verifies the provider signature over the raw body and parses the event.
    fn parse_webhook(&self, body: &str, signature: &str) -> Result<WebhookEvent>;
}

#[derive(Clone)]
pub struct StripeService {
    client: Client,
    api_key: String,
    webhook_secret: String,
    api_base: String,
}

impl StripeService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(StripeService {
            client,
            api_key: config.stripe_api_key.clone(),
            webhook_secret: config.stripe_webhook_secret.clone(),
            api_base: config.stripe_api_base.trim_end_matches('/').to_string(),
        })
    }

    fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                request.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.description.clone(),
            ),
        ];

        if let Some(email) = &request.customer_email {
            form.push(("customer_email".to_string(), email.clone()));
        }

        for (key, value) in &request.metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }

        form
    }

    async fn read_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| AppError::payment(format!("Unexpected Stripe response: {}", e)));
        }

        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        error!("Stripe request failed ({}): {}", status, message);
        Err(AppError::payment(message))
    }

    fn verify_signature_at(&self, body: &str, header: &str, now: i64) -> Result<()> {
        if self.webhook_secret.is_empty() {
            warn!("Webhook received but STRIPE_WEBHOOK_SECRET is not configured");
            return Err(AppError::bad_request("Webhook signing secret not configured"));
        }

        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| AppError::bad_request("Invalid webhook signature"))?;
        if (now - timestamp).abs() > WEBHOOK_TOLERANCE_SECS {
            return Err(AppError::bad_request("Webhook timestamp outside tolerance"));
        }

        let signed_payload = format!("{}.{}", timestamp, body);
        let valid = signatures.iter().any(|candidate| {
            let Ok(expected) = hex::decode(candidate) else {
                return false;
            };
            let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(self.webhook_secret.as_bytes()) else {
                return false;
            };
            mac.update(signed_payload.as_bytes());
            mac.verify_slice(&expected).is_ok()
        });

        if !valid {
            warn!("Webhook signature verification failed");
            return Err(AppError::bad_request("Invalid webhook signature"));
        }

        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StripeService {
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession> {
        let url = format!("{}/checkout/sessions", self.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .form(&Self::session_form(request))
            .send()
            .await?;

        let session: CheckoutSession = Self::read_response(response).await?;
        info!("Stripe checkout session created: {}", session.session_id);
        Ok(session)
    }

    async fn get_checkout_status(&self, session_id: &str) -> Result<CheckoutSessionStatus> {
        let url = format!("{}/checkout/sessions/{}", self.api_base, session_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::read_response(response).await
    }

    fn parse_webhook(&self, body: &str, signature: &str) -> Result<WebhookEvent> {
        self.verify_signature_at(body, signature, Utc::now().timestamp())?;

        let raw: RawWebhookEvent = serde_json::from_str(body)
            .map_err(|e| AppError::bad_request(format!("Invalid webhook payload: {}", e)))?;

        Ok(WebhookEvent {
            event_type: raw.event_type,
            object: raw.data.object,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> StripeService {
        StripeService {
            client: Client::new(),
            api_key: "sk_test_123".to_string(),
            webhook_secret: secret.to_string(),
            api_base: "https://api.stripe.com/v1".to_string(),
        }
    }

    fn sign(secret: &str, timestamp: i64, body: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, body).as_bytes());
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    const BODY: &str = r#"{"type":"checkout.session.completed","data":{"object":{"id":"cs_test_1","status":"complete","payment_status":"paid","amount_total":7000,"currency":"usd","metadata":{"order_id":"o-1"}}}}"#;

    #[test]
    fn valid_signature_is_accepted() {
        let stripe = service("whsec_test");
        let now = 1_700_000_000;
        let header = sign("whsec_test", now, BODY);

        assert!(stripe.verify_signature_at(BODY, &header, now + 10).is_ok());
    }

    #[test]
    fn signature_from_other_secret_is_rejected() {
        let stripe = service("whsec_test");
        let now = 1_700_000_000;
        let header = sign("whsec_other", now, BODY);

        let err = stripe.verify_signature_at(BODY, &header, now).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn modified_body_is_rejected() {
        let stripe = service("whsec_test");
        let now = 1_700_000_000;
        let header = sign("whsec_test", now, BODY);
        let tampered = BODY.replace("7000", "1");

        assert!(stripe.verify_signature_at(&tampered, &header, now).is_err());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let stripe = service("whsec_test");
        let signed_at = 1_700_000_000;
        let header = sign("whsec_test", signed_at, BODY);

        assert!(stripe
            .verify_signature_at(BODY, &header, signed_at + WEBHOOK_TOLERANCE_SECS + 1)
            .is_err());
    }

    #[test]
    fn missing_secret_refuses_all_webhooks() {
        let stripe = service("");
        assert!(stripe.verify_signature_at(BODY, "t=1,v1=00", 1).is_err());
    }

    #[test]
    fn signed_session_event_decodes_checkout_session() {
        let stripe = service("whsec_test");
        let header = sign("whsec_test", Utc::now().timestamp(), BODY);

        let event = stripe.parse_webhook(BODY, &header).unwrap();

        assert_eq!(event.session_event(), Some(SessionEvent::Completed));
        let session = event.checkout_session().unwrap();
        assert!(session.is_paid());
        assert_eq!(session.metadata["order_id"], "o-1");
    }

    #[test]
    fn signed_non_session_event_still_parses() {
        let body = r#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","object":"payment_intent","amount":7000,"status":"succeeded"}}}"#;
        let stripe = service("whsec_test");
        let header = sign("whsec_test", Utc::now().timestamp(), body);

        let event = stripe.parse_webhook(body, &header).unwrap();

        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.session_event(), None);
        assert!(event.checkout_session().is_err());
    }

    #[test]
    fn async_payment_failure_is_a_session_event() {
        assert_eq!(
            SessionEvent::from_type("checkout.session.async_payment_failed"),
            Some(SessionEvent::AsyncPaymentFailed)
        );
        assert_eq!(SessionEvent::from_type("charge.succeeded"), None);
    }

    #[test]
    fn session_form_encodes_amount_and_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("order_id".to_string(), "o-1".to_string());
        let request = CheckoutSessionRequest {
            amount: 7000,
            currency: "usd".into(),
            description: "Order o-1".into(),
            success_url: "https://shop.example/checkout/success?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "https://shop.example/cart".into(),
            customer_email: None,
            metadata,
        };

        let form = StripeService::session_form(&request);
        assert!(form.contains(&("line_items[0][price_data][unit_amount]".into(), "7000".into())));
        assert!(form.contains(&("metadata[order_id]".into(), "o-1".into())));
        assert!(!form.iter().any(|(key, _)| key == "customer_email"));
    }
}
