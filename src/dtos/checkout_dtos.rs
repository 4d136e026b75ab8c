use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartItem {
    #[validate(length(min = 1, message = "Product id is required"))]
    pub product_id: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,

    #[serde(default)]
    pub size: Option<String>,

    #[serde(default)]
    pub color: Option<String>,

    /// Accepted so storefront carts deserialize, never used for pricing.
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "Cart is empty"), nested)]
    pub items: Vec<CartItem>,

    #[validate(url(message = "Origin URL must be a valid URL"))]
    pub origin_url: String,

    #[serde(default)]
    #[validate(email(message = "Invalid customer email"))]
    pub customer_email: Option<String>,

    #[serde(default)]
    pub shipping_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
    pub session_id: String,
    pub order_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutStatusResponse {
    pub session_id: String,
    pub status: String,
    pub payment_status: String,
    pub amount_total: f64,
    pub currency: String,
    pub order_id: Option<String>,
}
