pub mod auth;
pub mod checkout;
pub mod health;
pub mod lookbook;
pub mod orders;
pub mod products;
pub mod upload;
pub mod videos;
