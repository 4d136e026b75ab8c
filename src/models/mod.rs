pub mod auth;
pub mod lookbook;
pub mod order;
pub mod product;
pub mod transaction;
pub mod video;
