pub mod checkout_service;
pub mod stripe_service;
pub mod token_service;
pub mod upload_service;
