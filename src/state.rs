use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::services::checkout_service::CheckoutService;
use crate::services::stripe_service::PaymentGateway;
use crate::services::token_service::TokenService;
use crate::services::upload_service::UploadService;

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub payments: Arc<dyn PaymentGateway>,
    pub checkout: CheckoutService,
    pub tokens: TokenService,
    pub uploads: UploadService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        let checkout = CheckoutService::new(store.clone(), payments.clone(), config.currency.clone());
        let tokens = TokenService::new(&config.jwt_secret);
        let uploads = UploadService::new(config.upload_dir.clone(), &config.backend_url);

        AppState {
            store,
            payments,
            checkout,
            tokens,
            uploads,
            config: Arc::new(config),
        }
    }
}
