use mongodb::{Client, Database};

use crate::config::AppConfig;
use crate::errors::Result;

pub async fn get_db_client(config: &AppConfig) -> Result<Database> {
    let client = Client::with_uri_str(&config.database_url).await?;
    let db = client.database(&config.db_name);

    // Verify database is reachable by listing collections
    match db.list_collection_names().await {
        Ok(collections) => {
            tracing::info!("✅ Connected to database: {}", config.db_name);
            tracing::debug!("📂 Collections found: {:?}", collections);

            if !collections.iter().any(|name| name == "products") {
                tracing::warn!("⚠️ 'products' collection not found, catalog is empty");
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Database '{}' may not exist or is inaccessible: {}",
                config.db_name,
                e
            );
        }
    }

    Ok(db)
}
