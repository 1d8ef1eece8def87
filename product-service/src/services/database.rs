use super::connection::{ConnectionMonitor, ConnectionPhase};
use super::store::{ProductStore, ProductStream, StoreError};
use crate::config::MongoConfig;
use crate::models::{NewProduct, Product};
use crate::validation::Pagination;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    bson::doc,
    event::sdam::{
        SdamEventHandler, ServerClosedEvent, ServerHeartbeatFailedEvent,
        ServerHeartbeatSucceededEvent,
    },
    options::{ClientOptions, FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;

const PRODUCTS_COLLECTION: &str = "products";
const READY_RETRY_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    /// Builds the client and wires its heartbeats into `monitor`. Does not
    /// wait for the server; see [`MongoDb::wait_until_ready`].
    pub async fn connect(
        config: &MongoConfig,
        monitor: Arc<ConnectionMonitor>,
    ) -> Result<Self, AppError> {
        monitor.set(ConnectionPhase::Connecting);

        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            tracing::error!("Invalid MongoDB connection string: {}", e);
            AppError::ConfigError(anyhow::anyhow!("invalid MONGODB_URI: {}", e))
        })?;
        options.app_name = Some("product-service".to_string());
        options.server_selection_timeout = Some(config.server_selection_timeout());
        options.sdam_event_handler = Some(Arc::new(HeartbeatObserver {
            monitor: monitor.clone(),
        }));

        // Hosts only; the URI may carry credentials.
        let hosts: Vec<String> = options.hosts.iter().map(|h| h.to_string()).collect();
        tracing::info!(hosts = ?hosts, database = %config.database, "Connecting to MongoDB");

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::StorageFault(anyhow::Error::new(e))
        })?;
        let db = client.database(&config.database);

        Ok(Self { client, db })
    }

    /// Pings until the server answers, then marks the connection ready and
    /// ensures indexes. Gives up quietly once shutdown has begun.
    pub async fn wait_until_ready(&self, monitor: Arc<ConnectionMonitor>) {
        loop {
            if matches!(
                monitor.phase(),
                ConnectionPhase::Disconnecting | ConnectionPhase::Disconnected
            ) {
                return;
            }

            match self.health_check().await {
                Ok(()) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "MongoDB not reachable yet, retrying");
                    tokio::time::sleep(READY_RETRY_INTERVAL).await;
                }
            }
        }

        monitor.mark_reachable();
        tracing::info!(database = %self.db.name(), "Successfully connected to MongoDB database");

        if let Err(e) = self.initialize_indexes().await {
            tracing::warn!(error = %e, "Failed to initialize product indexes");
        }
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_desc".to_string())
                    .build(),
            )
            .build();

        self.products()
            .create_index(created_at_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create created_at index on products: {}", e);
                AppError::StorageFault(anyhow::Error::new(e))
            })?;
        tracing::info!("Created index on products.created_at");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::debug!("MongoDB ping failed: {}", e);
                AppError::StorageFault(anyhow::Error::new(e))
            })?;
        Ok(())
    }

    pub fn products(&self) -> Collection<Product> {
        self.db.collection(PRODUCTS_COLLECTION)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Closes the client, waiting for checked-out connections to return.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

/// Feeds per-server driver heartbeats into the shared connection phase.
struct HeartbeatObserver {
    monitor: Arc<ConnectionMonitor>,
}

impl SdamEventHandler for HeartbeatObserver {
    fn handle_server_heartbeat_succeeded_event(&self, event: ServerHeartbeatSucceededEvent) {
        self.monitor
            .observe_heartbeat(&event.server_address.to_string(), true);
    }

    fn handle_server_heartbeat_failed_event(&self, event: ServerHeartbeatFailedEvent) {
        tracing::warn!(
            server = %event.server_address,
            error = %event.failure,
            "MongoDB heartbeat failed"
        );
        self.monitor
            .observe_heartbeat(&event.server_address.to_string(), false);
    }

    fn handle_server_closed_event(&self, event: ServerClosedEvent) {
        self.monitor.forget_server(&event.address.to_string());
    }
}

/// [`ProductStore`] over the `products` collection.
#[derive(Clone)]
pub struct MongoProductStore {
    db: MongoDb,
}

impl MongoProductStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let product = product.into_product(Product::timestamp_now());

        self.db
            .products()
            .insert_one(&product, None)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to insert product");
                StoreError::from(e)
            })?;

        Ok(product)
    }

    async fn list(&self, page: Pagination) -> Result<ProductStream, StoreError> {
        // _id is a v7 UUID, so it breaks created_at ties in creation order.
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": -1 })
            .skip(page.skip)
            .limit(i64::from(page.limit))
            .build();

        let cursor = self
            .db
            .products()
            .find(None, options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to query products");
                StoreError::from(e)
            })?;

        Ok(cursor.map_err(StoreError::from).boxed())
    }
}
