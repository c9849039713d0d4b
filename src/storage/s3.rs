use crate::config::S3Config;
use crate::storage::error::StorageError;
use crate::storage::storage::Storage;
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::{config::Region, Client};
use bytes::Bytes;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const OBJECT_CACHE_SIZE: usize = 100;

/// S3-compatible object storage backend with a small read cache.
///
/// Ground-truth files are fetched once per evaluation, so caching them
/// avoids re-downloading the same answer file for every submission.
pub struct S3Storage {
    client: Client,
    bucket: String,
    cache: Arc<Mutex<lru::LruCache<String, Bytes>>>,
}

impl S3Storage {
    pub async fn new(config: &S3Config) -> Result<Self, StorageError> {
        let config_loader = aws_config::from_env().region(Region::new(config.region.clone()));

        // If access key and secret are provided, use them for credentials
        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "StaticCredentialsProvider",
            );

            config_loader.credentials_provider(credentials).load().await
        } else {
            config_loader.load().await
        };

        // Endpoint override for S3-compatible stores (MinIO, Supabase, ...)
        let mut client_builder = aws_sdk_s3::config::Builder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint {
            client_builder = client_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(client_builder.build());

        let cache_size = NonZeroUsize::new(OBJECT_CACHE_SIZE)
            .ok_or_else(|| StorageError::ConfigurationError("cache size must be nonzero".into()))?;
        let cache = Arc::new(Mutex::new(lru::LruCache::new(cache_size)));

        info!("Connected to S3 in region {}", config.region);

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            cache,
        })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        {
            let mut cache = self.cache.lock().await;
            if let Some(data) = cache.get(key) {
                debug!("Cache hit for object: {}", key);
                return Ok(data.clone());
            }
        }

        debug!("Fetching object from S3: {}", key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    StorageError::ObjectNotFound(key.to_string())
                } else {
                    StorageError::ReadError(key.to_string(), service_error.to_string())
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::ReadError(key.to_string(), e.to_string()))?
            .into_bytes();

        {
            let mut cache = self.cache.lock().await;
            cache.put(key.to_string(), data.clone());
        }

        debug!("Successfully fetched object from S3: {}", key);
        Ok(data)
    }

    async fn put_object(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        debug!("Uploading object to S3: {}", key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(data.clone().into())
            .send()
            .await
            .map_err(|e| StorageError::WriteError(key.to_string(), e.to_string()))?;

        // Keep the cache coherent with what was just written
        let mut cache = self.cache.lock().await;
        cache.put(key.to_string(), data);

        Ok(())
    }
}
