use crate::blob::error::StorageError;
use crate::blob::storage::Storage;
use crate::config::StorageSettings;
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::{debug, info};

/// Real S3-compatible implementation of the Storage trait. Containers map
/// onto buckets; path-style addressing keeps MinIO-style endpoints working.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    /// Create a new S3Storage instance from the parsed connection string
    pub fn new(settings: &StorageSettings) -> Self {
        let mut config_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .force_path_style(true);

        if let (Some(access_key), Some(secret_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "StaticCredentialsProvider",
            );
            config_builder = config_builder.credentials_provider(credentials);
        }

        if let Some(endpoint) = &settings.endpoint {
            debug!("Using custom storage endpoint: {}", endpoint);
            config_builder = config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(config_builder.build());
        info!("Created blob storage client for region {}", settings.region);

        S3Storage { client }
    }
}

/// Pull the service error code out of an SDK error, if there is one
fn error_code<E, R>(err: &aws_sdk_s3::error::SdkError<E, R>) -> Option<String>
where
    E: aws_sdk_s3::error::ProvideErrorMetadata,
{
    if let aws_sdk_s3::error::SdkError::ServiceError(service_err) = err {
        service_err.err().meta().code().map(str::to_string)
    } else {
        None
    }
}

/// Classify connectivity/auth failures as Unavailable
fn is_unavailable(code: Option<&str>, message: &str) -> bool {
    matches!(
        code,
        Some("AccessDenied") | Some("InvalidAccessKeyId") | Some("SignatureDoesNotMatch")
    ) || message.contains("dispatch failure")
        || message.contains("connection")
        || message.contains("timed out")
}

#[async_trait]
impl Storage for S3Storage {
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        debug!("Writing object {} to container {}", key, container);

        self.client
            .put_object()
            .bucket(container)
            .key(key)
            .content_type(content_type)
            .body(data.into())
            .send()
            .await
            .map_err(|e| {
                let code = error_code(&e);
                let message = e.to_string();
                if is_unavailable(code.as_deref(), &message) {
                    StorageError::Unavailable(message)
                } else {
                    StorageError::Write(key.to_string(), message)
                }
            })?;

        debug!("Successfully wrote object {}", key);
        Ok(())
    }

    async fn has_container(&self, container: &str) -> Result<bool, StorageError> {
        let result = self.client.head_bucket().bucket(container).send().await;

        match result {
            Ok(_) => {
                debug!("Container '{}' exists", container);
                Ok(true)
            }
            Err(e) => {
                let code = error_code(&e);
                let message = e.to_string();

                match code.as_deref() {
                    Some("NoSuchBucket") | Some("NotFound") => {
                        info!("Container '{}' does not exist", container);
                        return Ok(false);
                    }
                    _ => {}
                }

                // Some S3 implementations answer a bare 404 with no error code
                if message.contains("NoSuchBucket")
                    || message.contains("NotFound")
                    || message.contains("404")
                {
                    info!("Container '{}' does not exist", container);
                    Ok(false)
                } else {
                    Err(StorageError::Unavailable(format!(
                        "failed to check container '{}': {}",
                        container, message
                    )))
                }
            }
        }
    }

    async fn create_container(&self, container: &str) -> Result<(), StorageError> {
        info!("Creating container '{}'", container);

        match self.client.create_bucket().bucket(container).send().await {
            Ok(_) => {
                info!("Successfully created container '{}'", container);
                Ok(())
            }
            Err(e) => {
                let code = error_code(&e);
                let message = e.to_string();

                match code.as_deref() {
                    Some("BucketAlreadyExists") | Some("BucketAlreadyOwnedByYou") => {
                        info!("Container '{}' already exists", container);
                        return Ok(());
                    }
                    _ => {}
                }

                if message.contains("BucketAlreadyExists")
                    || message.contains("BucketAlreadyOwnedByYou")
                    || message.contains("already exists")
                {
                    info!("Container '{}' already exists", container);
                    Ok(())
                } else {
                    Err(StorageError::ContainerCreate(container.to_string(), message))
                }
            }
        }
    }

    #[cfg(test)]
    async fn get_object(&self, container: &str, key: &str) -> Result<Bytes, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .into_bytes();

        Ok(data)
    }
}
