use crate::{
    aws_clients::{create_s3_client, create_sdk_config},
    config::{Config, HistoryBackend},
    domain::HistoryStore,
    errors::AppError,
    repositories::{InMemoryHistoryStore, KvHistoryStore},
    storage::S3ObjectStorage,
};
use aws_sdk_s3::{
    Client as S3Client,
    error::SdkError as S3SdkError,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use std::sync::Arc;
use tracing;

const ALREADY_PRESENT: [&str; 2] = ["BucketAlreadyOwnedByYou", "BucketAlreadyExists"];

/// Creates the history bucket unless it is already there.
/// Outside `us-east-1` S3 wants an explicit location constraint.
async fn ensure_s3_bucket_exists(client: &S3Client, bucket_name: &str, region: &str) -> Result<(), AppError> {
    let mut request = client.create_bucket().bucket(bucket_name);
    if region != "us-east-1" {
        request = request.create_bucket_configuration(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        );
    }

    let sdk_err = match request.send().await {
        Ok(_) => {
            tracing::info!(bucket = bucket_name, "Startup: history bucket created");
            return Ok(());
        }
        Err(e) => e,
    };

    let code = match &sdk_err {
        S3SdkError::ServiceError(service_err) => service_err.err().meta().code(),
        _ => None,
    };
    if code.is_some_and(|c| ALREADY_PRESENT.contains(&c)) {
        tracing::info!(bucket = bucket_name, "Startup: history bucket already present");
        return Ok(());
    }

    tracing::error!(bucket = bucket_name, error = ?sdk_err, "Startup: could not create history bucket");
    Err(AppError::InitError(format!("creating history bucket '{bucket_name}': {sdk_err}")))
}

/// Builds the history store selected by `HISTORY_BACKEND`, provisioning the
/// S3 bucket first when that backend is chosen.
pub async fn init_history_store(config: &Config) -> Result<Arc<dyn HistoryStore>, AppError> {
    match &config.history_backend {
        HistoryBackend::Memory => {
            tracing::info!("Startup: Using in-memory history (cleared on restart).");
            Ok(Arc::new(InMemoryHistoryStore::default()))
        }
        HistoryBackend::S3 { bucket, object_key } => {
            tracing::info!(%bucket, %object_key, "Startup: Using S3-backed history.");
            let sdk_config = create_sdk_config(config).await;
            let s3_client = create_s3_client(&sdk_config);
            ensure_s3_bucket_exists(&s3_client, bucket, &config.aws_region).await?;

            let storage = Arc::new(S3ObjectStorage::new(s3_client, bucket.clone()));
            Ok(Arc::new(KvHistoryStore::new(storage, object_key.clone())))
        }
    }
}
