use crate::config::Config;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::Client as S3Client;
use tracing;

/// Loads the shared SDK config for the history bucket's region.
/// Credentials come from the default provider chain; `AWS_ENDPOINT_URL` points it at LocalStack.
pub async fn create_sdk_config(config: &Config) -> SdkConfig {
    tracing::info!(sdk_region = %config.aws_region, "Loading AWS SDK config for history storage");
    let loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.aws_region.clone()));

    let loader = match &config.localstack_endpoint {
        Some(endpoint_url) => {
            tracing::info!(%endpoint_url, "Using localstack endpoint override");
            loader.endpoint_url(endpoint_url)
        }
        None => loader,
    };

    loader.load().await
}

// Path-style addressing keeps LocalStack buckets reachable without DNS tricks.
pub fn create_s3_client(sdk_config: &SdkConfig) -> S3Client {
    let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
        .force_path_style(true)
        .build();
    S3Client::from_conf(s3_config)
}
