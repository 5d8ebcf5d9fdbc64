use aws_config::SdkConfig;
use aws_types::region::Region;
use face_capture_common::config::AwsConfig;

/// Shared SDK configuration for the S3 and Rekognition clients.
///
/// Credentials always come from the default provider chain.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}
