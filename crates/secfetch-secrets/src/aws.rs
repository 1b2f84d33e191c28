//! AWS client construction
//!
//! Both clients share one SDK configuration loaded from the default chain
//! (environment, shared config and credentials files, SSO, instance roles).

use aws_config::BehaviorVersion;
use aws_sdk_ssm::config::Region;
use tracing::debug;

/// Clients backing the parameter store and secrets manager providers
#[derive(Debug, Clone)]
pub struct AwsClients {
    pub ssm: aws_sdk_ssm::Client,
    pub secrets_manager: aws_sdk_secretsmanager::Client,
}

impl AwsClients {
    /// Load the SDK configuration, overriding the region when given
    pub async fn load(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;

        debug!(
            region = sdk_config.region().map(|r| r.as_ref()).unwrap_or("unset"),
            "loaded aws configuration"
        );

        Self {
            ssm: aws_sdk_ssm::Client::new(&sdk_config),
            secrets_manager: aws_sdk_secretsmanager::Client::new(&sdk_config),
        }
    }
}
