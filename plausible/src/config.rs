use std::time::Duration;

use clap::Args;

use crate::client::DEFAULT_BASE_URL;

/// Runtime settings threaded through every controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Requeue delay after a successful tick. Drift is only noticed when a
    /// record is observed again, so this is the drift detection period.
    pub poll_interval: Duration,

    /// Requeue delay after a failed tick.
    pub error_backoff: Duration,

    /// Timeout for a single request to the Plausible API.
    pub request_timeout: Duration,

    /// Deadline for a whole reconcile tick.
    pub reconcile_timeout: Duration,

    /// Used when a ProviderConfig does not name a base URL.
    pub default_base_url: String,

    /// Namespace for usage markers of records without one.
    pub usage_namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            poll_interval: Duration::from_secs(60),
            error_backoff: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            reconcile_timeout: Duration::from_secs(120),
            default_base_url: DEFAULT_BASE_URL.to_string(),
            usage_namespace: String::from("crossplane-system"),
        }
    }
}

#[derive(Debug, Args)]
pub struct RunOptions {
    /// Seconds between drift checks of each record.
    #[clap(long, default_value_t = 60)]
    pub poll_interval: u64,

    /// Seconds to wait before retrying a failed reconcile.
    #[clap(long, default_value_t = 30)]
    pub error_backoff: u64,

    /// Timeout in seconds for a single Plausible API request.
    #[clap(long, default_value_t = 30)]
    pub request_timeout: u64,

    /// Deadline in seconds for a whole reconcile.
    #[clap(long, default_value_t = 120)]
    pub reconcile_timeout: u64,

    /// Plausible instance used when a ProviderConfig does not set baseURL.
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub default_base_url: String,

    /// Namespace for ProviderConfigUsages of records without a namespace.
    #[clap(long, default_value = "crossplane-system")]
    pub usage_namespace: String,
}

impl From<RunOptions> for Config {
    fn from(options: RunOptions) -> Self {
        Config {
            poll_interval: Duration::from_secs(options.poll_interval),
            error_backoff: Duration::from_secs(options.error_backoff),
            request_timeout: Duration::from_secs(options.request_timeout),
            reconcile_timeout: Duration::from_secs(options.reconcile_timeout),
            default_base_url: options.default_base_url,
            usage_namespace: options.usage_namespace,
        }
    }
}
