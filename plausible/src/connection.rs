//! Turns a record's `providerConfigRef` into the endpoint and API key used
//! to talk to Plausible.

use std::sync::Arc;

use kube::ResourceExt;
use plausible_crds::{
    v1beta1::{
        CredentialsSource, ProviderConfig, ProviderConfigUsage, ProviderConfigUsageSpec,
        TypedReference,
    },
    Managed, ProviderConfigReference,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    client::ConnectionConfig,
    config::Config,
    error::{Error, Result},
    store::ClusterStore,
};

/// Payload of the credentials secret.
#[derive(Deserialize)]
struct Credentials {
    #[serde(rename = "apiKey")]
    api_key: String,
}

pub struct ConnectionResolver {
    store: Arc<dyn ClusterStore>,
    default_base_url: String,
    usage_namespace: String,
}

impl ConnectionResolver {
    pub fn new(store: Arc<dyn ClusterStore>, config: &Config) -> Self {
        ConnectionResolver {
            store,
            default_base_url: config.default_base_url.clone(),
            usage_namespace: config.usage_namespace.clone(),
        }
    }

    /// Resolve the connection for `record`, recording its use of the
    /// ProviderConfig along the way.
    pub async fn resolve<K: Managed>(&self, record: &K) -> Result<ConnectionConfig> {
        let Some(reference) = record.provider_config_ref() else {
            return Err(Error::Configuration(format!(
                "{} {} has no providerConfigRef",
                K::kind(&()),
                record.name_any()
            )));
        };

        self.track_usage(record, reference).await?;

        let provider_config = self
            .store
            .get_provider_config(&reference.name)
            .await
            .map_err(|error| error.context(format!("cannot get ProviderConfig {}", reference.name)))?
            .ok_or_else(|| {
                Error::Configuration(format!("ProviderConfig {} not found", reference.name))
            })?;

        let api_key = self.api_key(&provider_config).await?;

        let base_url = provider_config
            .spec
            .base_url
            .filter(|base_url| !base_url.is_empty())
            .unwrap_or_else(|| self.default_base_url.clone());

        debug!(provider_config = %reference.name, base_url = %base_url, "resolved connection");

        Ok(ConnectionConfig { base_url, api_key })
    }

    async fn api_key(&self, provider_config: &ProviderConfig) -> Result<String> {
        let name = provider_config.name_any();
        let credentials = &provider_config.spec.credentials;

        if credentials.source != CredentialsSource::Secret {
            return Err(Error::Configuration(format!(
                "ProviderConfig {name}: credentials source {:?} is not supported",
                credentials.source
            )));
        }

        let Some(selector) = credentials.secret_ref.as_ref() else {
            return Err(Error::Configuration(format!(
                "ProviderConfig {name} has no credentials secretRef"
            )));
        };

        let data = self
            .store
            .get_secret_data(&selector.namespace, &selector.name, &selector.key)
            .await
            .map_err(|error| Error::Credentials(format!("cannot read {selector}: {error}")))?
            .ok_or_else(|| Error::Credentials(format!("{selector} not found")))?;

        let credentials: Credentials = serde_json::from_slice(&data).map_err(|error| {
            Error::Configuration(format!("malformed credentials in {selector}: {error}"))
        })?;

        if credentials.api_key.is_empty() {
            return Err(Error::Configuration(format!(
                "credentials in {selector} have an empty apiKey"
            )));
        }

        Ok(credentials.api_key)
    }

    /// Mark `record` as a user of the ProviderConfig. The marker is owned by
    /// the record and named after its UID.
    async fn track_usage<K: Managed>(
        &self,
        record: &K,
        reference: &ProviderConfigReference,
    ) -> Result<()> {
        let mut usage = ProviderConfigUsage::new(
            &record.uid().unwrap_or_else(|| record.name_any()),
            ProviderConfigUsageSpec {
                provider_config_ref: reference.clone(),
                resource_ref: TypedReference {
                    api_version: K::api_version(&()).to_string(),
                    kind: K::kind(&()).to_string(),
                    name: record.name_any(),
                    uid: record.uid(),
                },
            },
        );

        usage.metadata.namespace = Some(
            record
                .namespace()
                .unwrap_or_else(|| self.usage_namespace.clone()),
        );
        usage.metadata.owner_references = record
            .controller_owner_ref(&())
            .map(|owner| vec![owner]);

        self.store
            .create_usage(&usage)
            .await
            .map_err(|error| error.context("cannot track ProviderConfig usage"))
    }
}
