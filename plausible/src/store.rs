//! Read and write access to the cluster objects a reconcile depends on,
//! other than the record being reconciled.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{api::PostParams, Api, Client, ResourceExt};
#[cfg(test)]
use mockall::automock;
use plausible_crds::v1beta1::{ProviderConfig, ProviderConfigUsage, Site};
use tracing::debug;

use crate::error::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Get a Site record, `None` if it does not exist.
    async fn get_site(&self, namespace: &str, name: &str) -> Result<Option<Site>>;

    async fn get_provider_config(&self, name: &str) -> Result<Option<ProviderConfig>>;

    /// Raw value of one key of a Secret. `None` if either the Secret or the
    /// key is missing.
    async fn get_secret_data(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>>;

    /// Create a usage marker. A marker that already exists is left as is.
    async fn create_usage(&self, usage: &ProviderConfigUsage) -> Result<()>;
}

pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        KubeStore { client }
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    async fn get_site(&self, namespace: &str, name: &str) -> Result<Option<Site>> {
        Ok(Api::<Site>::namespaced(self.client.clone(), namespace)
            .get_opt(name)
            .await?)
    }

    async fn get_provider_config(&self, name: &str) -> Result<Option<ProviderConfig>> {
        Ok(Api::<ProviderConfig>::all(self.client.clone())
            .get_opt(name)
            .await?)
    }

    async fn get_secret_data(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>> {
        let secret = Api::<Secret>::namespaced(self.client.clone(), namespace)
            .get_opt(name)
            .await?;

        Ok(secret
            .and_then(|secret| secret.data)
            .and_then(|mut data| data.remove(key))
            .map(|value| value.0))
    }

    async fn create_usage(&self, usage: &ProviderConfigUsage) -> Result<()> {
        let api = Api::<ProviderConfigUsage>::namespaced(
            self.client.clone(),
            usage.namespace().as_deref().unwrap_or_default(),
        );

        match api.create(&PostParams::default(), usage).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) if response.code == 409 => {
                debug!(usage = %usage.name_any(), "usage marker already exists");
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }
}
