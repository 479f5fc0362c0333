use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use plausible_crds::{
    v1beta1::{SharedLink, SharedLinkObservation},
    ExternalName,
};

use crate::{
    client::{CreateSharedLinkRequest, PlausibleClient},
    error::{Error, Result},
    managed::{Desired, External, ManagedKind, Observed},
    reference::{resolve_site_domain, resolve_site_domain_for_deletion},
    store::ClusterStore,
};

pub struct SharedLinkExternal {
    client: PlausibleClient,
    store: Arc<dyn ClusterStore>,
}

impl ManagedKind for SharedLink {
    type External = SharedLinkExternal;

    fn external(client: PlausibleClient, store: Arc<dyn ClusterStore>) -> Self::External {
        SharedLinkExternal { client, store }
    }
}

impl SharedLinkExternal {
    async fn site_domain(&self, link: &SharedLink) -> Result<String> {
        resolve_site_domain(
            self.store.as_ref(),
            &link.namespace().unwrap_or_default(),
            &link.spec.for_provider,
        )
        .await
    }

    async fn site_domain_for_deletion(&self, link: &SharedLink) -> Result<String> {
        let recorded = link
            .status
            .as_ref()
            .and_then(|status| status.at_provider.as_ref())
            .map(|observation| observation.site_domain.as_str());

        resolve_site_domain_for_deletion(
            self.store.as_ref(),
            &link.namespace().unwrap_or_default(),
            &link.spec.for_provider,
            recorded,
        )
        .await
    }
}

#[async_trait]
impl External for SharedLinkExternal {
    type Kind = SharedLink;

    async fn observe(
        &self,
        desired: &Desired<SharedLink>,
    ) -> Result<Observed<SharedLinkObservation>> {
        let site_domain = self.site_domain(desired.record()).await?;
        let name = desired
            .identity()
            .map(ExternalName::as_str)
            .unwrap_or(desired.record().spec.for_provider.name.as_str());

        let Some(link) = self.client.get_shared_link(&site_domain, name).await? else {
            return Ok(Observed::Missing);
        };

        Ok(Observed::Present {
            identity: ExternalName::new(link.name.as_str())
                .ok_or_else(|| Error::MissingIdentity(String::from("shared link without name")))?,
            // The password is write-only, so it cannot be compared.
            up_to_date: true,
            at_provider: SharedLinkObservation {
                name: link.name,
                site_domain,
                url: link.url,
                has_password: link.has_password,
            },
        })
    }

    async fn create(&self, desired: &Desired<SharedLink>) -> Result<ExternalName> {
        let parameters = &desired.record().spec.for_provider;

        if parameters.name.is_empty() {
            return Err(Error::Validation(String::from("name is required")));
        }

        let site_domain = self.site_domain(desired.record()).await?;

        let link = self
            .client
            .create_shared_link(&CreateSharedLinkRequest {
                site_id: site_domain.clone(),
                name: parameters.name.clone(),
                password: parameters.password.clone(),
            })
            .await
            .map_err(|error| {
                error.context(format!(
                    "cannot create shared link {} for site {site_domain}",
                    parameters.name
                ))
            })?;

        let name = if link.name.is_empty() {
            parameters.name.clone()
        } else {
            link.name
        };

        ExternalName::new(name)
            .ok_or_else(|| Error::MissingIdentity(String::from("shared link without name")))
    }

    async fn update(&self, _: &Desired<SharedLink>) -> Result<Option<ExternalName>> {
        Ok(None)
    }

    async fn delete(&self, desired: &Desired<SharedLink>) -> Result<()> {
        let identity = desired.require_identity()?;
        let site_domain = self.site_domain_for_deletion(desired.record()).await?;

        self.client
            .delete_shared_link(&site_domain, identity.as_str())
            .await
    }
}
