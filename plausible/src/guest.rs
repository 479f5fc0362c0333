use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use plausible_crds::{
    v1beta1::{Guest, GuestObservation},
    ExternalName,
};

use crate::{
    client::{InviteGuestRequest, PlausibleClient},
    error::{Error, Result},
    managed::{Desired, External, ManagedKind, Observed},
    reference::{resolve_site_domain, resolve_site_domain_for_deletion},
    store::ClusterStore,
};

pub struct GuestExternal {
    client: PlausibleClient,
    store: Arc<dyn ClusterStore>,
}

impl ManagedKind for Guest {
    type External = GuestExternal;

    fn external(client: PlausibleClient, store: Arc<dyn ClusterStore>) -> Self::External {
        GuestExternal { client, store }
    }
}

impl GuestExternal {
    async fn site_domain(&self, guest: &Guest) -> Result<String> {
        resolve_site_domain(
            self.store.as_ref(),
            &guest.namespace().unwrap_or_default(),
            &guest.spec.for_provider,
        )
        .await
    }

    async fn site_domain_for_deletion(&self, guest: &Guest) -> Result<String> {
        let recorded = guest
            .status
            .as_ref()
            .and_then(|status| status.at_provider.as_ref())
            .map(|observation| observation.site_domain.as_str());

        resolve_site_domain_for_deletion(
            self.store.as_ref(),
            &guest.namespace().unwrap_or_default(),
            &guest.spec.for_provider,
            recorded,
        )
        .await
    }
}

/// Guests are keyed by email within a site. Role and invitation state are
/// reported but never changed.
#[async_trait]
impl External for GuestExternal {
    type Kind = Guest;

    async fn observe(&self, desired: &Desired<Guest>) -> Result<Observed<GuestObservation>> {
        let site_domain = self.site_domain(desired.record()).await?;
        let email = desired
            .identity()
            .map(ExternalName::as_str)
            .unwrap_or(desired.record().spec.for_provider.email.as_str());

        let Some(guest) = self.client.get_guest(&site_domain, email).await? else {
            return Ok(Observed::Missing);
        };

        Ok(Observed::Present {
            identity: ExternalName::new(guest.email.as_str())
                .ok_or_else(|| Error::MissingIdentity(String::from("guest without email")))?,
            up_to_date: true,
            at_provider: GuestObservation {
                email: guest.email,
                site_domain,
                role: guest.role,
                status: guest.status,
                invited_at: guest.invited_at,
                accepted_at: guest.accepted_at,
            },
        })
    }

    async fn create(&self, desired: &Desired<Guest>) -> Result<ExternalName> {
        let parameters = &desired.record().spec.for_provider;

        if parameters.email.is_empty() {
            return Err(Error::Validation(String::from("email is required")));
        }

        let site_domain = self.site_domain(desired.record()).await?;

        let guest = self
            .client
            .invite_guest(&InviteGuestRequest {
                site_id: site_domain.clone(),
                email: parameters.email.clone(),
                role: parameters.role.clone(),
            })
            .await
            .map_err(|error| {
                error.context(format!(
                    "cannot invite {} to site {site_domain}",
                    parameters.email
                ))
            })?;

        let email = if guest.email.is_empty() {
            parameters.email.clone()
        } else {
            guest.email
        };

        ExternalName::new(email)
            .ok_or_else(|| Error::MissingIdentity(String::from("guest without email")))
    }

    async fn update(&self, _: &Desired<Guest>) -> Result<Option<ExternalName>> {
        Ok(None)
    }

    async fn delete(&self, desired: &Desired<Guest>) -> Result<()> {
        let identity = desired.require_identity()?;
        let site_domain = self.site_domain_for_deletion(desired.record()).await?;

        self.client
            .delete_guest(&site_domain, identity.as_str())
            .await
    }
}
