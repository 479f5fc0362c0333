use plausible_crds::SiteDependent;
use tracing::debug;

use crate::{
    error::{Error, Result},
    store::ClusterStore,
};

/// Domain of the site a dependent record belongs to.
///
/// A literal `siteDomain` wins. Otherwise `siteDomainRef` names a Site record
/// in the dependent's namespace, whose current domain is used, so dependents
/// follow a renamed site. Selectors are not supported.
pub async fn resolve_site_domain(
    store: &dyn ClusterStore,
    namespace: &str,
    dependent: &(impl SiteDependent + Sync),
) -> Result<String> {
    if let Some(domain) = dependent.site_domain().filter(|domain| !domain.is_empty()) {
        return Ok(domain.to_string());
    }

    if let Some(reference) = dependent.site_domain_ref() {
        let site = store
            .get_site(namespace, &reference.name)
            .await
            .map_err(|error| {
                Error::Reference(format!("cannot get referenced Site {reference}: {error}"))
            })?
            .ok_or_else(|| {
                Error::Reference(format!("referenced Site {namespace}/{reference} not found"))
            })?;

        return Ok(site.current_domain().to_string());
    }

    if dependent.site_domain_selector().is_some() {
        return Err(Error::Reference(String::from(
            "site domain selector is not supported",
        )));
    }

    Err(Error::Reference(String::from("no site domain specified")))
}

/// Domain to delete a dependent under.
///
/// Once the referenced Site record is gone the site can no longer be
/// resolved, and the domain `recorded` by the last observation is used
/// instead.
pub async fn resolve_site_domain_for_deletion(
    store: &dyn ClusterStore,
    namespace: &str,
    dependent: &(impl SiteDependent + Sync),
    recorded: Option<&str>,
) -> Result<String> {
    match resolve_site_domain(store, namespace, dependent).await {
        Err(Error::Reference(reason)) => match recorded.filter(|domain| !domain.is_empty()) {
            Some(domain) => {
                debug!(%reason, domain, "deleting under last observed site domain");
                Ok(domain.to_string())
            }
            None => Err(Error::Reference(reason)),
        },
        result => result,
    }
}
