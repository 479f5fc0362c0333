use std::fmt::Display;

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{DeletionPolicy, ManagedStatus, ProviderConfigReference};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[kube(
    group = "plausible.crossplane.io",
    version = "v1beta1",
    kind = "Site",
    namespaced
)]
#[kube(status = "SiteStatus")]
#[kube(
    printcolumn = r#"{"name":"ready", "jsonPath": ".status.conditions[?(@.type=='Ready')].status", "type": "string"}"#
)]
#[kube(
    printcolumn = r#"{"name":"synced", "jsonPath": ".status.conditions[?(@.type=='Synced')].status", "type": "string"}"#
)]
#[kube(
    printcolumn = r#"{"name":"external-name", "jsonPath": ".metadata.annotations.crossplane\\.io/external-name", "type": "string"}"#
)]
#[kube(printcolumn = r#"{"name":"domain", "jsonPath": ".status.atProvider.domain", "type": "string"}"#)]
#[serde(rename_all = "camelCase")]
pub struct SiteSpec {
    pub for_provider: SiteParameters,
    #[serde(default)]
    pub provider_config_ref: Option<ProviderConfigReference>,
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteParameters {
    /// Domain of the site, without protocol or `www.` prefix. This is the
    /// natural key used to find an existing site.
    pub domain: String,

    /// Renames the site. Setting this to anything but the observed domain
    /// marks the site as drifted, and the next update changes the domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_domain: Option<String>,

    /// Team the site is created in. Cannot be changed after creation.
    #[serde(default, rename = "teamID", skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,

    /// Reporting timezone, e.g. `Europe/London`. Cannot be changed after
    /// creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteObservation {
    pub id: String,
    pub domain: String,
    #[serde(default, rename = "teamID", skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

pub type SiteStatus = ManagedStatus<SiteObservation>;

crate::managed!(Site, SiteObservation);

impl Site {
    /// The domain the site should end up with once reconciled.
    pub fn target_domain(&self) -> &str {
        self.spec
            .for_provider
            .new_domain
            .as_deref()
            .filter(|domain| !domain.is_empty())
            .unwrap_or(&self.spec.for_provider.domain)
    }

    /// The domain the site is known by remotely. The last observed domain
    /// wins, followed by the target domain for sites not yet observed.
    pub fn current_domain(&self) -> &str {
        self.status
            .as_ref()
            .and_then(|status| status.at_provider.as_ref())
            .map(|observation| observation.domain.as_str())
            .filter(|domain| !domain.is_empty())
            .unwrap_or_else(|| self.target_domain())
    }
}

impl Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}",
            self.namespace().unwrap_or_default(),
            self.name_any()
        )
    }
}
