use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{DeletionPolicy, ManagedStatus, ProviderConfigReference, Reference, Selector};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[kube(
    group = "plausible.crossplane.io",
    version = "v1beta1",
    kind = "SharedLink",
    namespaced
)]
#[kube(status = "SharedLinkStatus")]
#[kube(
    printcolumn = r#"{"name":"ready", "jsonPath": ".status.conditions[?(@.type=='Ready')].status", "type": "string"}"#
)]
#[kube(
    printcolumn = r#"{"name":"synced", "jsonPath": ".status.conditions[?(@.type=='Synced')].status", "type": "string"}"#
)]
#[kube(printcolumn = r#"{"name":"url", "jsonPath": ".status.atProvider.url", "type": "string"}"#)]
#[serde(rename_all = "camelCase")]
pub struct SharedLinkSpec {
    pub for_provider: SharedLinkParameters,
    #[serde(default)]
    pub provider_config_ref: Option<ProviderConfigReference>,
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SharedLinkParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain_ref: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain_selector: Option<Selector>,

    /// Name of the link, unique within its site.
    pub name: String,

    /// Password viewers have to enter. Only sent on creation, the API never
    /// returns it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SharedLinkObservation {
    pub name: String,
    /// Domain of the site the object was last observed under.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub site_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub has_password: bool,
}

pub type SharedLinkStatus = ManagedStatus<SharedLinkObservation>;

crate::managed!(SharedLink, SharedLinkObservation);
crate::site_dependent!(SharedLinkParameters);
