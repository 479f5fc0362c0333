use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{DeletionPolicy, ManagedStatus, ProviderConfigReference, Reference, Selector};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[kube(
    group = "plausible.crossplane.io",
    version = "v1beta1",
    kind = "Guest",
    namespaced
)]
#[kube(status = "GuestStatus")]
#[kube(
    printcolumn = r#"{"name":"ready", "jsonPath": ".status.conditions[?(@.type=='Ready')].status", "type": "string"}"#
)]
#[kube(
    printcolumn = r#"{"name":"synced", "jsonPath": ".status.conditions[?(@.type=='Synced')].status", "type": "string"}"#
)]
#[kube(printcolumn = r#"{"name":"email", "jsonPath": ".spec.forProvider.email", "type": "string"}"#)]
#[kube(printcolumn = r#"{"name":"status", "jsonPath": ".status.atProvider.status", "type": "string"}"#)]
#[serde(rename_all = "camelCase")]
pub struct GuestSpec {
    pub for_provider: GuestParameters,
    #[serde(default)]
    pub provider_config_ref: Option<ProviderConfigReference>,
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GuestParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain_ref: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain_selector: Option<Selector>,

    /// Address the invitation is sent to.
    pub email: String,

    /// `viewer` or `editor`. Fixed at invitation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GuestObservation {
    pub email: String,
    /// Domain of the site the object was last observed under.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub site_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invited_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
}

pub type GuestStatus = ManagedStatus<GuestObservation>;

crate::managed!(Guest, GuestObservation);
crate::site_dependent!(GuestParameters);
