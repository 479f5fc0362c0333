use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{DeletionPolicy, ManagedStatus, ProviderConfigReference, Reference, Selector};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[kube(
    group = "plausible.crossplane.io",
    version = "v1beta1",
    kind = "CustomProperty",
    namespaced
)]
#[kube(status = "CustomPropertyStatus")]
#[kube(
    printcolumn = r#"{"name":"ready", "jsonPath": ".status.conditions[?(@.type=='Ready')].status", "type": "string"}"#
)]
#[kube(
    printcolumn = r#"{"name":"synced", "jsonPath": ".status.conditions[?(@.type=='Synced')].status", "type": "string"}"#
)]
#[kube(printcolumn = r#"{"name":"key", "jsonPath": ".spec.forProvider.key", "type": "string"}"#)]
#[serde(rename_all = "camelCase")]
pub struct CustomPropertySpec {
    pub for_provider: CustomPropertyParameters,
    #[serde(default)]
    pub provider_config_ref: Option<ProviderConfigReference>,
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomPropertyParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain_ref: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain_selector: Option<Selector>,

    /// Property key as sent with tracked events.
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomPropertyObservation {
    pub key: String,
    /// Domain of the site the object was last observed under.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub site_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
}

pub type CustomPropertyStatus = ManagedStatus<CustomPropertyObservation>;

crate::managed!(CustomProperty, CustomPropertyObservation);
crate::site_dependent!(CustomPropertyParameters);
