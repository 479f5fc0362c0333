use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ProviderConfigReference, SecretKeySelector};

/// Connection settings for one Plausible account. Cluster scoped, shared by
/// every record that references it.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[kube(
    group = "plausible.crossplane.io",
    version = "v1beta1",
    kind = "ProviderConfig"
)]
#[kube(printcolumn = r#"{"name":"base url", "jsonPath": ".spec.baseURL", "type": "string"}"#)]
#[kube(
    printcolumn = r#"{"name":"secret", "jsonPath": ".spec.credentials.secretRef.name", "type": "string"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigSpec {
    /// Base URL of the Plausible instance. Defaults to Plausible Cloud.
    #[serde(default, rename = "baseURL", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    pub credentials: ProviderCredentials,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, JsonSchema, PartialEq, Eq)]
pub enum CredentialsSource {
    #[default]
    Secret,
    None,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    #[serde(default)]
    pub source: CredentialsSource,

    /// Secret key holding a JSON document of the form `{"apiKey": "..."}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretKeySelector>,
}

/// Marks a record as a user of a ProviderConfig. Owned by the record, so it
/// is garbage collected together with it.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[kube(
    group = "plausible.crossplane.io",
    version = "v1beta1",
    kind = "ProviderConfigUsage",
    namespaced
)]
#[kube(
    printcolumn = r#"{"name":"config", "jsonPath": ".spec.providerConfigRef.name", "type": "string"}"#
)]
#[kube(
    printcolumn = r#"{"name":"resource-kind", "jsonPath": ".spec.resourceRef.kind", "type": "string"}"#
)]
#[kube(
    printcolumn = r#"{"name":"resource-name", "jsonPath": ".spec.resourceRef.name", "type": "string"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigUsageSpec {
    pub provider_config_ref: ProviderConfigReference,
    pub resource_ref: TypedReference,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypedReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}
