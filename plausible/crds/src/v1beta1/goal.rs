use std::fmt::Display;

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{DeletionPolicy, ManagedStatus, ProviderConfigReference, Reference, Selector};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[kube(
    group = "plausible.crossplane.io",
    version = "v1beta1",
    kind = "Goal",
    namespaced
)]
#[kube(status = "GoalStatus")]
#[kube(
    printcolumn = r#"{"name":"ready", "jsonPath": ".status.conditions[?(@.type=='Ready')].status", "type": "string"}"#
)]
#[kube(
    printcolumn = r#"{"name":"synced", "jsonPath": ".status.conditions[?(@.type=='Synced')].status", "type": "string"}"#
)]
#[kube(
    printcolumn = r#"{"name":"external-name", "jsonPath": ".metadata.annotations.crossplane\\.io/external-name", "type": "string"}"#
)]
#[kube(printcolumn = r#"{"name":"type", "jsonPath": ".spec.forProvider.goalType", "type": "string"}"#)]
#[serde(rename_all = "camelCase")]
pub struct GoalSpec {
    pub for_provider: GoalParameters,
    #[serde(default)]
    pub provider_config_ref: Option<ProviderConfigReference>,
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, JsonSchema, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Event,
    Page,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Event => "event",
            GoalType::Page => "page",
        }
    }
}

impl Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Goals cannot be changed once created. Every field here is either part of
/// the goal's identity or names the site it belongs to.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoalParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain_ref: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_domain_selector: Option<Selector>,

    pub goal_type: GoalType,

    /// Required for `event` goals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    /// Required for `page` goals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_path: Option<String>,
}

impl GoalParameters {
    /// The event name or page path, depending on the goal type.
    pub fn target(&self) -> Option<&str> {
        match self.goal_type {
            GoalType::Event => self.event_name.as_deref(),
            GoalType::Page => self.page_path.as_deref(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoalObservation {
    pub id: String,
    pub goal_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_path: Option<String>,
}

pub type GoalStatus = ManagedStatus<GoalObservation>;

crate::managed!(Goal, GoalObservation);
crate::site_dependent!(GoalParameters);

impl Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}",
            self.namespace().unwrap_or_default(),
            self.name_any()
        )
    }
}
