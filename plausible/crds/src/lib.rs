use std::{
    collections::BTreeMap,
    fmt::{Debug, Display},
};

use kube::{core::NamespaceResourceScope, Resource, ResourceExt};
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub mod condition;
pub mod v1beta1;

pub use condition::{Condition, ConditionStatus, ConditionType};

/// Annotation holding the identity of the remote object a record is bound to.
pub const EXTERNAL_NAME_ANNOTATION: &str = "crossplane.io/external-name";

pub const API_GROUP: &str = "plausible.crossplane.io";

/// Durable correlation key between a record and its remote counterpart.
///
/// Stored as the [`EXTERNAL_NAME_ANNOTATION`] on the record, but handled as
/// a typed value everywhere else. An empty annotation is treated as unset.
#[derive(Serialize, Deserialize, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ExternalName(String);

impl ExternalName {
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(ExternalName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read the identity annotation of any kubernetes object.
    pub fn of<K: ResourceExt>(object: &K) -> Option<Self> {
        object
            .annotations()
            .get(EXTERNAL_NAME_ANNOTATION)
            .and_then(|name| ExternalName::new(name.as_str()))
    }

    /// Write this identity into an object's annotations.
    pub fn apply_to<K: ResourceExt>(&self, object: &mut K) {
        object
            .annotations_mut()
            .insert(EXTERNAL_NAME_ANNOTATION.to_string(), self.0.clone());
    }
}

impl Display for ExternalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happens to the remote object when its record is deleted.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, JsonSchema, Hash, PartialEq, Eq,
)]
pub enum DeletionPolicy {
    #[default]
    Delete,
    Orphan,
}

/// Reference to the cluster-scoped `ProviderConfig` a record is reconciled with.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Hash, PartialEq, Eq)]
pub struct ProviderConfigReference {
    pub name: String,
}

impl Default for ProviderConfigReference {
    fn default() -> Self {
        ProviderConfigReference {
            name: String::from("default"),
        }
    }
}

/// Reference to another record by name, within the referencing record's namespace.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Hash, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
}

impl Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Label selector for another record.
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub match_controller_ref: Option<bool>,
}

/// Points at a single key within a kubernetes Secret.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Hash, PartialEq, Eq)]
pub struct SecretKeySelector {
    pub name: String,
    pub namespace: String,
    pub key: String,
}

impl Display for SecretKeySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}[{}]", self.namespace, self.name, self.key)
    }
}

/// Status shared by every managed record: conditions plus the last
/// successful observation of the remote object.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedStatus<O> {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<O>,
}

impl<O> Default for ManagedStatus<O> {
    fn default() -> Self {
        ManagedStatus {
            conditions: Vec::new(),
            at_provider: None,
        }
    }
}

impl<O> ManagedStatus<O> {
    pub fn condition(&self, type_: ConditionType) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|condition| condition.type_ == type_)
    }

    pub fn set_condition(&mut self, condition: Condition) {
        condition::merge(&mut self.conditions, condition)
    }
}

/// A record whose desired state is reconciled against a remote object.
pub trait Managed:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Snapshot of remote attributes mirrored into `status.atProvider`.
    type Observation: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    fn provider_config_ref(&self) -> Option<&ProviderConfigReference>;

    fn deletion_policy(&self) -> DeletionPolicy;

    fn managed_status(&self) -> Option<&ManagedStatus<Self::Observation>>;

    fn managed_status_mut(&mut self) -> &mut ManagedStatus<Self::Observation>;
}

/// A record that depends on a Site, naming it in one of three ways.
pub trait SiteDependent {
    fn site_domain(&self) -> Option<&str>;

    fn site_domain_ref(&self) -> Option<&Reference>;

    fn site_domain_selector(&self) -> Option<&Selector>;
}

macro_rules! managed {
    ($kind:ty, $observation:ty) => {
        impl $crate::Managed for $kind {
            type Observation = $observation;

            fn provider_config_ref(&self) -> Option<&$crate::ProviderConfigReference> {
                self.spec.provider_config_ref.as_ref()
            }

            fn deletion_policy(&self) -> $crate::DeletionPolicy {
                self.spec.deletion_policy
            }

            fn managed_status(&self) -> Option<&$crate::ManagedStatus<Self::Observation>> {
                self.status.as_ref()
            }

            fn managed_status_mut(&mut self) -> &mut $crate::ManagedStatus<Self::Observation> {
                self.status.get_or_insert_with(Default::default)
            }
        }
    };
}

macro_rules! site_dependent {
    ($parameters:ty) => {
        impl $crate::SiteDependent for $parameters {
            fn site_domain(&self) -> Option<&str> {
                self.site_domain.as_deref()
            }

            fn site_domain_ref(&self) -> Option<&$crate::Reference> {
                self.site_domain_ref.as_ref()
            }

            fn site_domain_selector(&self) -> Option<&$crate::Selector> {
                self.site_domain_selector.as_ref()
            }
        }
    };
}

pub(crate) use managed;
pub(crate) use site_dependent;
