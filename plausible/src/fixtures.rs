//! Records shared by the tests of the reconcilers.

use kube::core::ObjectMeta;
use plausible_crds::{
    v1beta1::{
        CustomProperty, CustomPropertyParameters, CustomPropertySpec, Goal, GoalParameters,
        GoalSpec, GoalType, Guest, GuestParameters, GuestSpec, SharedLink, SharedLinkParameters,
        SharedLinkSpec, Site, SiteParameters, SiteSpec, Team, TeamParameters, TeamSpec,
    },
    DeletionPolicy, ProviderConfigReference, EXTERNAL_NAME_ANNOTATION,
};

use crate::managed::Desired;

pub const NAMESPACE: &str = "analytics";

pub fn metadata(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(NAMESPACE.to_string()),
        uid: Some(format!("{name}-uid")),
        resource_version: Some(String::from("1")),
        ..Default::default()
    }
}

/// Set the external name annotation directly, as a previous tick would have.
pub fn annotate<K: kube::ResourceExt>(mut record: K, identity: &str) -> K {
    record
        .annotations_mut()
        .insert(EXTERNAL_NAME_ANNOTATION.to_string(), identity.to_string());
    record
}

pub fn site(domain: &str) -> Site {
    Site {
        metadata: metadata("example"),
        spec: SiteSpec {
            for_provider: SiteParameters {
                domain: domain.to_string(),
                new_domain: None,
                team_id: None,
                timezone: Some(String::from("UTC")),
            },
            provider_config_ref: Some(ProviderConfigReference::default()),
            deletion_policy: DeletionPolicy::Delete,
        },
        status: None,
    }
}

pub fn goal(site_domain: &str, goal_type: GoalType, target: &str) -> Goal {
    let (event_name, page_path) = match goal_type {
        GoalType::Event => (Some(target.to_string()), None),
        GoalType::Page => (None, Some(target.to_string())),
    };

    Goal {
        metadata: metadata("signup"),
        spec: GoalSpec {
            for_provider: GoalParameters {
                site_domain: Some(site_domain.to_string()),
                site_domain_ref: None,
                site_domain_selector: None,
                goal_type,
                event_name,
                page_path,
            },
            provider_config_ref: Some(ProviderConfigReference::default()),
            deletion_policy: DeletionPolicy::Delete,
        },
        status: None,
    }
}

pub fn guest(site_domain: &str, email: &str) -> Guest {
    Guest {
        metadata: metadata("alice"),
        spec: GuestSpec {
            for_provider: GuestParameters {
                site_domain: Some(site_domain.to_string()),
                site_domain_ref: None,
                site_domain_selector: None,
                email: email.to_string(),
                role: Some(String::from("viewer")),
            },
            provider_config_ref: Some(ProviderConfigReference::default()),
            deletion_policy: DeletionPolicy::Delete,
        },
        status: None,
    }
}

pub fn shared_link(site_domain: &str, name: &str) -> SharedLink {
    SharedLink {
        metadata: metadata("dashboard"),
        spec: SharedLinkSpec {
            for_provider: SharedLinkParameters {
                site_domain: Some(site_domain.to_string()),
                site_domain_ref: None,
                site_domain_selector: None,
                name: name.to_string(),
                password: None,
            },
            provider_config_ref: Some(ProviderConfigReference::default()),
            deletion_policy: DeletionPolicy::Delete,
        },
        status: None,
    }
}

pub fn custom_property(site_domain: &str, key: &str) -> CustomProperty {
    CustomProperty {
        metadata: metadata("plan"),
        spec: CustomPropertySpec {
            for_provider: CustomPropertyParameters {
                site_domain: Some(site_domain.to_string()),
                site_domain_ref: None,
                site_domain_selector: None,
                key: key.to_string(),
                description: None,
            },
            provider_config_ref: Some(ProviderConfigReference::default()),
            deletion_policy: DeletionPolicy::Delete,
        },
        status: None,
    }
}

pub fn team(team_id: Option<&str>) -> Team {
    Team {
        metadata: metadata("marketing"),
        spec: TeamSpec {
            for_provider: TeamParameters {
                team_id: team_id.map(str::to_string),
            },
            provider_config_ref: Some(ProviderConfigReference::default()),
            deletion_policy: DeletionPolicy::Delete,
        },
        status: None,
    }
}

pub fn desired<K: plausible_crds::Managed>(record: K) -> Desired<K> {
    Desired::new(record)
}
