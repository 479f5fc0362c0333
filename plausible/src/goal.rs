use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use plausible_crds::{
    v1beta1::{Goal, GoalObservation, GoalParameters, GoalType},
    ExternalName,
};

use crate::{
    client::{self, CreateGoalRequest, PlausibleClient},
    error::{Error, Result},
    managed::{Desired, External, ManagedKind, Observed},
    reference::resolve_site_domain,
    store::ClusterStore,
};

pub struct GoalExternal {
    client: PlausibleClient,
    store: Arc<dyn ClusterStore>,
}

impl ManagedKind for Goal {
    type External = GoalExternal;

    fn external(client: PlausibleClient, store: Arc<dyn ClusterStore>) -> Self::External {
        GoalExternal { client, store }
    }
}

impl GoalExternal {
    async fn site_domain(&self, goal: &Goal) -> Result<String> {
        resolve_site_domain(
            self.store.as_ref(),
            &goal.namespace().unwrap_or_default(),
            &goal.spec.for_provider,
        )
        .await
    }
}

#[async_trait]
impl External for GoalExternal {
    type Kind = Goal;

    async fn observe(&self, desired: &Desired<Goal>) -> Result<Observed<GoalObservation>> {
        let parameters = &desired.record().spec.for_provider;
        let site_domain = self.site_domain(desired.record()).await?;

        let goal = match desired.identity() {
            Some(identity) => {
                self.client
                    .get_goal(&site_domain, identity.as_str())
                    .await?
            }
            None => self
                .client
                .list_goals(&site_domain)
                .await?
                .into_iter()
                .find(|goal| matches(parameters, goal)),
        };

        let Some(goal) = goal else {
            return Ok(Observed::Missing);
        };

        let identity = ExternalName::new(goal.id.as_str())
            .ok_or_else(|| Error::MissingIdentity(format!("goal of site {site_domain} without id")))?;

        // Goals cannot be changed after creation.
        Ok(Observed::Present {
            identity,
            up_to_date: true,
            at_provider: GoalObservation {
                id: goal.id,
                goal_type: goal.goal_type,
                event_name: goal.event_name,
                page_path: goal.page_path,
            },
        })
    }

    async fn create(&self, desired: &Desired<Goal>) -> Result<ExternalName> {
        let parameters = &desired.record().spec.for_provider;
        validate(parameters)?;

        let site_domain = self.site_domain(desired.record()).await?;

        let goal = self
            .client
            .create_goal(&CreateGoalRequest {
                site_id: site_domain.clone(),
                goal_type: parameters.goal_type.as_str().to_string(),
                event_name: parameters.event_name.clone(),
                page_path: parameters.page_path.clone(),
            })
            .await
            .map_err(|error| error.context(format!("cannot create goal for site {site_domain}")))?;

        ExternalName::new(goal.id)
            .ok_or_else(|| Error::MissingIdentity(format!("goal of site {site_domain} without id")))
    }

    async fn update(&self, _: &Desired<Goal>) -> Result<Option<ExternalName>> {
        Ok(None)
    }

    async fn delete(&self, desired: &Desired<Goal>) -> Result<()> {
        let identity = desired.require_identity()?;
        self.client.delete_goal(identity.as_str()).await
    }
}

/// Goals are identified by their type together with the event name or page
/// path.
fn matches(parameters: &GoalParameters, goal: &client::Goal) -> bool {
    if goal.goal_type != parameters.goal_type.as_str() {
        return false;
    }

    match parameters.goal_type {
        GoalType::Event => goal.event_name.as_deref() == parameters.event_name.as_deref(),
        GoalType::Page => goal.page_path.as_deref() == parameters.page_path.as_deref(),
    }
}

fn validate(parameters: &GoalParameters) -> Result<()> {
    if parameters.target().map_or(true, str::is_empty) {
        let field = match parameters.goal_type {
            GoalType::Event => "eventName",
            GoalType::Page => "pagePath",
        };

        return Err(Error::Validation(format!(
            "{field} is required for {} goals",
            parameters.goal_type
        )));
    }

    Ok(())
}
