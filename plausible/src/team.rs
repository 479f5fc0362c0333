use std::sync::Arc;

use async_trait::async_trait;
use plausible_crds::{
    v1beta1::{Team, TeamObservation},
    ExternalName,
};

use crate::{
    client::PlausibleClient,
    error::{Error, Result},
    managed::{Desired, External, ManagedKind, Observed},
    store::ClusterStore,
};

/// Teams are only observed. They cannot be created or deleted through the
/// Sites API.
pub struct TeamExternal {
    client: PlausibleClient,
}

impl ManagedKind for Team {
    type External = TeamExternal;

    fn external(client: PlausibleClient, _: Arc<dyn ClusterStore>) -> Self::External {
        TeamExternal { client }
    }
}

#[async_trait]
impl External for TeamExternal {
    type Kind = Team;

    async fn observe(&self, desired: &Desired<Team>) -> Result<Observed<TeamObservation>> {
        let team_id = desired.identity().map(ExternalName::as_str).or(desired
            .record()
            .spec
            .for_provider
            .team_id
            .as_deref()
            .filter(|id| !id.is_empty()));

        let Some(team_id) = team_id else {
            return Ok(Observed::Missing);
        };

        let Some(team) = self.client.get_team(team_id).await? else {
            return Ok(Observed::Missing);
        };

        Ok(Observed::Present {
            identity: ExternalName::new(team.id.as_str())
                .ok_or_else(|| Error::MissingIdentity(String::from("team without id")))?,
            up_to_date: true,
            at_provider: TeamObservation {
                id: team.id,
                name: team.name,
                api_enabled: team.api_enabled,
            },
        })
    }

    async fn create(&self, desired: &Desired<Team>) -> Result<ExternalName> {
        Err(Error::Validation(match &desired.record().spec.for_provider.team_id {
            Some(team_id) => format!("team {team_id} does not exist, teams cannot be created"),
            None => String::from("teamID is required, teams cannot be created"),
        }))
    }

    async fn update(&self, _: &Desired<Team>) -> Result<Option<ExternalName>> {
        Ok(None)
    }

    async fn delete(&self, _: &Desired<Team>) -> Result<()> {
        Ok(())
    }
}
