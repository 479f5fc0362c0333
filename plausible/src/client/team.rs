use serde::{Deserialize, Serialize};

use super::{Listed, PlausibleClient};
use crate::error::Result;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub api_enabled: bool,
}

impl Listed for Team {
    const COLLECTION: &'static str = "teams";
}

impl PlausibleClient {
    /// Teams the API key has access to.
    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        self.list_all(&["sites", "teams"], &[]).await
    }

    pub async fn get_team(&self, id: &str) -> Result<Option<Team>> {
        Ok(self
            .list_teams()
            .await?
            .into_iter()
            .find(|team| team.id == id))
    }
}
