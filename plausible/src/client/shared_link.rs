use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Listed, PlausibleClient};
use crate::error::Result;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SharedLink {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub has_password: bool,
}

impl Listed for SharedLink {
    const COLLECTION: &'static str = "shared_links";
}

#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct CreateSharedLinkRequest {
    pub site_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for CreateSharedLinkRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateSharedLinkRequest")
            .field("site_id", &self.site_id)
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl PlausibleClient {
    pub async fn list_shared_links(&self, site_domain: &str) -> Result<Vec<SharedLink>> {
        self.list_all(&["sites", "shared-links"], &[("site_id", site_domain)])
            .await
    }

    pub async fn get_shared_link(
        &self,
        site_domain: &str,
        name: &str,
    ) -> Result<Option<SharedLink>> {
        Ok(self
            .list_shared_links(site_domain)
            .await?
            .into_iter()
            .find(|link| link.name == name))
    }

    /// Shared links are found or created by name.
    pub async fn create_shared_link(&self, request: &CreateSharedLinkRequest) -> Result<SharedLink> {
        self.send_json(Method::PUT, &["sites", "shared-links"], request)
            .await
    }

    pub async fn delete_shared_link(&self, site_domain: &str, name: &str) -> Result<()> {
        self.delete(
            &["sites", "shared-links", name],
            &[("site_id", site_domain)],
        )
        .await
    }
}
