use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Listed, PlausibleClient};
use crate::error::Result;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Site {
    /// Some Plausible versions omit the id, in which case the domain is the
    /// site's identifier.
    #[serde(default)]
    pub id: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Site {
    pub fn identity(&self) -> &str {
        if self.id.is_empty() {
            &self.domain
        } else {
            &self.id
        }
    }
}

impl Listed for Site {
    const COLLECTION: &'static str = "sites";
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateSiteRequest {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Serialize)]
struct RenameSiteRequest<'a> {
    domain: &'a str,
}

impl PlausibleClient {
    pub async fn get_site(&self, id: &str) -> Result<Option<Site>> {
        self.get_optional(&["sites", id]).await
    }

    pub async fn list_sites(&self) -> Result<Vec<Site>> {
        self.list_all(&["sites"], &[]).await
    }

    /// There is no lookup by domain, so this scans every site.
    pub async fn find_site_by_domain(&self, domain: &str) -> Result<Option<Site>> {
        Ok(self
            .list_sites()
            .await?
            .into_iter()
            .find(|site| site.domain == domain))
    }

    pub async fn create_site(&self, request: &CreateSiteRequest) -> Result<Site> {
        self.send_json(Method::POST, &["sites"], request).await
    }

    /// Change the domain of a site. Nothing else about a site can be changed.
    pub async fn rename_site(&self, id: &str, new_domain: &str) -> Result<Site> {
        self.send_json(
            Method::PUT,
            &["sites", id],
            &RenameSiteRequest { domain: new_domain },
        )
        .await
    }

    pub async fn delete_site(&self, id: &str) -> Result<()> {
        self.delete(&["sites", id], &[]).await
    }
}
