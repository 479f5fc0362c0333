use std::sync::Arc;

use async_trait::async_trait;
use plausible_crds::{
    v1beta1::{Site, SiteObservation, SiteParameters},
    ExternalName,
};

use crate::{
    client::{self, CreateSiteRequest, PlausibleClient},
    error::{Error, Result},
    managed::{Desired, External, ManagedKind, Observed},
    store::ClusterStore,
};

pub struct SiteExternal {
    client: PlausibleClient,
}

impl ManagedKind for Site {
    type External = SiteExternal;

    fn external(client: PlausibleClient, _: Arc<dyn ClusterStore>) -> Self::External {
        SiteExternal { client }
    }
}

impl SiteExternal {
    /// Find a site by either its current or its intended domain, so a site
    /// renamed before the record was bound is still found.
    async fn discover(&self, parameters: &SiteParameters) -> Result<Option<client::Site>> {
        if let Some(site) = self.client.find_site_by_domain(&parameters.domain).await? {
            return Ok(Some(site));
        }

        match non_empty(parameters.new_domain.as_deref()) {
            Some(new_domain) => self.client.find_site_by_domain(new_domain).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl External for SiteExternal {
    type Kind = Site;

    async fn observe(&self, desired: &Desired<Site>) -> Result<Observed<SiteObservation>> {
        let parameters = &desired.record().spec.for_provider;

        let site = match desired.identity() {
            Some(identity) => self.client.get_site(identity.as_str()).await?,
            None => self.discover(parameters).await?,
        };

        let Some(site) = site else {
            return Ok(Observed::Missing);
        };

        Ok(Observed::Present {
            identity: identity_of(&site)?,
            up_to_date: is_up_to_date(parameters, &site),
            at_provider: SiteObservation {
                id: site.id,
                domain: site.domain,
                team_id: site.team_id,
                timezone: site.timezone,
            },
        })
    }

    async fn create(&self, desired: &Desired<Site>) -> Result<ExternalName> {
        let parameters = &desired.record().spec.for_provider;

        if parameters.domain.is_empty() {
            return Err(Error::Validation(String::from("domain is required")));
        }

        let site = self
            .client
            .create_site(&CreateSiteRequest {
                domain: parameters.domain.clone(),
                team_id: parameters.team_id.clone(),
                timezone: parameters.timezone.clone(),
            })
            .await
            .map_err(|error| error.context(format!("cannot create site {}", parameters.domain)))?;

        identity_of(&site)
    }

    /// Only the domain of a site can change.
    async fn update(&self, desired: &Desired<Site>) -> Result<Option<ExternalName>> {
        let identity = desired.require_identity()?;

        let Some(new_domain) = non_empty(desired.record().spec.for_provider.new_domain.as_deref())
        else {
            return Ok(None);
        };

        let site = self
            .client
            .rename_site(identity.as_str(), new_domain)
            .await
            .map_err(|error| error.context(format!("cannot rename site {identity}")))?;

        identity_of(&site).map(Some)
    }

    async fn delete(&self, desired: &Desired<Site>) -> Result<()> {
        let identity = desired.require_identity()?;
        self.client.delete_site(identity.as_str()).await
    }
}

/// Team and timezone cannot be changed once a site exists, so only a
/// pending rename counts as drift.
fn is_up_to_date(parameters: &SiteParameters, site: &client::Site) -> bool {
    match non_empty(parameters.new_domain.as_deref()) {
        Some(new_domain) => new_domain == site.domain,
        None => true,
    }
}

fn identity_of(site: &client::Site) -> Result<ExternalName> {
    ExternalName::new(site.identity())
        .ok_or_else(|| Error::MissingIdentity(String::from("site without id or domain")))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use plausible_crds::{condition::reason, ConditionStatus, ConditionType, DeletionPolicy};
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::SiteExternal;
    use crate::{
        client::tests::client_for,
        error::Error,
        fixtures,
        managed::{finalize, sync, Desired, External, Observed, Outcome},
    };

    fn external(server: &MockServer) -> SiteExternal {
        SiteExternal {
            client: client_for(server),
        }
    }

    #[tokio::test]
    async fn test_create_missing_site() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sites": [{"id": "other.com", "domain": "other.com"}],
                "meta": {}
            })))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v1/sites"))
            .and(body_json(json!({"domain": "example.com", "timezone": "UTC"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "example.com",
                "domain": "example.com",
                "timezone": "UTC"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites/example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "example.com",
                "domain": "example.com",
                "timezone": "UTC"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let external = external(&server);
        let mut desired = fixtures::desired(fixtures::site("example.com"));

        assert_eq!(external.observe(&desired).await.unwrap(), Observed::Missing);

        assert_eq!(
            sync(&external, &mut desired).await.unwrap(),
            Outcome::Created
        );
        assert_eq!(desired.identity().unwrap().as_str(), "example.com");

        let ready = desired
            .status_mut()
            .condition(ConditionType::Ready)
            .cloned()
            .unwrap();
        assert_eq!(ready.reason, reason::CREATING);

        // The next tick finds the site through its external name.
        let mut desired = Desired::new(desired.record().clone());
        assert_eq!(
            sync(&external, &mut desired).await.unwrap(),
            Outcome::UpToDate
        );
        assert!(!desired.identity_changed());

        let status = desired.record().status.as_ref().unwrap();
        assert_eq!(status.at_provider.as_ref().unwrap().timezone.as_deref(), Some("UTC"));

        let ready = status.condition(ConditionType::Ready).unwrap();
        assert_eq!(ready.status, ConditionStatus::True);
        assert_eq!(ready.reason, reason::AVAILABLE);
    }

    #[tokio::test]
    async fn test_discovery_then_identity_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sites": [{"id": "example.com", "domain": "example.com", "team_id": "team-1"}],
                "meta": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites/example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "example.com",
                "domain": "example.com",
                "team_id": "team-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let external = external(&server);

        // Team differs from the remote site, but can never drift.
        let mut desired = fixtures::desired(fixtures::site("example.com"));
        let first = external.observe(&desired).await.unwrap();

        let Observed::Present {
            identity,
            up_to_date,
            ..
        } = first.clone()
        else {
            panic!("expected site to be discovered, got {first:?}");
        };
        assert!(up_to_date);
        desired.adopt(identity);

        let second = external.observe(&desired).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_discovery_matches_new_domain() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sites": [{"id": "example.org", "domain": "example.org"}],
                "meta": {}
            })))
            .mount(&server)
            .await;

        let mut site = fixtures::site("example.com");
        site.spec.for_provider.new_domain = Some(String::from("example.org"));

        let observed = external(&server)
            .observe(&fixtures::desired(site))
            .await
            .unwrap();

        assert!(matches!(
            observed,
            Observed::Present {
                up_to_date: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_rename() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites/example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "example.com",
                "domain": "example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/sites/example.com"))
            .and(body_json(json!({"domain": "example.org"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "example.org",
                "domain": "example.org"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites/example.org"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "example.org",
                "domain": "example.org"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let external = external(&server);

        let mut site = fixtures::annotate(fixtures::site("example.com"), "example.com");
        site.spec.for_provider.new_domain = Some(String::from("example.org"));
        let mut desired = fixtures::desired(site);

        assert_eq!(
            sync(&external, &mut desired).await.unwrap(),
            Outcome::Updated
        );
        assert_eq!(desired.identity().unwrap().as_str(), "example.org");
        assert!(desired.identity_changed());

        let mut desired = Desired::new(desired.record().clone());
        assert_eq!(
            sync(&external, &mut desired).await.unwrap(),
            Outcome::UpToDate
        );
    }

    #[tokio::test]
    async fn test_bound_site_gone_is_missing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites/example.com"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Site not found"))
            .mount(&server)
            .await;

        let desired = fixtures::desired(fixtures::annotate(
            fixtures::site("example.com"),
            "example.com",
        ));

        assert_eq!(
            external(&server).observe(&desired).await.unwrap(),
            Observed::Missing
        );
    }

    #[tokio::test]
    async fn test_remote_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites/example.com"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let mut desired = fixtures::desired(fixtures::annotate(
            fixtures::site("example.com"),
            "example.com",
        ));

        let error = sync(&external(&server), &mut desired).await.unwrap_err();

        assert!(matches!(error, Error::Api { status: 500, .. }));
        assert!(desired.record().status.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/sites/example.com"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Site not found"))
            .expect(1)
            .mount(&server)
            .await;

        let mut desired = fixtures::desired(fixtures::annotate(
            fixtures::site("example.com"),
            "example.com",
        ));

        finalize(&external(&server), &mut desired).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unbound_site_discovers_first() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sites": [{"id": "example.com", "domain": "example.com"}],
                "meta": {}
            })))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/sites/example.com"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut desired = fixtures::desired(fixtures::site("example.com"));
        finalize(&external(&server), &mut desired).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unbound_missing_site() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sites": [],
                "meta": {}
            })))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let mut desired = fixtures::desired(fixtures::site("example.com"));
        finalize(&external(&server), &mut desired).await.unwrap();
    }

    #[tokio::test]
    async fn test_orphan_skips_remote_delete() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let mut site = fixtures::annotate(fixtures::site("example.com"), "example.com");
        site.spec.deletion_policy = DeletionPolicy::Orphan;

        finalize(&external(&server), &mut fixtures::desired(site))
            .await
            .unwrap();
    }
}
