use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use plausible_crds::{
    v1beta1::{CustomProperty, CustomPropertyObservation},
    ExternalName,
};

use crate::{
    client::{CreateCustomPropertyRequest, PlausibleClient},
    error::{Error, Result},
    managed::{Desired, External, ManagedKind, Observed},
    reference::{resolve_site_domain, resolve_site_domain_for_deletion},
    store::ClusterStore,
};

pub struct CustomPropertyExternal {
    client: PlausibleClient,
    store: Arc<dyn ClusterStore>,
}

impl ManagedKind for CustomProperty {
    type External = CustomPropertyExternal;

    fn external(client: PlausibleClient, store: Arc<dyn ClusterStore>) -> Self::External {
        CustomPropertyExternal { client, store }
    }
}

impl CustomPropertyExternal {
    async fn site_domain(&self, property: &CustomProperty) -> Result<String> {
        resolve_site_domain(
            self.store.as_ref(),
            &property.namespace().unwrap_or_default(),
            &property.spec.for_provider,
        )
        .await
    }

    async fn site_domain_for_deletion(&self, property: &CustomProperty) -> Result<String> {
        let recorded = property
            .status
            .as_ref()
            .and_then(|status| status.at_provider.as_ref())
            .map(|observation| observation.site_domain.as_str());

        resolve_site_domain_for_deletion(
            self.store.as_ref(),
            &property.namespace().unwrap_or_default(),
            &property.spec.for_provider,
            recorded,
        )
        .await
    }
}

#[async_trait]
impl External for CustomPropertyExternal {
    type Kind = CustomProperty;

    async fn observe(
        &self,
        desired: &Desired<CustomProperty>,
    ) -> Result<Observed<CustomPropertyObservation>> {
        let site_domain = self.site_domain(desired.record()).await?;
        let key = desired
            .identity()
            .map(ExternalName::as_str)
            .unwrap_or(desired.record().spec.for_provider.key.as_str());

        let Some(property) = self.client.get_custom_property(&site_domain, key).await? else {
            return Ok(Observed::Missing);
        };

        Ok(Observed::Present {
            identity: ExternalName::new(property.key.as_str()).ok_or_else(|| {
                Error::MissingIdentity(String::from("custom property without key"))
            })?,
            up_to_date: true,
            at_provider: CustomPropertyObservation {
                key: property.key,
                site_domain,
                description: property.description,
                is_enabled: property.is_enabled,
            },
        })
    }

    async fn create(&self, desired: &Desired<CustomProperty>) -> Result<ExternalName> {
        let parameters = &desired.record().spec.for_provider;

        if parameters.key.is_empty() {
            return Err(Error::Validation(String::from("key is required")));
        }

        let site_domain = self.site_domain(desired.record()).await?;

        let property = self
            .client
            .create_custom_property(&CreateCustomPropertyRequest {
                site_id: site_domain.clone(),
                key: parameters.key.clone(),
                description: parameters.description.clone(),
            })
            .await
            .map_err(|error| {
                error.context(format!(
                    "cannot create custom property {} for site {site_domain}",
                    parameters.key
                ))
            })?;

        let key = if property.key.is_empty() {
            parameters.key.clone()
        } else {
            property.key
        };

        ExternalName::new(key)
            .ok_or_else(|| Error::MissingIdentity(String::from("custom property without key")))
    }

    async fn update(&self, _: &Desired<CustomProperty>) -> Result<Option<ExternalName>> {
        Ok(None)
    }

    async fn delete(&self, desired: &Desired<CustomProperty>) -> Result<()> {
        let identity = desired.require_identity()?;
        let site_domain = self.site_domain_for_deletion(desired.record()).await?;

        self.client
            .delete_custom_property(&site_domain, identity.as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::CustomPropertyExternal;
    use crate::{
        client::tests::client_for,
        fixtures,
        managed::{finalize, sync, External, Observed, Outcome},
        store::MockClusterStore,
    };

    fn external(server: &MockServer) -> CustomPropertyExternal {
        CustomPropertyExternal {
            client: client_for(server),
            store: Arc::new(MockClusterStore::new()),
        }
    }

    #[tokio::test]
    async fn test_discover_existing_property() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites/custom-props"))
            .and(query_param("site_id", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "custom_properties": [{"key": "plan", "description": "Billing plan", "is_enabled": true}],
                "meta": {}
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let external = external(&server);

        // A description that differs from the remote one is not drift.
        let mut property = fixtures::custom_property("example.com", "plan");
        property.spec.for_provider.description = Some(String::from("Something else"));
        let mut desired = fixtures::desired(property);

        assert_eq!(
            sync(&external, &mut desired).await.unwrap(),
            Outcome::UpToDate
        );
        assert_eq!(desired.identity().unwrap().as_str(), "plan");

        assert!(matches!(
            external.observe(&desired).await.unwrap(),
            Observed::Present { ref at_provider, .. } if at_provider.is_enabled
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/sites/custom-props/plan"))
            .and(query_param("site_id", "example.com"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Custom property not found"))
            .expect(1)
            .mount(&server)
            .await;

        let mut desired = fixtures::desired(fixtures::annotate(
            fixtures::custom_property("example.com", "plan"),
            "plan",
        ));

        finalize(&external(&server), &mut desired).await.unwrap();
    }
}
