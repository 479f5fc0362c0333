use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Listed, PlausibleClient};
use crate::error::Result;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomProperty {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Listed for CustomProperty {
    const COLLECTION: &'static str = "custom_properties";
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateCustomPropertyRequest {
    pub site_id: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PlausibleClient {
    pub async fn list_custom_properties(&self, site_domain: &str) -> Result<Vec<CustomProperty>> {
        self.list_all(&["sites", "custom-props"], &[("site_id", site_domain)])
            .await
    }

    pub async fn get_custom_property(
        &self,
        site_domain: &str,
        key: &str,
    ) -> Result<Option<CustomProperty>> {
        Ok(self
            .list_custom_properties(site_domain)
            .await?
            .into_iter()
            .find(|property| property.key == key))
    }

    pub async fn create_custom_property(
        &self,
        request: &CreateCustomPropertyRequest,
    ) -> Result<CustomProperty> {
        self.send_json(Method::PUT, &["sites", "custom-props"], request)
            .await
    }

    pub async fn delete_custom_property(&self, site_domain: &str, key: &str) -> Result<()> {
        self.delete(&["sites", "custom-props", key], &[("site_id", site_domain)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::CreateCustomPropertyRequest;
    use crate::client::tests::client_for;

    #[tokio::test]
    async fn test_get_custom_property() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites/custom-props"))
            .and(query_param("site_id", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "custom_properties": [
                    {"key": "plan", "description": "Billing plan", "is_enabled": true},
                    {"key": "author"}
                ],
                "meta": {"limit": 100}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let plan = client
            .get_custom_property("example.com", "plan")
            .await
            .unwrap()
            .unwrap();
        assert!(plan.is_enabled);
        assert_eq!(plan.description.as_deref(), Some("Billing plan"));

        let author = client
            .get_custom_property("example.com", "author")
            .await
            .unwrap()
            .unwrap();
        assert!(!author.is_enabled);
    }

    #[tokio::test]
    async fn test_create_custom_property() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/sites/custom-props"))
            .and(body_json(json!({"site_id": "example.com", "key": "plan"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "key": "plan",
                "is_enabled": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let property = client_for(&server)
            .create_custom_property(&CreateCustomPropertyRequest {
                site_id: String::from("example.com"),
                key: String::from("plan"),
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(property.key, "plan");
    }

    #[tokio::test]
    async fn test_delete_custom_property() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/sites/custom-props/plan"))
            .and(query_param("site_id", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .delete_custom_property("example.com", "plan")
            .await
            .unwrap();
    }
}
