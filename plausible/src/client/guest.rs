use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Listed, PlausibleClient};
use crate::error::Result;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Guest {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invited_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
}

impl Listed for Guest {
    const COLLECTION: &'static str = "guests";
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct InviteGuestRequest {
    pub site_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl PlausibleClient {
    pub async fn list_guests(&self, site_domain: &str) -> Result<Vec<Guest>> {
        self.list_all(&["sites", "guests"], &[("site_id", site_domain)])
            .await
    }

    pub async fn get_guest(&self, site_domain: &str, email: &str) -> Result<Option<Guest>> {
        Ok(self
            .list_guests(site_domain)
            .await?
            .into_iter()
            .find(|guest| guest.email == email))
    }

    /// Invite a guest. Inviting an existing guest returns the existing invitation.
    pub async fn invite_guest(&self, request: &InviteGuestRequest) -> Result<Guest> {
        self.send_json(Method::PUT, &["sites", "guests"], request)
            .await
    }

    pub async fn delete_guest(&self, site_domain: &str, email: &str) -> Result<()> {
        self.delete(&["sites", "guests", email], &[("site_id", site_domain)])
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

    use super::InviteGuestRequest;
    use crate::client::tests::client_for;

    #[tokio::test]
    async fn test_get_guest() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sites/guests"))
            .and(query_param("site_id", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "guests": [
                    {
                        "email": "alice@example.com",
                        "role": "viewer",
                        "status": "accepted",
                        "invited_at": "2024-01-01T00:00:00Z",
                        "accepted_at": "2024-01-02T00:00:00Z"
                    },
                    {
                        "email": "bob@example.com",
                        "role": "editor",
                        "status": "invited"
                    }
                ],
                "meta": {"limit": 100}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let guest = client
            .get_guest("example.com", "bob@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(guest.role.as_deref(), Some("editor"));
        assert_eq!(guest.accepted_at, None);

        assert_eq!(
            client
                .get_guest("example.com", "carol@example.com")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_invite_guest() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/sites/guests"))
            .and(body_json(json!({
                "site_id": "example.com",
                "email": "alice@example.com",
                "role": "viewer"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "email": "alice@example.com",
                "role": "viewer",
                "status": "invited"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let guest = client_for(&server)
            .invite_guest(&InviteGuestRequest {
                site_id: String::from("example.com"),
                email: String::from("alice@example.com"),
                role: Some(String::from("viewer")),
            })
            .await
            .unwrap();

        assert_eq!(guest.status.as_deref(), Some("invited"));
    }

    #[tokio::test]
    async fn test_delete_guest() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/sites/guests/alice@example.com"))
            .and(query_param("site_id", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .delete_guest("example.com", "alice@example.com")
            .await
            .unwrap();
    }
}
