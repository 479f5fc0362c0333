use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Listed, PlausibleClient};
use crate::error::Result;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Goal {
    pub id: String,
    pub goal_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_path: Option<String>,
}

impl Listed for Goal {
    const COLLECTION: &'static str = "goals";
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateGoalRequest {
    pub site_id: String,
    pub goal_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_path: Option<String>,
}

impl PlausibleClient {
    pub async fn list_goals(&self, site_domain: &str) -> Result<Vec<Goal>> {
        self.list_all(&["sites", "goals"], &[("site_id", site_domain)])
            .await
    }

    /// Goals can only be listed, so this scans the site's goals for `id`.
    pub async fn get_goal(&self, site_domain: &str, id: &str) -> Result<Option<Goal>> {
        Ok(self
            .list_goals(site_domain)
            .await?
            .into_iter()
            .find(|goal| goal.id == id))
    }

    /// Creating a goal that already exists returns the existing goal.
    pub async fn create_goal(&self, request: &CreateGoalRequest) -> Result<Goal> {
        self.send_json(Method::PUT, &["sites", "goals"], request)
            .await
    }

    pub async fn delete_goal(&self, id: &str) -> Result<()> {
        self.delete(&["sites", "goals", id], &[]).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::{CreateGoalRequest, Goal};
    use crate::client::tests::client_for;

    async fn mount_goals(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v1/sites/goals"))
            .and(query_param("site_id", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "goals": [
                    {"id": "goal-123", "goal_type": "event", "event_name": "Signup"},
                    {"id": "goal-456", "goal_type": "page", "page_path": "/checkout"}
                ],
                "meta": {"limit": 100}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_list_goals() {
        let server = MockServer::start().await;
        mount_goals(&server).await;

        let goals = client_for(&server).list_goals("example.com").await.unwrap();

        assert_eq!(
            goals,
            vec![
                Goal {
                    id: String::from("goal-123"),
                    goal_type: String::from("event"),
                    event_name: Some(String::from("Signup")),
                    page_path: None,
                },
                Goal {
                    id: String::from("goal-456"),
                    goal_type: String::from("page"),
                    event_name: None,
                    page_path: Some(String::from("/checkout")),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_get_goal() {
        let server = MockServer::start().await;
        mount_goals(&server).await;

        let client = client_for(&server);

        let goal = client.get_goal("example.com", "goal-456").await.unwrap();
        assert_eq!(goal.unwrap().page_path.as_deref(), Some("/checkout"));

        assert_eq!(client.get_goal("example.com", "goal-789").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_goal() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/sites/goals"))
            .and(body_json(json!({
                "site_id": "example.com",
                "goal_type": "event",
                "event_name": "Signup"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "goal-123",
                "goal_type": "event",
                "event_name": "Signup"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let goal = client_for(&server)
            .create_goal(&CreateGoalRequest {
                site_id: String::from("example.com"),
                goal_type: String::from("event"),
                event_name: Some(String::from("Signup")),
                page_path: None,
            })
            .await
            .unwrap();

        assert_eq!(goal.id, "goal-123");
    }

    #[tokio::test]
    async fn test_create_goal_for_unknown_site() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/sites/goals"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Site not found"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .create_goal(&CreateGoalRequest {
                site_id: String::from("nonexistent.com"),
                goal_type: String::from("event"),
                event_name: Some(String::from("test")),
                page_path: None,
            })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_goal() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/sites/goals/goal-123"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_goal("goal-123").await.unwrap();
    }
}
