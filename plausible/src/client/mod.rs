//! Typed client for the Plausible Sites API.
//!
//! All requests carry bearer authentication and JSON `Content-Type`/`Accept`
//! headers. Any non-2xx response becomes [`Error::Api`] with the status code
//! and raw body, so a remote 404 always renders as `status 404`.

use std::{fmt::Debug, time::Duration};

use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Method, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

mod custom_property;
mod goal;
mod guest;
mod shared_link;
mod site;
mod team;

pub use custom_property::CreateCustomPropertyRequest;
pub use goal::{CreateGoalRequest, Goal};
pub use guest::InviteGuestRequest;
pub use shared_link::CreateSharedLinkRequest;
pub use site::{CreateSiteRequest, Site};

/// Plausible Cloud.
pub const DEFAULT_BASE_URL: &str = "https://plausible.io";

const API_PATH: [&str; 2] = ["api", "v1"];

const JSON: &str = "application/json";

/// Endpoint and credentials for one Plausible account.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// A collection the API returns in pages, under a top level key named
/// [`Listed::COLLECTION`] next to a `meta` object holding the cursor.
pub trait Listed: DeserializeOwned {
    const COLLECTION: &'static str;
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the next page. `None` on the last page.
    pub after: Option<String>,
}

#[derive(Deserialize, Default)]
struct Meta {
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlausibleClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl PlausibleClient {
    pub fn new(config: ConnectionConfig, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|error| {
            Error::Configuration(format!("invalid base URL {}: {error}", config.base_url))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "base URL {} cannot have a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::Http {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(PlausibleClient {
            http,
            base_url,
            api_key: config.api_key,
        })
    }

    /// Absolute URL of an API path, with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Infallible, `new` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PATH).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        self.http
            .request(method, url.clone())
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
    }

    async fn send(&self, url: &Url, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })?;

        debug!(url = %url, status = %response.status(), "plausible API response");

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
        let body = response.bytes().await.map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// GET a single object. A 404 is reported as `Ok(None)`.
    async fn get_optional<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>> {
        let url = self.endpoint(segments);

        match self.send(&url, self.request(Method::GET, &url)).await {
            Ok(response) => Ok(Some(Self::decode(&url, response).await?)),
            Err(Error::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let response = self
            .send(&url, self.request(method, &url).json(body))
            .await?;

        Self::decode(&url, response).await
    }

    /// DELETE an object. A 404 is an error here, callers decide whether
    /// absence counts as success.
    async fn delete(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<()> {
        let url = self.endpoint(segments);
        self.send(&url, self.request(Method::DELETE, &url).query(query))
            .await?;

        Ok(())
    }

    /// Fetch a single page of a collection.
    pub async fn list_page<T: Listed>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        after: Option<&str>,
    ) -> Result<Page<T>> {
        let url = self.endpoint(segments);

        let mut request = self.request(Method::GET, &url).query(query);
        if let Some(after) = after {
            request = request.query(&[("after", after)]);
        }

        let response = self.send(&url, request).await?;
        let mut body: serde_json::Map<String, serde_json::Value> =
            Self::decode(&url, response).await?;

        let decode_error = |source: serde_json::Error| Error::Decode {
            url: url.to_string(),
            source,
        };

        let items = match body.remove(T::COLLECTION) {
            Some(items) => serde_json::from_value(items).map_err(decode_error)?,
            None => Vec::new(),
        };

        let meta: Meta = match body.remove("meta") {
            Some(meta) => serde_json::from_value(meta).map_err(decode_error)?,
            None => Meta::default(),
        };

        Ok(Page {
            items,
            after: meta.after.filter(|after| !after.is_empty()),
        })
    }

    /// Fetch every page of a collection, in order.
    ///
    /// Pagination ends on the first page without a cursor (absent or empty).
    /// There is no client-side page cap: the API is trusted to stop handing
    /// out cursors once the collection is exhausted.
    pub async fn list_all<T: Listed>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let page = self.list_page::<T>(segments, query, after.as_deref()).await?;
            items.extend(page.items);

            match page.after {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        Ok(items)
    }
}
