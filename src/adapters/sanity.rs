use crate::config::store::StoreSettings;
use crate::core::client::ContentClient;
use crate::core::query::Query;
use crate::domain::ports::ContentStore;
use crate::utils::error::{ContentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    ms: Option<u64>,
}

/// Sanity HTTP query API:
/// `GET {host}/v{apiVersion}/data/query/{dataset}?query=...&$param=<json>`.
pub struct SanityStore {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    name: String,
}

impl SanityStore {
    pub fn new(settings: &StoreSettings) -> Result<Self> {
        let mut builder = Client::builder();
        // 逾時交給傳輸層，未設定或為 0 時沿用 reqwest 預設
        match settings.timeout_seconds {
            Some(0) => tracing::warn!("Ignoring store.timeout_seconds = 0"),
            Some(timeout) => builder = builder.timeout(Duration::from_secs(timeout)),
            None => {}
        }
        let client = builder.build()?;

        let endpoint = Url::parse(&settings.base_url())?.join(&format!(
            "v{}/data/query/{}",
            settings.api_version, settings.dataset
        ))?;

        Ok(Self {
            client,
            endpoint,
            token: settings.token.clone(),
            name: format!("sanity:{}/{}", settings.project_id, settings.dataset),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, query: &Query) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &query.to_groq());
            for (name, value) in &query.params {
                pairs.append_pair(&format!("${}", name), &serde_json::to_string(value)?);
            }
        }
        Ok(url)
    }
}

fn error_description(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/description")
        .or_else(|| value.pointer("/message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl ContentStore for SanityStore {
    async fn execute(&self, query: &Query) -> Result<Value> {
        let url = self.request_url(query)?;

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let description = error_description(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(ContentError::StoreError {
                status: status.as_u16(),
                description,
            });
        }

        let envelope: QueryEnvelope = serde_json::from_str(&body)?;
        if let Some(ms) = envelope.ms {
            tracing::debug!("[{}] {} query took {}ms", self.name, query.entity, ms);
        }
        Ok(envelope.result)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl ContentClient<SanityStore> {
    /// Builds the client once from settings. Unusable settings (or a
    /// transport that cannot be built) yield an unconfigured client.
    pub fn from_settings(settings: &StoreSettings) -> Self {
        if !settings.is_configured() {
            tracing::warn!(
                "Content store not configured (project id '{}'), all reads return empty",
                settings.project_id
            );
            return ContentClient::unconfigured();
        }

        match SanityStore::new(settings) {
            Ok(store) => {
                tracing::info!("Using content store {}", store.endpoint());
                ContentClient::new(store)
            }
            Err(e) => {
                tracing::error!("Could not set up content store client: {}", e);
                ContentClient::unconfigured()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::{PersonFilters, PublicationFilters};
    use crate::core::query;
    use crate::domain::model::{DocumentType, Person, Publication, Role};
    use httpmock::prelude::*;
    use serde_json::json;

    fn settings_for(server: &MockServer) -> StoreSettings {
        StoreSettings {
            project_id: "k3x9ab".to_string(),
            api_host: Some(server.base_url()),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_url_encodes_query_and_params() {
        let settings = StoreSettings {
            project_id: "k3x9ab".to_string(),
            ..Default::default()
        };
        let store = SanityStore::new(&settings).unwrap();
        let filters = PersonFilters {
            role: Some(Role::Faculty),
        };

        let url = store.request_url(&query::people_query(&filters)).unwrap();

        assert_eq!(url.host_str(), Some("k3x9ab.api.sanity.io"));
        assert_eq!(url.path(), "/v2024-01-01/data/query/production");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0].0, "query");
        assert!(pairs[0].1.starts_with("*[_type == \"person\" && role == $role]"));
        assert_eq!(pairs[1], ("$role".to_string(), "\"faculty\"".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_many_through_http() {
        let server = MockServer::start();
        let filters = PublicationFilters {
            document_type: Some(DocumentType::Journal),
            ..Default::default()
        };
        let query = query::publications_query(&filters);

        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2024-01-01/data/query/production")
                .query_param("query", query.to_groq())
                .query_param("$documentType", "\"journal\"");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "ms": 4,
                    "query": "...",
                    "result": [{
                        "_id": "pub-1",
                        "title": "Smart City Infrastructure",
                        "slug": {"current": "smart-city"},
                        "authors": [{"_ref": "person-1"}],
                        "publishedAt": "2024-03-15",
                        "documentType": "journal"
                    }]
                }));
        });

        let client = ContentClient::from_settings(&settings_for(&server));
        let publications: Vec<Publication> = client.fetch_many(&query).await;

        api_mock.assert();
        assert_eq!(publications.len(), 1);
        assert_eq!(publications[0].document_type, DocumentType::Journal);
    }

    #[tokio::test]
    async fn test_bearer_token_is_forwarded() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2024-01-01/data/query/production")
                .header("authorization", "Bearer sk-test");
            then.status(200).json_body(json!({"result": null}));
        });

        let mut settings = settings_for(&server);
        settings.token = Some("sk-test".to_string());
        let client = ContentClient::from_settings(&settings);

        let person: Option<Person> = client.fetch_one(&query::person_by_slug("nobody")).await;

        api_mock.assert();
        assert!(person.is_none());
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_store_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(400).json_body(json!({
                "error": {
                    "description": "param $slug referenced, but not provided",
                    "type": "queryParseError"
                }
            }));
        });

        let store = SanityStore::new(&settings_for(&server)).unwrap();
        let err = store
            .execute(&query::person_by_slug("x"))
            .await
            .unwrap_err();

        match err {
            ContentError::StoreError {
                status,
                description,
            } => {
                assert_eq!(status, 400);
                assert!(description.contains("not provided"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_failure_is_fail_open() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET);
            then.status(502).body("<html>Bad Gateway</html>");
        });

        let client = ContentClient::from_settings(&settings_for(&server));
        let people: Vec<Person> = client
            .fetch_many(&query::people_query(&PersonFilters::default()))
            .await;

        api_mock.assert();
        assert!(people.is_empty());
    }

    #[tokio::test]
    async fn test_zero_timeout_keeps_transport_usable() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v2024-01-01/data/query/production");
            then.status(200).json_body(json!({
                "result": [{"_id": "person-1", "name": "Dr. Sarah Chen", "role": "director"}]
            }));
        });

        let mut settings = settings_for(&server);
        settings.timeout_seconds = Some(0);
        let client = ContentClient::from_settings(&settings);
        let people: Vec<Person> = client
            .fetch_many(&query::people_query(&PersonFilters::default()))
            .await;

        api_mock.assert();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].role, Role::Director);
    }

    #[test]
    fn test_unconfigured_settings_build_unconfigured_client() {
        let client = ContentClient::from_settings(&StoreSettings::default());
        assert!(!client.is_configured());
    }
}
