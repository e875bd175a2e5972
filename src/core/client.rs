use crate::core::query::Query;
use crate::domain::ports::ContentStore;
use crate::utils::error::{ContentError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Fail-open front of a [`ContentStore`].
///
/// Failures stay `Result`s down to this boundary and are collapsed here: the
/// error is logged and callers get an empty list or `None`. A client built
/// without a store (not configured) never touches the network.
pub struct ContentClient<S: ContentStore> {
    store: Option<S>,
}

impl<S: ContentStore> ContentClient<S> {
    pub fn new(store: S) -> Self {
        Self { store: Some(store) }
    }

    pub fn unconfigured() -> Self {
        Self { store: None }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Raw execution; `Ok(None)` when no store is configured.
    pub async fn try_execute(&self, query: &Query) -> Result<Option<Value>> {
        let Some(store) = &self.store else {
            tracing::debug!("Content store not configured, skipping query");
            return Ok(None);
        };

        tracing::debug!("[{}] {} {:?}", store.name(), query.to_groq(), query.params);
        store.execute(query).await.map(Some)
    }

    fn report(&self, query: &Query, error: &ContentError) {
        let store = self.store.as_ref().map(|s| s.name()).unwrap_or("none");
        tracing::error!(
            "Error fetching {} from {}: {} (category: {:?})",
            query.entity,
            store,
            error,
            error.category()
        );
    }

    fn decode_items<T: DeserializeOwned>(&self, query: &Query, items: Vec<Value>) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| !item.is_null())
            .filter_map(|item| match serde_json::from_value::<T>(item) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!("Skipping malformed {} document: {}", query.entity, e);
                    None
                }
            })
            .collect()
    }

    /// All documents matching the query, or empty on any failure.
    pub async fn fetch_many<T: DeserializeOwned>(&self, query: &Query) -> Vec<T> {
        match self.try_execute(query).await {
            Ok(Some(Value::Array(items))) => self.decode_items(query, items),
            Ok(Some(Value::Null)) | Ok(None) => Vec::new(),
            Ok(Some(other)) => {
                let error = ContentError::UnexpectedResponse {
                    message: format!("expected an array, got {}", json_kind(&other)),
                };
                self.report(query, &error);
                Vec::new()
            }
            Err(e) => {
                self.report(query, &e);
                Vec::new()
            }
        }
    }

    /// The single matching document, or `None` when nothing matched or the
    /// fetch failed.
    pub async fn fetch_one<T: DeserializeOwned>(&self, query: &Query) -> Option<T> {
        let value = match self.try_execute(query).await {
            Ok(Some(Value::Array(items))) => items.into_iter().next()?,
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                self.report(query, &e);
                return None;
            }
        };

        if value.is_null() {
            return None;
        }

        match serde_json::from_value(value) {
            Ok(document) => Some(document),
            Err(e) => {
                self.report(query, &ContentError::SerializationError(e));
                None
            }
        }
    }

    /// Plucked scalar values (facets). Same failure policy as `fetch_many`.
    pub async fn fetch_values<T: DeserializeOwned>(&self, query: &Query) -> Vec<T> {
        self.fetch_many(query).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::{PersonFilters, PublicationFilters};
    use crate::core::query;
    use crate::domain::model::{Person, Publication};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CannedStore {
        response: std::result::Result<Value, String>,
        calls: Arc<AtomicUsize>,
    }

    impl CannedStore {
        fn ok(value: Value) -> Self {
            Self {
                response: Ok(value),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ContentStore for CannedStore {
        async fn execute(&self, _query: &Query) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(value) => Ok(value.clone()),
                Err(message) => Err(ContentError::StoreError {
                    status: 503,
                    description: message.clone(),
                }),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn test_unconfigured_client_returns_empty_without_error() {
        let client: ContentClient<CannedStore> = ContentClient::unconfigured();

        let people: Vec<Person> = client
            .fetch_many(&query::people_query(&PersonFilters::default()))
            .await;
        let person: Option<Person> = client.fetch_one(&query::person_by_slug("sarah-chen")).await;

        assert!(!client.is_configured());
        assert!(people.is_empty());
        assert!(person.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_collapses_to_empty() {
        let store = CannedStore::failing("service unavailable");
        let calls = store.calls.clone();
        let client = ContentClient::new(store);

        let publications: Vec<Publication> = client
            .fetch_many(&query::publications_query(&PublicationFilters::default()))
            .await;
        let publication: Option<Publication> =
            client.fetch_one(&query::publication_by_slug("missing")).await;

        assert!(publications.is_empty());
        assert!(publication.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_documents_are_skipped() {
        let client = ContentClient::new(CannedStore::ok(json!([
            {"_id": "person-1", "name": "Dr. Sarah Chen", "role": "director"},
            {"_id": "person-x", "name": "Broken", "role": "janitor"},
            null,
            {"_id": "person-3", "name": "Emily Rodriguez", "role": "staff"}
        ])));

        let people: Vec<Person> = client
            .fetch_many(&query::people_query(&PersonFilters::default()))
            .await;

        let ids: Vec<&str> = people.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["person-1", "person-3"]);
    }

    #[tokio::test]
    async fn test_fetch_many_rejects_non_array_payloads() {
        let client = ContentClient::new(CannedStore::ok(json!({"_id": "person-1"})));
        let people: Vec<Person> = client
            .fetch_many(&query::people_query(&PersonFilters::default()))
            .await;
        assert!(people.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_one_null_is_not_found() {
        let client = ContentClient::new(CannedStore::ok(Value::Null));
        let person: Option<Person> = client.fetch_one(&query::person_by_slug("nobody")).await;
        assert!(person.is_none());
    }
}
