use httpmock::prelude::*;
use incity_content::core::query;
use incity_content::{ContentClient, ContentService, StoreSettings};
use serde_json::json;

const QUERY_PATH: &str = "/v2024-01-01/data/query/production";

fn settings_for(server: &MockServer) -> StoreSettings {
    StoreSettings {
        project_id: "k3x9ab".to_string(),
        api_host: Some(server.base_url()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_publication_page_over_http() -> anyhow::Result<()> {
    let server = MockServer::start();
    let expected_query = query::publication_by_slug("smart-city-infrastructure").to_groq();

    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path(QUERY_PATH)
            .query_param("query", expected_query.as_str())
            .query_param("$slug", "\"smart-city-infrastructure\"");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "ms": 7,
                "result": {
                    "_id": "pub-1",
                    "_type": "publication",
                    "title": "Smart City Infrastructure",
                    "slug": {"current": "smart-city-infrastructure"},
                    "authors": [{"_ref": "person-1"}, {"_ref": "person-9"}],
                    "authorDetails": [
                        {"_id": "person-1", "name": "Dr. Sarah Chen", "slug": {"current": "sarah-chen"}, "role": "director"},
                        null
                    ],
                    "publishedAt": "2024-03-15T08:00:00Z",
                    "documentType": "journal",
                    "abstract": null,
                    "file": {"asset": {"_ref": "file-9f8e7d-pdf"}},
                    "tags": ["smart city", "sensors"]
                }
            }));
    });

    let service = ContentService::new(ContentClient::from_settings(&settings_for(&server)));
    let detail = service
        .publication_page("smart-city-infrastructure")
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(detail.card.author_names, "Dr. Sarah Chen");
    assert_eq!(
        detail.card.authors[0].href.as_deref(),
        Some("/people/sarah-chen")
    );
    assert_eq!(detail.published_on.as_deref(), Some("March 15, 2024"));
    assert_eq!(detail.file_asset.as_deref(), Some("file-9f8e7d-pdf"));
    assert!(detail.has_links);
    assert_eq!(detail.card.tags.more_label, None);

    Ok(())
}

#[tokio::test]
async fn test_store_outage_degrades_listing_to_empty() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path(QUERY_PATH);
        then.status(503)
            .json_body(json!({"error": {"description": "Service temporarily unavailable"}}));
    });

    let service = ContentService::new(ContentClient::from_settings(&settings_for(&server)));
    let page = service.publications_page("type=journal").await;

    // listing and year facet both failed
    api_mock.assert_hits(2);
    assert!(page.publications.is_empty());
    assert_eq!(page.count_label, "Showing 0 publications");
    assert_eq!(page.facets.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unconfigured_store_never_calls_out() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.any_request();
        then.status(200).json_body(json!({"result": []}));
    });

    let settings = StoreSettings {
        project_id: "your-project-id".to_string(),
        api_host: Some(server.base_url()),
        ..Default::default()
    };
    let service = ContentService::new(ContentClient::from_settings(&settings));

    let home = service.home_page().await;
    let person = service.person_page("sarah-chen").await;

    api_mock.assert_hits(0);
    assert!(home.projects.is_empty() && home.publications.is_empty() && home.team.is_empty());
    assert!(person.is_none());

    Ok(())
}

#[tokio::test]
async fn test_token_and_member_param_are_sent() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path(QUERY_PATH)
            .header("authorization", "Bearer sk-read")
            .query_param("$personId", "\"person-1\"");
        then.status(200).json_body(json!({
            "result": [
                {"_id": "proj-2", "headline": "Smart Grid Pilot", "theme": "systems", "status": "active",
                 "team": [{"_ref": "person-1"}], "startDate": "2023-01-15"}
            ]
        }));
    });

    let mut settings = settings_for(&server);
    settings.token = Some("sk-read".to_string());
    let service = ContentService::new(ContentClient::from_settings(&settings));

    let projects = service.get_projects_for_person("person-1").await;

    api_mock.assert();
    assert_eq!(projects.len(), 1);
    assert!(projects[0].has_member("person-1"));

    Ok(())
}
