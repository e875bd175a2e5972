use anyhow::Context;
use clap::Parser;
use incity_content::config::{CliConfig, Command, ListingKind, LogFormat};
use incity_content::core::filters::{PersonFilters, ProjectFilters, PublicationFilters, UrlFilters};
use incity_content::core::query::Criteria;
use incity_content::utils::{logger, validation::Validate};
use incity_content::{AppConfig, ContentClient, ContentService, ContentStore, MemoryStore};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting incity-content CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let output = match &cli.fixture {
        Some(path) => {
            let store = MemoryStore::from_file(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            run(&cli.command, &service(ContentClient::new(store), &config)).await?
        }
        None => {
            // 設定有誤仍繼續執行，所有查詢回傳空結果
            if let Err(e) = config.validate() {
                tracing::warn!("Configuration is incomplete: {}", e);
                tracing::warn!("Suggestion: {}", e.recovery_suggestion());
            }
            let client = ContentClient::from_settings(&config.store);
            run(&cli.command, &service(client, &config)).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn service<S: ContentStore>(client: ContentClient<S>, config: &AppConfig) -> ContentService<S> {
    ContentService::new(client)
        .with_limits(config.pages.clone())
        .with_site_name(config.site.name.clone())
}

fn not_found(kind: &str, slug: &str) -> Value {
    tracing::warn!("No {} found for slug '{}'", kind, slug);
    Value::Null
}

async fn run<S: ContentStore>(command: &Command, service: &ContentService<S>) -> anyhow::Result<Value> {
    let query_string = command.listing_query_string();

    let value = match command {
        Command::Home => serde_json::to_value(service.home_page().await)?,
        Command::People { .. } => serde_json::to_value(service.people_page(&query_string).await)?,
        Command::Publications { .. } => {
            serde_json::to_value(service.publications_page(&query_string).await)?
        }
        Command::Projects { .. } => {
            serde_json::to_value(service.projects_page(&query_string).await)?
        }
        Command::Person { slug } => match service.person_page(slug).await {
            Some(page) => serde_json::to_value(page)?,
            None => not_found("person", slug),
        },
        Command::Publication { slug } => match service.publication_page(slug).await {
            Some(page) => serde_json::to_value(page)?,
            None => not_found("publication", slug),
        },
        Command::Project { slug } => match service.project_page(slug).await {
            Some(page) => serde_json::to_value(page)?,
            None => not_found("project", slug),
        },
        Command::Facets => {
            let (years, document_types) =
                tokio::join!(service.get_publication_years(), service.get_document_types());
            json!({ "years": years, "documentTypes": document_types })
        }
        Command::Query {
            listing,
            query_string,
        } => {
            let criteria = match listing {
                ListingKind::People => Criteria::People(PersonFilters::from_query_string(query_string)),
                ListingKind::Publications => {
                    Criteria::Publications(PublicationFilters::from_query_string(query_string))
                }
                ListingKind::Projects => {
                    Criteria::Projects(ProjectFilters::from_query_string(query_string))
                }
            };
            let query = criteria.build();
            json!({
                "entity": criteria.entity(),
                "groq": query.to_groq(),
                "params": query.params,
            })
        }
    };

    Ok(value)
}
