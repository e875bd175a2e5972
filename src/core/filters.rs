// URL parameters <-> filter criteria, and facet enumeration for filter UIs.
//
// Resolving never fails: a malformed or unknown value simply leaves its
// dimension unfiltered. Serializing omits absent dimensions, so "All" is
// just the missing parameter and `resolve(serialize(c)) == c`.

use crate::core::client::ContentClient;
use crate::core::query;
use crate::domain::model::{parse_content_date, DocumentType, Role, Status, Theme};
use crate::domain::ports::ContentStore;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFilters {
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationFilters {
    pub year: Option<i32>,
    pub document_type: Option<DocumentType>,
    pub author_id: Option<String>,
    pub search_query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilters {
    pub theme: Option<Theme>,
    pub status: Option<Status>,
    pub search_query: Option<String>,
}

/// Decoded `key=value` pairs of a request's query string, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// First value for `key`; later duplicates are ignored.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn text_param(params: &QueryParams, key: &str) -> Option<String> {
    params
        .get(key)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

fn enum_param<T: std::str::FromStr>(params: &QueryParams, key: &str) -> Option<T> {
    params.get(key).and_then(|value| value.parse().ok())
}

fn year_param(params: &QueryParams, key: &str) -> Option<i32> {
    params
        .get(key)
        .and_then(|value| value.parse::<i32>().ok())
        .filter(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
}

/// Filter criteria that live in a listing page's URL.
pub trait UrlFilters: Sized + Default + Clone {
    fn resolve(params: &QueryParams) -> Self;

    /// Present dimensions as `(parameter, value)` in a fixed order.
    fn to_pairs(&self) -> Vec<(&'static str, String)>;

    fn from_query_string(query: &str) -> Self {
        Self::resolve(&QueryParams::parse(query))
    }

    fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    fn is_empty(&self) -> bool {
        self.to_pairs().is_empty()
    }

    fn href(&self, base_path: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            base_path.to_string()
        } else {
            format!("{}?{}", base_path, query)
        }
    }
}

impl UrlFilters for PersonFilters {
    fn resolve(params: &QueryParams) -> Self {
        Self {
            role: enum_param(params, "role"),
        }
    }

    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        self.role
            .map(|role| ("role", role.as_str().to_string()))
            .into_iter()
            .collect()
    }
}

impl UrlFilters for PublicationFilters {
    fn resolve(params: &QueryParams) -> Self {
        Self {
            year: year_param(params, "year"),
            document_type: enum_param(params, "type"),
            author_id: text_param(params, "author"),
            search_query: text_param(params, "q"),
        }
    }

    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(document_type) = self.document_type {
            pairs.push(("type", document_type.as_str().to_string()));
        }
        if let Some(year) = self.year {
            pairs.push(("year", year.to_string()));
        }
        if let Some(author_id) = &self.author_id {
            pairs.push(("author", author_id.clone()));
        }
        if let Some(search) = &self.search_query {
            pairs.push(("q", search.clone()));
        }
        pairs
    }
}

impl UrlFilters for ProjectFilters {
    fn resolve(params: &QueryParams) -> Self {
        Self {
            theme: enum_param(params, "theme"),
            status: enum_param(params, "status"),
            search_query: text_param(params, "q"),
        }
    }

    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(theme) = self.theme {
            pairs.push(("theme", theme.as_str().to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = &self.search_query {
            pairs.push(("q", search.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub label: String,
    /// `None` for the "All" option.
    pub value: Option<String>,
    pub active: bool,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetGroup {
    pub label: &'static str,
    pub param: &'static str,
    pub options: Vec<FacetOption>,
}

// "All" 只清除本維度，其餘篩選條件保留
fn facet_group<F, T>(
    label: &'static str,
    param: &'static str,
    filters: &F,
    base_path: &str,
    current: Option<T>,
    values: impl IntoIterator<Item = (T, String, String)>,
    set: impl Fn(&mut F, Option<T>),
) -> FacetGroup
where
    F: UrlFilters,
    T: PartialEq + Clone,
{
    let mut cleared = filters.clone();
    set(&mut cleared, None);
    let mut options = vec![FacetOption {
        label: "All".to_string(),
        value: None,
        active: current.is_none(),
        href: cleared.href(base_path),
    }];

    for (value, raw, label) in values {
        let mut selected = filters.clone();
        set(&mut selected, Some(value.clone()));
        options.push(FacetOption {
            label,
            value: Some(raw),
            active: current.as_ref() == Some(&value),
            href: selected.href(base_path),
        });
    }

    FacetGroup {
        label,
        param,
        options,
    }
}

pub fn people_facets(filters: &PersonFilters, base_path: &str) -> Vec<FacetGroup> {
    vec![facet_group(
        "Filter by role",
        "role",
        filters,
        base_path,
        filters.role,
        Role::ALL
            .iter()
            .map(|role| (*role, role.as_str().to_string(), role.section_title().to_string())),
        |f, v| f.role = v,
    )]
}

pub fn project_facets(filters: &ProjectFilters, base_path: &str) -> Vec<FacetGroup> {
    vec![
        facet_group(
            "Theme",
            "theme",
            filters,
            base_path,
            filters.theme,
            Theme::ALL
                .iter()
                .map(|theme| (*theme, theme.as_str().to_string(), theme.label().to_string())),
            |f, v| f.theme = v,
        ),
        facet_group(
            "Status",
            "status",
            filters,
            base_path,
            filters.status,
            Status::ALL
                .iter()
                .map(|status| (*status, status.as_str().to_string(), status.label().to_string())),
            |f, v| f.status = v,
        ),
    ]
}

/// Type facet lists the whole closed set; the year facet only years that
/// occur in the data, newest first, at most `max_years` of them.
pub fn publication_facets(
    filters: &PublicationFilters,
    years: &[i32],
    max_years: usize,
    base_path: &str,
) -> Vec<FacetGroup> {
    let mut groups = vec![facet_group(
        "Type",
        "type",
        filters,
        base_path,
        filters.document_type,
        DocumentType::ALL.iter().map(|document_type| {
            (
                *document_type,
                document_type.as_str().to_string(),
                document_type.facet_label().to_string(),
            )
        }),
        |f, v| f.document_type = v,
    )];

    if !years.is_empty() {
        groups.push(facet_group(
            "Year",
            "year",
            filters,
            base_path,
            filters.year,
            years
                .iter()
                .take(max_years)
                .map(|year| (*year, year.to_string(), year.to_string())),
            |f, v| f.year = v,
        ));
    }

    groups
}

/// Distinct years among stored dates, newest first. Unparseable dates are
/// skipped.
pub fn years_from_dates<S: AsRef<str>>(dates: &[S]) -> Vec<i32> {
    let mut years: Vec<i32> = dates
        .iter()
        .filter_map(|raw| parse_content_date(raw.as_ref()))
        .map(|date| date.year())
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

pub async fn publication_years<S: ContentStore>(client: &ContentClient<S>) -> Vec<i32> {
    let dates: Vec<String> = client.fetch_values(&query::publication_dates()).await;
    years_from_dates(&dates)
}

/// Document types that at least one publication currently uses.
pub async fn document_types_present<S: ContentStore>(
    client: &ContentClient<S>,
) -> Vec<DocumentType> {
    let mut types: Vec<DocumentType> = client.fetch_values(&query::document_types()).await;
    types.sort();
    types.dedup();
    types
}
