use crate::utils::error::ContentError;
use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// 內容商店對缺少的欄位可能回傳 null，一律視為預設值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// 展開後的參照：目標被刪除時為 null，解析失敗的也一併略過，保留原本順序
fn resolved_refs<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let slots = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(slots
        .into_iter()
        .filter(|slot| !slot.is_null())
        .filter_map(|slot| serde_json::from_value(slot).ok())
        .collect())
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Parses a stored `YYYY-MM-DD` date or an RFC 3339 datetime.
pub fn parse_content_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

macro_rules! closed_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ContentError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ContentError::ValidationError {
                        message: format!("unknown {} '{}'", stringify!($name), other),
                    }),
                }
            }
        }
    };
}

closed_enum!(EntityType {
    Person => "person",
    Publication => "publication",
    Project => "project",
});

closed_enum!(Role {
    Director => "director",
    Faculty => "faculty",
    Staff => "staff",
    Student => "student",
    Alumni => "alumni",
});

closed_enum!(DocumentType {
    Journal => "journal",
    Conference => "conference",
    Thesis => "thesis",
    Report => "report",
    BookChapter => "book-chapter",
});

closed_enum!(Theme {
    Systems => "systems",
    Behavior => "behavior",
    Policy => "policy",
});

closed_enum!(Status {
    Active => "active",
    Completed => "completed",
    Planned => "planned",
});

closed_enum!(ChartType {
    Bar => "bar",
    Line => "line",
    Pie => "pie",
    Area => "area",
});

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Director => "Director",
            Role::Faculty => "Faculty",
            Role::Staff => "Staff",
            Role::Student => "Student",
            Role::Alumni => "Alumni",
        }
    }

    /// Heading used when the people listing is grouped by role.
    pub fn section_title(&self) -> &'static str {
        match self {
            Role::Director => "Leadership",
            Role::Faculty => "Faculty",
            Role::Staff => "Staff",
            Role::Student => "Students",
            Role::Alumni => "Alumni",
        }
    }
}

impl DocumentType {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Journal => "Journal Article",
            DocumentType::Conference => "Conference Paper",
            DocumentType::Thesis => "Thesis",
            DocumentType::Report => "Report",
            DocumentType::BookChapter => "Book Chapter",
        }
    }

    pub fn facet_label(&self) -> &'static str {
        match self {
            DocumentType::Journal => "Journal Articles",
            DocumentType::Conference => "Conference Papers",
            DocumentType::Thesis => "Theses",
            DocumentType::Report => "Reports",
            DocumentType::BookChapter => "Book Chapters",
        }
    }
}

impl Theme {
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Systems => "Urban Systems",
            Theme::Behavior => "Human Behavior",
            Theme::Policy => "Policy & Planning",
        }
    }
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Completed => "Completed",
            Status::Planned => "Planned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// Weak pointer to another document by id. The target may not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref")]
    pub target: String,
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Reference {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(default)]
    pub asset: Option<AssetRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "_type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marks: Vec<String>,
}

/// One block of rich text. Only `block` blocks carry readable text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(rename = "_type", default)]
    pub kind: String,
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Span>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mark_defs: Vec<serde_json::Value>,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: "block".to_string(),
            style: Some("normal".to_string()),
            children: vec![Span {
                kind: "span".to_string(),
                text: text.into(),
                marks: Vec::new(),
            }],
            ..Default::default()
        }
    }

    pub fn plain_text(&self) -> String {
        if self.kind != "block" {
            return String::new();
        }
        self.children.iter().map(|span| span.text.as_str()).collect()
    }
}

pub type RichText = Vec<Block>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    pub role: Role,
    #[serde(default)]
    pub photo: Option<ImageRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: RichText,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "linkedIn", default)]
    pub linked_in: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<Reference>,
    #[serde(default, deserialize_with = "resolved_refs")]
    pub author_details: Vec<Person>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(rename = "abstract", default, deserialize_with = "null_as_default")]
    pub abstract_blocks: RichText,
    pub document_type: DocumentType,
    #[serde(default)]
    pub file: Option<FileRef>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl Publication {
    pub fn published_on(&self) -> Option<NaiveDate> {
        self.published_at.as_deref().and_then(parse_content_date)
    }

    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.published_on().map(|date| date.year())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub chart_type: ChartType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<ChartPoint>,
    #[serde(default)]
    pub x_axis_label: Option<String>,
    #[serde(default)]
    pub y_axis_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: RichText,
    pub theme: Theme,
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team: Vec<Reference>,
    #[serde(default, deserialize_with = "resolved_refs")]
    pub team_details: Vec<Person>,
    #[serde(default)]
    pub featured_image: Option<ImageRef>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub chart_data: Option<ChartData>,
    #[serde(default, deserialize_with = "resolved_refs")]
    pub related_publications: Vec<Publication>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl Project {
    pub fn has_member(&self, person_id: &str) -> bool {
        self.team.iter().any(|member| member.target == person_id)
    }
}

pub(crate) fn slug_of(slug: &Option<Slug>) -> Option<&str> {
    slug.as_ref()
        .map(|s| s.current.as_str())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_content_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_content_date("2024-03-15"), expected);
        assert_eq!(parse_content_date("2024-03-15T10:30:00Z"), expected);
        assert_eq!(parse_content_date("2024-03-15T10:30:00.000+02:00"), expected);
        assert_eq!(parse_content_date("not a date"), None);
        assert_eq!(parse_content_date(""), None);
    }

    #[test]
    fn test_enum_round_trip_through_strings() {
        assert_eq!("book-chapter".parse::<DocumentType>().unwrap(), DocumentType::BookChapter);
        assert_eq!(DocumentType::BookChapter.as_str(), "book-chapter");
        assert!("Journal".parse::<DocumentType>().is_err());
        assert_eq!(Role::ALL.len(), 5);
        assert_eq!(Theme::Policy.label(), "Policy & Planning");
    }

    #[test]
    fn test_publication_tolerates_nulls_and_missing_fields() {
        let raw = json!({
            "_id": "pub-1",
            "_type": "publication",
            "title": "Smart City Infrastructure",
            "slug": {"current": "smart-city"},
            "authors": [{"_ref": "person-1"}, {"_ref": "person-9"}],
            "authorDetails": [
                {"_id": "person-1", "name": "Dr. Sarah Chen", "role": "director"},
                null
            ],
            "publishedAt": "2024-03-15",
            "abstract": null,
            "documentType": "journal",
            "tags": null
        });

        let publication: Publication = serde_json::from_value(raw).unwrap();
        assert_eq!(publication.authors.len(), 2);
        assert_eq!(publication.author_details.len(), 1);
        assert_eq!(publication.author_details[0].name, "Dr. Sarah Chen");
        assert!(publication.abstract_blocks.is_empty());
        assert!(publication.tags.is_empty());
        assert_eq!(publication.year(), Some(2024));
    }

    #[test]
    fn test_project_with_broken_chart_keeps_the_rest() {
        let raw = json!({
            "_id": "proj-1",
            "headline": "Urban Mobility Patterns",
            "theme": "behavior",
            "status": "active",
            "team": [{"_ref": "person-2", "_key": "a1"}],
            "chartData": {"chartType": "radar", "data": []},
            "startDate": "2022-06-01"
        });

        let project: Project = serde_json::from_value(raw).unwrap();
        assert!(project.chart_data.is_none());
        assert!(project.has_member("person-2"));
        assert!(!project.has_member("person-3"));
        assert!(project.team_details.is_empty());
    }

    #[test]
    fn test_block_plain_text_ignores_non_text_blocks() {
        let blocks: RichText = serde_json::from_value(json!([
            {"_type": "block", "children": [{"_type": "span", "text": "Hello "}, {"_type": "span", "text": "world"}]},
            {"_type": "image", "asset": {"_ref": "image-1"}}
        ]))
        .unwrap();

        assert_eq!(blocks[0].plain_text(), "Hello world");
        assert_eq!(blocks[1].plain_text(), "");
    }
}
