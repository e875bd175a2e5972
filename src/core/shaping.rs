// Raw documents -> the view models pages render.
//
// Everything here is total: missing optional content becomes empty lists or
// `None`, never a failure.

use crate::domain::model::{
    parse_content_date, slug_of, Block, ChartData, ChartType, DocumentType, ImageRef, Person,
    Project, Publication, Role, Status, Theme,
};
use serde::Serialize;

pub const MAX_VISIBLE_TAGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// "Jun 2022"
    Short,
    /// "June 2022"
    Long,
}

impl DateStyle {
    fn pattern(&self) -> &'static str {
        match self {
            DateStyle::Short => "%b %Y",
            DateStyle::Long => "%B %Y",
        }
    }
}

/// "Start - End", or "Start - Present" while the end is open. No start, no
/// range.
pub fn date_range(start: Option<&str>, end: Option<&str>, style: DateStyle) -> Option<String> {
    let start = parse_content_date(start?)?;
    let end = end
        .and_then(parse_content_date)
        .map(|date| date.format(style.pattern()).to_string())
        .unwrap_or_else(|| "Present".to_string());
    Some(format!("{} - {}", start.format(style.pattern()), end))
}

/// Readable paragraphs of a rich-text field; blocks without text are dropped.
pub fn paragraphs(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .map(Block::plain_text)
        .filter(|text| !text.trim().is_empty())
        .collect()
}

/// Keeps the first `count` items in their existing order.
pub fn take_recent<T>(items: Vec<T>, count: usize) -> Vec<T> {
    items.into_iter().take(count).collect()
}

pub fn result_count(count: usize, singular: &str, plural: &str) -> String {
    format!(
        "Showing {} {}",
        count,
        if count == 1 { singular } else { plural }
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub visible: Vec<String>,
    pub hidden: usize,
    pub more_label: Option<String>,
}

impl TagSummary {
    pub fn new(tags: &[String], max_visible: usize) -> Self {
        let hidden = tags.len().saturating_sub(max_visible);
        Self {
            visible: tags.iter().take(max_visible).cloned().collect(),
            hidden,
            more_label: (hidden > 0).then(|| format!("+{} more", hidden)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Avatar {
    Photo { asset: String, alt: String },
    Initial { letter: String },
}

impl Avatar {
    pub fn for_person(name: &str, photo: Option<&ImageRef>) -> Self {
        if let Some((asset, image)) = photo.and_then(|p| p.asset.as_ref().map(|a| (a, p))) {
            return Avatar::Photo {
                asset: asset.id.clone(),
                alt: image
                    .alt
                    .clone()
                    .filter(|alt| !alt.trim().is_empty())
                    .unwrap_or_else(|| format!("Photo of {}", name)),
            };
        }

        let letter = name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string());
        Avatar::Initial { letter }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageView {
    pub asset: String,
    pub alt: String,
}

fn image_view(image: Option<&ImageRef>, fallback_alt: &str) -> Option<ImageView> {
    let image = image?;
    let asset = image.asset.as_ref()?;
    Some(ImageView {
        asset: asset.id.clone(),
        alt: image
            .alt
            .clone()
            .filter(|alt| !alt.trim().is_empty())
            .unwrap_or_else(|| fallback_alt.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonCard {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub role_label: &'static str,
    /// Only people with a slug get a profile link.
    pub href: Option<String>,
    pub avatar: Avatar,
    pub email: Option<String>,
}

pub fn person_card(person: &Person) -> PersonCard {
    PersonCard {
        id: person.id.clone(),
        name: person.name.clone(),
        role: person.role,
        role_label: person.role.label(),
        href: slug_of(&person.slug).map(|slug| format!("/people/{}", slug)),
        avatar: Avatar::for_person(&person.name, person.photo.as_ref()),
        email: person.email.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDetail {
    #[serde(flatten)]
    pub card: PersonCard,
    pub linked_in: Option<String>,
    pub bio: Vec<String>,
    pub publications: Vec<PublicationCard>,
    pub projects: Vec<ProjectCard>,
    /// No bio, publications or projects: the page shows a placeholder.
    pub is_sparse: bool,
}

pub fn person_detail(
    person: &Person,
    publications: &[Publication],
    projects: &[Project],
) -> PersonDetail {
    let bio = paragraphs(&person.bio);
    let is_sparse = bio.is_empty() && publications.is_empty() && projects.is_empty();

    PersonDetail {
        card: person_card(person),
        linked_in: person.linked_in.clone(),
        bio,
        publications: publications.iter().map(publication_card).collect(),
        projects: projects.iter().map(project_card).collect(),
        is_sparse,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeopleSection {
    pub role: Role,
    pub title: &'static str,
    pub people: Vec<PersonCard>,
}

/// Groups people by role in fixed role order, skipping empty groups.
/// Input order is kept within a group.
pub fn group_by_role(people: &[Person]) -> Vec<PeopleSection> {
    Role::ALL
        .iter()
        .map(|role| PeopleSection {
            role: *role,
            title: role.section_title(),
            people: people
                .iter()
                .filter(|person| person.role == *role)
                .map(person_card)
                .collect(),
        })
        .filter(|section| !section.people.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationCard {
    pub id: String,
    pub title: String,
    pub href: String,
    pub document_type: DocumentType,
    pub type_label: &'static str,
    pub year: Option<i32>,
    pub authors: Vec<PersonCard>,
    pub author_names: String,
    pub tags: TagSummary,
}

pub fn publication_card(publication: &Publication) -> PublicationCard {
    let authors: Vec<PersonCard> = publication.author_details.iter().map(person_card).collect();
    let author_names = authors
        .iter()
        .map(|author| author.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    PublicationCard {
        id: publication.id.clone(),
        title: publication.title.clone(),
        href: format!(
            "/publications/{}",
            slug_of(&publication.slug).unwrap_or(&publication.id)
        ),
        document_type: publication.document_type,
        type_label: publication.document_type.label(),
        year: publication.year(),
        authors,
        author_names,
        tags: TagSummary::new(&publication.tags, MAX_VISIBLE_TAGS),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationDetail {
    #[serde(flatten)]
    pub card: PublicationCard,
    /// "March 15, 2024"
    pub published_on: Option<String>,
    pub abstract_paragraphs: Vec<String>,
    pub all_tags: Vec<String>,
    pub external_url: Option<String>,
    pub file_asset: Option<String>,
    pub has_links: bool,
    pub citation: String,
}

pub fn citation(publication: &PublicationCard, site_name: &str) -> String {
    let year = publication
        .year
        .map(|year| year.to_string())
        .unwrap_or_else(|| "n.d.".to_string());

    if publication.author_names.is_empty() {
        format!("{} ({}). {}.", publication.title, year, site_name)
    } else {
        format!(
            "{} ({}). {}. {}.",
            publication.author_names, year, publication.title, site_name
        )
    }
}

pub fn publication_detail(publication: &Publication, site_name: &str) -> PublicationDetail {
    let card = publication_card(publication);
    let external_url = publication
        .external_url
        .clone()
        .filter(|url| !url.trim().is_empty());
    let file_asset = publication
        .file
        .as_ref()
        .and_then(|file| file.asset.as_ref())
        .map(|asset| asset.id.clone());
    let citation = citation(&card, site_name);

    PublicationDetail {
        published_on: publication
            .published_on()
            .map(|date| date.format("%B %-d, %Y").to_string()),
        abstract_paragraphs: paragraphs(&publication.abstract_blocks),
        all_tags: publication.tags.clone(),
        has_links: external_url.is_some() || file_asset.is_some(),
        external_url,
        file_asset,
        citation,
        card,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCard {
    pub id: String,
    pub headline: String,
    pub href: String,
    pub theme: Theme,
    pub theme_label: &'static str,
    pub status: Status,
    pub status_label: &'static str,
    pub image: Option<ImageView>,
    /// "Jun 2022 - Present"
    pub date_range: Option<String>,
}

pub fn project_card(project: &Project) -> ProjectCard {
    ProjectCard {
        id: project.id.clone(),
        headline: project.headline.clone(),
        href: format!(
            "/projects/{}",
            slug_of(&project.slug).unwrap_or(&project.id)
        ),
        theme: project.theme,
        theme_label: project.theme.label(),
        status: project.status,
        status_label: project.status.label(),
        image: image_view(project.featured_image.as_ref(), &project.headline),
        date_range: date_range(
            project.start_date.as_deref(),
            project.end_date.as_deref(),
            DateStyle::Short,
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPointView {
    pub label: String,
    pub value: f64,
    /// Fraction of the total, pie charts only.
    pub share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub chart_type: ChartType,
    pub title: Option<String>,
    pub series_name: String,
    pub points: Vec<ChartPointView>,
    pub x_axis_label: Option<String>,
    pub y_axis_label: Option<String>,
}

/// `None` when there is nothing to plot.
pub fn chart_view(chart: &ChartData) -> Option<ChartView> {
    if chart.data.is_empty() {
        return None;
    }

    let total: f64 = chart.data.iter().map(|point| point.value).sum();
    let points = chart
        .data
        .iter()
        .map(|point| ChartPointView {
            label: point.label.clone(),
            value: point.value,
            share: (chart.chart_type == ChartType::Pie && total > 0.0)
                .then(|| point.value / total),
        })
        .collect();

    Some(ChartView {
        chart_type: chart.chart_type,
        title: chart.title.clone(),
        series_name: chart
            .title
            .clone()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| "Value".to_string()),
        points,
        x_axis_label: chart.x_axis_label.clone(),
        y_axis_label: chart.y_axis_label.clone(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub card: ProjectCard,
    /// "June 2022 - Present"
    pub long_date_range: Option<String>,
    pub description: Vec<String>,
    pub chart: Option<ChartView>,
    pub team: Vec<PersonCard>,
    pub related_publications: Vec<PublicationCard>,
}

pub fn project_detail(project: &Project) -> ProjectDetail {
    ProjectDetail {
        card: project_card(project),
        long_date_range: date_range(
            project.start_date.as_deref(),
            project.end_date.as_deref(),
            DateStyle::Long,
        ),
        description: paragraphs(&project.description),
        chart: project.chart_data.as_ref().and_then(chart_view),
        team: project.team_details.iter().map(person_card).collect(),
        related_publications: project
            .related_publications
            .iter()
            .map(publication_card)
            .collect(),
    }
}
