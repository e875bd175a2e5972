// Structured content-store queries and the builders for every page query.
//
// A `Query` is plain data: the filter predicates, ordering, selection and
// parameter bindings. Adapters either render it to GROQ (`Query::to_groq`)
// or evaluate it directly. Building a query never touches shared state, so
// equal criteria always produce equal queries.

use crate::core::filters::{PersonFilters, ProjectFilters, PublicationFilters};
use crate::domain::model::EntityType;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: &'static str,
    pub direction: Direction,
}

/// One condition of the filter. Parameter names refer to [`Query::params`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `field == $param`
    Equals {
        field: &'static str,
        param: &'static str,
    },
    /// `slug.current == $param`
    SlugEquals { param: &'static str },
    /// `string::startsWith(field, $param)`
    StartsWith {
        field: &'static str,
        param: &'static str,
    },
    /// `$param in field[]._ref`
    References {
        field: &'static str,
        param: &'static str,
    },
    /// `field match $param`, case-insensitive with `*` wildcards
    Matches {
        field: &'static str,
        param: &'static str,
    },
    /// `defined(field)`
    Defined { field: &'static str },
}

impl Predicate {
    fn to_groq(&self) -> String {
        match self {
            Predicate::Equals { field, param } => format!("{} == ${}", field, param),
            Predicate::SlugEquals { param } => format!("slug.current == ${}", param),
            Predicate::StartsWith { field, param } => {
                format!("string::startsWith({}, ${})", field, param)
            }
            Predicate::References { field, param } => format!("${} in {}[]._ref", param, field),
            Predicate::Matches { field, param } => format!("{} match ${}", field, param),
            Predicate::Defined { field } => format!("defined({})", field),
        }
    }
}

/// A projected field. `Expand` follows an array of references and projects
/// the referenced documents under `alias`; unresolved slots come back `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Plain(&'static str),
    Expand {
        alias: &'static str,
        source: &'static str,
        fields: Vec<Field>,
    },
}

impl Field {
    fn to_groq(&self) -> String {
        match self {
            Field::Plain(name) => (*name).to_string(),
            Field::Expand {
                alias,
                source,
                fields,
            } => format!("\"{}\": {}[]->{}", alias, source, render_projection(fields)),
        }
    }
}

fn render_projection(fields: &[Field]) -> String {
    let inner: Vec<String> = fields.iter().map(Field::to_groq).collect();
    format!("{{{}}}", inner.join(", "))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Project(Vec<Field>),
    /// Collect one field's values across the matches, optionally deduplicated.
    Pluck { field: &'static str, unique: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    All,
    First,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub entity: EntityType,
    pub predicates: Vec<Predicate>,
    pub order: Option<Ordering>,
    pub selection: Selection,
    pub slice: Slice,
    pub params: BTreeMap<String, Value>,
}

impl Query {
    pub fn to_groq(&self) -> String {
        let mut conditions = vec![format!("_type == \"{}\"", self.entity.as_str())];
        conditions.extend(self.predicates.iter().map(Predicate::to_groq));
        let filter = format!("*[{}]", conditions.join(" && "));

        match &self.selection {
            Selection::Pluck { field, unique } => {
                if *unique {
                    format!("array::unique({}.{})", filter, field)
                } else {
                    format!("{}.{}", filter, field)
                }
            }
            Selection::Project(fields) => {
                let mut groq = filter;
                if let Some(order) = &self.order {
                    groq.push_str(&format!(
                        " | order({} {})",
                        order.field,
                        order.direction.as_str()
                    ));
                }
                if self.slice == Slice::First {
                    groq.push_str("[0]");
                }
                groq.push_str(&render_projection(fields));
                groq
            }
        }
    }
}

pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new(entity: EntityType) -> Self {
        Self {
            query: Query {
                entity,
                predicates: Vec::new(),
                order: None,
                selection: Selection::Project(Vec::new()),
                slice: Slice::All,
                params: BTreeMap::new(),
            },
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.query.predicates.push(predicate);
        self
    }

    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.query.params.insert(name.to_string(), value.into());
        self
    }

    pub fn order_by(mut self, field: &'static str, direction: Direction) -> Self {
        self.query.order = Some(Ordering { field, direction });
        self
    }

    pub fn project(mut self, fields: Vec<Field>) -> Self {
        self.query.selection = Selection::Project(fields);
        self
    }

    pub fn pluck(mut self, field: &'static str, unique: bool) -> Self {
        self.query.selection = Selection::Pluck { field, unique };
        self
    }

    pub fn first(mut self) -> Self {
        self.query.slice = Slice::First;
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Filter criteria for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    People(PersonFilters),
    Publications(PublicationFilters),
    Projects(ProjectFilters),
}

impl Criteria {
    pub fn entity(&self) -> EntityType {
        match self {
            Criteria::People(_) => EntityType::Person,
            Criteria::Publications(_) => EntityType::Publication,
            Criteria::Projects(_) => EntityType::Project,
        }
    }

    pub fn build(&self) -> Query {
        match self {
            Criteria::People(filters) => people_query(filters),
            Criteria::Publications(filters) => publications_query(filters),
            Criteria::Projects(filters) => projects_query(filters),
        }
    }
}

fn person_card_fields() -> Vec<Field> {
    vec![
        Field::Plain("_id"),
        Field::Plain("_type"),
        Field::Plain("name"),
        Field::Plain("slug"),
        Field::Plain("role"),
        Field::Plain("photo"),
        Field::Plain("email"),
    ]
}

fn person_detail_fields() -> Vec<Field> {
    let mut fields = person_card_fields();
    fields.push(Field::Plain("bio"));
    fields.push(Field::Plain("linkedIn"));
    fields
}

fn publication_card_fields() -> Vec<Field> {
    vec![
        Field::Plain("_id"),
        Field::Plain("_type"),
        Field::Plain("title"),
        Field::Plain("slug"),
        Field::Plain("authors"),
        Field::Expand {
            alias: "authorDetails",
            source: "authors",
            fields: person_card_fields(),
        },
        Field::Plain("publishedAt"),
        Field::Plain("documentType"),
        Field::Plain("tags"),
    ]
}

fn publication_detail_fields() -> Vec<Field> {
    let mut fields = publication_card_fields();
    fields.push(Field::Plain("abstract"));
    fields.push(Field::Plain("file"));
    fields.push(Field::Plain("externalUrl"));
    fields
}

fn project_card_fields() -> Vec<Field> {
    vec![
        Field::Plain("_id"),
        Field::Plain("_type"),
        Field::Plain("headline"),
        Field::Plain("slug"),
        Field::Plain("theme"),
        Field::Plain("status"),
        Field::Plain("team"),
        Field::Plain("featuredImage"),
        Field::Plain("startDate"),
        Field::Plain("endDate"),
    ]
}

fn project_detail_fields() -> Vec<Field> {
    let mut fields = project_card_fields();
    fields.push(Field::Plain("description"));
    fields.push(Field::Plain("chartData"));
    fields.push(Field::Expand {
        alias: "teamDetails",
        source: "team",
        fields: person_card_fields(),
    });
    fields.push(Field::Expand {
        alias: "relatedPublications",
        source: "relatedPublications",
        fields: publication_card_fields(),
    });
    fields
}

pub fn people_query(filters: &PersonFilters) -> Query {
    let mut builder = QueryBuilder::new(EntityType::Person);

    if let Some(role) = filters.role {
        builder = builder
            .filter(Predicate::Equals {
                field: "role",
                param: "role",
            })
            .bind("role", role.as_str());
    }

    builder
        .order_by("name", Direction::Asc)
        .project(person_card_fields())
        .build()
}

pub fn publications_query(filters: &PublicationFilters) -> Query {
    let mut builder = QueryBuilder::new(EntityType::Publication);

    if let Some(year) = filters.year {
        // 年份比對 publishedAt 的前綴，日期與日期時間格式都適用
        builder = builder
            .filter(Predicate::StartsWith {
                field: "publishedAt",
                param: "yearPrefix",
            })
            .bind("yearPrefix", format!("{:04}-", year));
    }

    if let Some(document_type) = filters.document_type {
        builder = builder
            .filter(Predicate::Equals {
                field: "documentType",
                param: "documentType",
            })
            .bind("documentType", document_type.as_str());
    }

    if let Some(author_id) = &filters.author_id {
        builder = builder
            .filter(Predicate::References {
                field: "authors",
                param: "authorId",
            })
            .bind("authorId", author_id.as_str());
    }

    if let Some(search) = &filters.search_query {
        builder = builder
            .filter(Predicate::Matches {
                field: "title",
                param: "searchQuery",
            })
            .bind("searchQuery", format!("*{}*", search));
    }

    builder
        .order_by("publishedAt", Direction::Desc)
        .project(publication_card_fields())
        .build()
}

pub fn projects_query(filters: &ProjectFilters) -> Query {
    let mut builder = QueryBuilder::new(EntityType::Project);

    if let Some(theme) = filters.theme {
        builder = builder
            .filter(Predicate::Equals {
                field: "theme",
                param: "theme",
            })
            .bind("theme", theme.as_str());
    }

    if let Some(status) = filters.status {
        builder = builder
            .filter(Predicate::Equals {
                field: "status",
                param: "status",
            })
            .bind("status", status.as_str());
    }

    if let Some(search) = &filters.search_query {
        builder = builder
            .filter(Predicate::Matches {
                field: "headline",
                param: "searchQuery",
            })
            .bind("searchQuery", format!("*{}*", search));
    }

    builder
        .order_by("startDate", Direction::Desc)
        .project(project_card_fields())
        .build()
}

/// Projects whose team references the given person.
pub fn projects_for_member(person_id: &str) -> Query {
    QueryBuilder::new(EntityType::Project)
        .filter(Predicate::References {
            field: "team",
            param: "personId",
        })
        .bind("personId", person_id)
        .order_by("startDate", Direction::Desc)
        .project(project_card_fields())
        .build()
}

fn by_slug(entity: EntityType, slug: &str, fields: Vec<Field>) -> Query {
    QueryBuilder::new(entity)
        .filter(Predicate::SlugEquals { param: "slug" })
        .bind("slug", slug)
        .first()
        .project(fields)
        .build()
}

pub fn person_by_slug(slug: &str) -> Query {
    by_slug(EntityType::Person, slug, person_detail_fields())
}

pub fn publication_by_slug(slug: &str) -> Query {
    by_slug(EntityType::Publication, slug, publication_detail_fields())
}

pub fn project_by_slug(slug: &str) -> Query {
    by_slug(EntityType::Project, slug, project_detail_fields())
}

/// Distinct `publishedAt` values, the raw material of the year facet.
pub fn publication_dates() -> Query {
    QueryBuilder::new(EntityType::Publication)
        .filter(Predicate::Defined {
            field: "publishedAt",
        })
        .pluck("publishedAt", true)
        .build()
}

pub fn document_types() -> Query {
    QueryBuilder::new(EntityType::Publication)
        .pluck("documentType", true)
        .build()
}
