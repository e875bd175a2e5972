use crate::core::client::ContentClient;
use crate::core::filters::{
    self, FacetGroup, PersonFilters, ProjectFilters, PublicationFilters, UrlFilters,
};
use crate::core::query;
use crate::core::shaping::{
    self, PeopleSection, PersonCard, PersonDetail, ProjectCard, ProjectDetail, PublicationCard,
    PublicationDetail,
};
use crate::domain::model::{DocumentType, Person, Project, Publication, Role, Status};
use crate::domain::ports::ContentStore;
use serde::{Deserialize, Serialize};

pub const PEOPLE_PATH: &str = "/people";
pub const PUBLICATIONS_PATH: &str = "/publications";
pub const PROJECTS_PATH: &str = "/projects";
pub const DEFAULT_SITE_NAME: &str = "InCity Research";

/// How many items the home page shows per list and how many years the year
/// facet offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    pub home_projects: usize,
    pub home_publications: usize,
    pub home_people: usize,
    pub max_years: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            home_projects: 3,
            home_publications: 4,
            home_people: 4,
            max_years: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomePage {
    pub projects: Vec<ProjectCard>,
    pub publications: Vec<PublicationCard>,
    pub team: Vec<PersonCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeoplePage {
    pub filters: PersonFilters,
    pub facets: Vec<FacetGroup>,
    pub sections: Vec<PeopleSection>,
    pub count_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationsPage {
    pub filters: PublicationFilters,
    pub facets: Vec<FacetGroup>,
    pub publications: Vec<PublicationCard>,
    pub count_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectsPage {
    pub filters: ProjectFilters,
    pub facets: Vec<FacetGroup>,
    pub projects: Vec<ProjectCard>,
    pub count_label: String,
}

/// Loads and shapes everything a page needs. Independent fetches of one
/// page run concurrently; nothing is shared between page loads.
pub struct ContentService<S: ContentStore> {
    client: ContentClient<S>,
    limits: PageLimits,
    site_name: String,
}

impl<S: ContentStore> ContentService<S> {
    pub fn new(client: ContentClient<S>) -> Self {
        Self {
            client,
            limits: PageLimits::default(),
            site_name: DEFAULT_SITE_NAME.to_string(),
        }
    }

    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = site_name.into();
        self
    }

    // Raw fetches

    pub async fn get_all_people(&self, filters: &PersonFilters) -> Vec<Person> {
        self.client.fetch_many(&query::people_query(filters)).await
    }

    pub async fn get_person(&self, slug: &str) -> Option<Person> {
        if slug.trim().is_empty() {
            return None;
        }
        self.client.fetch_one(&query::person_by_slug(slug)).await
    }

    pub async fn get_all_publications(&self, filters: &PublicationFilters) -> Vec<Publication> {
        self.client
            .fetch_many(&query::publications_query(filters))
            .await
    }

    pub async fn get_publication(&self, slug: &str) -> Option<Publication> {
        if slug.trim().is_empty() {
            return None;
        }
        self.client
            .fetch_one(&query::publication_by_slug(slug))
            .await
    }

    pub async fn get_publications_by_author(&self, person_id: &str) -> Vec<Publication> {
        let filters = PublicationFilters {
            author_id: Some(person_id.to_string()),
            ..Default::default()
        };
        self.get_all_publications(&filters).await
    }

    pub async fn get_all_projects(&self, filters: &ProjectFilters) -> Vec<Project> {
        self.client.fetch_many(&query::projects_query(filters)).await
    }

    pub async fn get_project(&self, slug: &str) -> Option<Project> {
        if slug.trim().is_empty() {
            return None;
        }
        self.client.fetch_one(&query::project_by_slug(slug)).await
    }

    pub async fn get_projects_for_person(&self, person_id: &str) -> Vec<Project> {
        self.client
            .fetch_many(&query::projects_for_member(person_id))
            .await
    }

    pub async fn get_publication_years(&self) -> Vec<i32> {
        filters::publication_years(&self.client).await
    }

    pub async fn get_document_types(&self) -> Vec<DocumentType> {
        filters::document_types_present(&self.client).await
    }

    // Pages

    pub async fn home_page(&self) -> HomePage {
        let active = ProjectFilters {
            status: Some(Status::Active),
            ..Default::default()
        };
        let all_publications = PublicationFilters::default();
        let all_people = PersonFilters::default();
        let (projects, publications, people) = tokio::join!(
            self.get_all_projects(&active),
            self.get_all_publications(&all_publications),
            self.get_all_people(&all_people),
        );

        let team: Vec<Person> = people
            .into_iter()
            .filter(|person| matches!(person.role, Role::Director | Role::Faculty))
            .collect();

        tracing::debug!(
            "Home page: {} active projects, {} publications, {} team members",
            projects.len(),
            publications.len(),
            team.len()
        );

        HomePage {
            projects: shaping::take_recent(projects, self.limits.home_projects)
                .iter()
                .map(shaping::project_card)
                .collect(),
            publications: shaping::take_recent(publications, self.limits.home_publications)
                .iter()
                .map(shaping::publication_card)
                .collect(),
            team: shaping::take_recent(team, self.limits.home_people)
                .iter()
                .map(shaping::person_card)
                .collect(),
        }
    }

    pub async fn people_page(&self, query_string: &str) -> PeoplePage {
        let filters = PersonFilters::from_query_string(query_string);
        let people = self.get_all_people(&filters).await;

        PeoplePage {
            facets: filters::people_facets(&filters, PEOPLE_PATH),
            sections: shaping::group_by_role(&people),
            count_label: shaping::result_count(people.len(), "team member", "team members"),
            filters,
        }
    }

    pub async fn person_page(&self, slug: &str) -> Option<PersonDetail> {
        let person = self.get_person(slug).await?;
        let (publications, projects) = tokio::join!(
            self.get_publications_by_author(&person.id),
            self.get_projects_for_person(&person.id),
        );

        Some(shaping::person_detail(&person, &publications, &projects))
    }

    pub async fn publications_page(&self, query_string: &str) -> PublicationsPage {
        let filters = PublicationFilters::from_query_string(query_string);
        let (publications, years) = tokio::join!(
            self.get_all_publications(&filters),
            self.get_publication_years(),
        );

        PublicationsPage {
            facets: filters::publication_facets(
                &filters,
                &years,
                self.limits.max_years,
                PUBLICATIONS_PATH,
            ),
            count_label: shaping::result_count(publications.len(), "publication", "publications"),
            publications: publications.iter().map(shaping::publication_card).collect(),
            filters,
        }
    }

    pub async fn publication_page(&self, slug: &str) -> Option<PublicationDetail> {
        let publication = self.get_publication(slug).await?;
        Some(shaping::publication_detail(&publication, &self.site_name))
    }

    pub async fn projects_page(&self, query_string: &str) -> ProjectsPage {
        let filters = ProjectFilters::from_query_string(query_string);
        let projects = self.get_all_projects(&filters).await;

        ProjectsPage {
            facets: filters::project_facets(&filters, PROJECTS_PATH),
            count_label: shaping::result_count(projects.len(), "project", "projects"),
            projects: projects.iter().map(shaping::project_card).collect(),
            filters,
        }
    }

    pub async fn project_page(&self, slug: &str) -> Option<ProjectDetail> {
        let project = self.get_project(slug).await?;
        Some(shaping::project_detail(&project))
    }
}
