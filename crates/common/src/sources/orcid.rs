//! ORCID public API adapters
//!
//! `/{orcid}/works` lists a scholar's works and `/{orcid}/work/{put-code}`
//! adds each one's contributors. `/{orcid}/person` feeds the name resolver
//! and `/search/?q=name:...` the scholar lookup.

use super::client::SourceClient;
use super::{IdentityResolver, ScholarLookup, WorkSource};
use crate::errors::{AppError, Result};
use crate::models::{is_scholar_identifier, normalize_title, WorkAuthor, WorkRecord};
use async_trait::async_trait;
use futures::future::{join, join_all};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

const SOURCE: &str = "orcid";

#[derive(Debug, Default, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    group: Vec<WorkGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkGroup {
    #[serde(default, rename = "work-summary")]
    work_summary: Vec<OrcidWork>,
}

/// A work summary, or a full work record when `contributors` is present
#[derive(Debug, Default, Deserialize)]
struct OrcidWork {
    #[serde(rename = "put-code")]
    put_code: Option<i64>,
    title: Option<TitleBlock>,
    #[serde(rename = "publication-date")]
    publication_date: Option<PublicationDate>,
    #[serde(rename = "external-ids")]
    external_ids: Option<ExternalIds>,
    url: Option<Valued>,
    contributors: Option<Contributors>,
}

#[derive(Debug, Default, Deserialize)]
struct TitleBlock {
    title: Option<Valued>,
}

#[derive(Debug, Default, Deserialize)]
struct PublicationDate {
    year: Option<Valued>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalIds {
    #[serde(default, rename = "external-id")]
    external_id: Vec<ExternalId>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalId {
    #[serde(rename = "external-id-type")]
    id_type: Option<String>,
    #[serde(rename = "external-id-value")]
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Contributors {
    #[serde(default)]
    contributor: Vec<Contributor>,
}

#[derive(Debug, Default, Deserialize)]
struct Contributor {
    #[serde(rename = "credit-name")]
    credit_name: Option<Valued>,
    #[serde(rename = "contributor-orcid")]
    contributor_orcid: Option<OrcidPath>,
}

#[derive(Debug, Default, Deserialize)]
struct OrcidPath {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Valued {
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PersonResponse {
    name: Option<PersonName>,
}

#[derive(Debug, Default, Deserialize)]
struct PersonName {
    #[serde(rename = "given-names")]
    given_names: Option<Valued>,
    #[serde(rename = "family-name")]
    family_name: Option<Valued>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Option<Vec<SearchResult>>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    #[serde(rename = "orcid-identifier")]
    orcid_identifier: Option<OrcidPath>,
}

impl Valued {
    fn text(block: &Option<Valued>) -> Option<String> {
        block
            .as_ref()
            .and_then(|v| v.value.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

impl ExternalIds {
    fn find(&self, id_type: &str) -> Option<String> {
        self.external_id
            .iter()
            .find(|e| e.id_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(id_type)))
            .and_then(|e| e.value.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

impl OrcidPath {
    fn identifier(path: &Option<OrcidPath>) -> Option<&str> {
        path.as_ref()
            .and_then(|p| p.path.as_deref())
            .map(str::trim)
            .filter(|p| is_scholar_identifier(p))
    }
}

/// The scholar whose works are being listed
struct Owner<'a> {
    orcid: &'a str,
    name: Option<&'a str>,
}

impl Owner<'_> {
    fn author(&self) -> WorkAuthor {
        WorkAuthor::identified(self.orcid, self.name.unwrap_or(self.orcid))
    }

    fn is_credited_as(&self, credit_name: &str) -> bool {
        self.name
            .is_some_and(|name| normalize_title(name) == normalize_title(credit_name))
    }
}

/// The owner first, then every other contributor with an iD or a credit
/// name. The owner's own contributor entry is recognized by iD, or by
/// credit name when it carries none.
fn credited_authors(owner: &Owner<'_>, work: &OrcidWork) -> Vec<WorkAuthor> {
    let mut authors = vec![owner.author()];
    let contributors = work.contributors.iter().flat_map(|c| c.contributor.iter());

    for contributor in contributors {
        let name = Valued::text(&contributor.credit_name);
        let author = match OrcidPath::identifier(&contributor.contributor_orcid) {
            Some(id) if id == owner.orcid => continue,
            Some(id) => WorkAuthor::identified(id, name.unwrap_or_else(|| id.to_string())),
            None => match name {
                Some(name) if !owner.is_credited_as(&name) => WorkAuthor::anonymous(name),
                _ => continue,
            },
        };
        if !authors.contains(&author) {
            authors.push(author);
        }
    }
    authors
}

fn work_to_record(owner: &Owner<'_>, work: &OrcidWork) -> WorkRecord {
    let title = work
        .title
        .as_ref()
        .and_then(|t| Valued::text(&t.title))
        .unwrap_or_else(|| "Untitled".to_string());

    let year = work
        .publication_date
        .as_ref()
        .and_then(|d| Valued::text(&d.year))
        .and_then(|y| y.parse::<i32>().ok());

    let (doi, isbn) = work
        .external_ids
        .as_ref()
        .map(|ids| (ids.find("doi"), ids.find("isbn")))
        .unwrap_or((None, None));

    let put_code = work
        .put_code
        .map(|p| p.to_string())
        .unwrap_or_else(|| title.clone());

    let id = doi
        .clone()
        .or_else(|| isbn.clone())
        .unwrap_or_else(|| format!("{}-{}", owner.orcid, put_code));

    let url = doi
        .as_ref()
        .map(|d| format!("https://doi.org/{}", d))
        .or_else(|| Valued::text(&work.url));

    WorkRecord {
        id,
        title,
        year,
        authors: credited_authors(owner, work),
        doi,
        url,
        isbn,
    }
}

/// First summary of each group; ORCID groups duplicates of one work.
fn summaries(response: WorksResponse) -> Vec<OrcidWork> {
    response
        .group
        .into_iter()
        .filter_map(|g| g.work_summary.into_iter().next())
        .collect()
}

fn display_name(person: &PersonResponse) -> Option<String> {
    let name = person.name.as_ref()?;
    let joined = [Valued::text(&name.given_names), Valued::text(&name.family_name)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

fn first_identifier(response: &SearchResponse) -> Option<String> {
    response
        .result
        .iter()
        .flatten()
        .find_map(|r| OrcidPath::identifier(&r.orcid_identifier))
        .map(str::to_string)
}

async fn fetch_display_name(client: &SourceClient, base_url: &str, orcid: &str) -> Result<Option<String>> {
    let url = format!("{}/{}/person", base_url, orcid);
    let person: PersonResponse = client.get_json(SOURCE, &url).await?;
    Ok(display_name(&person))
}

/// Work source over `GET {base}/{orcid}/works` plus one
/// `GET {base}/{orcid}/work/{put-code}` per work
pub struct OrcidWorkSource {
    client: SourceClient,
    base_url: String,
}

impl OrcidWorkSource {
    pub fn new(client: SourceClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Full record for one summary; `None` sends the caller back to the
    /// summary.
    async fn detail(&self, orcid: &str, summary: &OrcidWork) -> Option<OrcidWork> {
        let put_code = summary.put_code?;
        let url = format!("{}/{}/work/{}", self.base_url, orcid, put_code);
        match self.client.get_json::<OrcidWork>(SOURCE, &url).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                debug!(put_code, error = %e, "Work detail unavailable, using summary");
                None
            }
        }
    }

    async fn owner_name(&self, orcid: &str) -> Option<String> {
        match fetch_display_name(&self.client, &self.base_url, orcid).await {
            Ok(name) => name,
            Err(e) => {
                debug!(error = %e, "Owner name unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl WorkSource for OrcidWorkSource {
    #[instrument(skip(self))]
    async fn fetch_works(&self, scholar: &str) -> Result<Vec<WorkRecord>> {
        if !is_scholar_identifier(scholar) {
            return Err(AppError::InvalidIdentifier {
                identifier: scholar.to_string(),
            });
        }

        let url = format!("{}/{}/works", self.base_url, scholar);
        let response: WorksResponse = self.client.get_json(SOURCE, &url).await?;
        let listed = summaries(response);

        let details = join_all(listed.iter().map(|s| self.detail(scholar, s)));
        let (name, details) = join(self.owner_name(scholar), details).await;

        let owner = Owner {
            orcid: scholar,
            name: name.as_deref(),
        };
        let works: Vec<WorkRecord> = listed
            .iter()
            .zip(&details)
            .map(|(summary, detail)| work_to_record(&owner, detail.as_ref().unwrap_or(summary)))
            .collect();

        debug!(
            count = works.len(),
            detailed = details.iter().filter(|d| d.is_some()).count(),
            "Fetched ORCID works"
        );
        Ok(works)
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

/// Name resolver over `GET {base}/{orcid}/person`
pub struct OrcidNameResolver {
    client: SourceClient,
    base_url: String,
}

impl OrcidNameResolver {
    pub fn new(client: SourceClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl IdentityResolver for OrcidNameResolver {
    async fn resolve_name(&self, identifier: &str) -> String {
        if !is_scholar_identifier(identifier) {
            return identifier.to_string();
        }

        match fetch_display_name(&self.client, &self.base_url, identifier).await {
            Ok(Some(name)) => name,
            Ok(None) => identifier.to_string(),
            Err(e) => {
                warn!(identifier, error = %e, "Name lookup failed, using identifier");
                identifier.to_string()
            }
        }
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

/// Scholar lookup over `GET {base}/search/?q=name:...`, taking the first hit
pub struct OrcidScholarSearch {
    client: SourceClient,
    base_url: String,
}

impl OrcidScholarSearch {
    pub fn new(client: SourceClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn search(&self, name: &str) -> Result<Option<String>> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search/", self.base_url),
            &[("q", format!("name:{}", name))],
        )
        .map_err(|e| AppError::Configuration {
            message: format!("Invalid ORCID base URL: {}", e),
        })?;

        let response: SearchResponse = self.client.get_json(SOURCE, url.as_str()).await?;
        Ok(first_identifier(&response))
    }
}

#[async_trait]
impl ScholarLookup for OrcidScholarSearch {
    #[instrument(skip(self))]
    async fn find_identifier(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        match self.search(name).await {
            Ok(found) => {
                debug!(found = ?found, "ORCID name search");
                found
            }
            Err(e) => {
                warn!(error = %e, "ORCID name search failed");
                None
            }
        }
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
