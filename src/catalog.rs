use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{
    CastMember, MovieDetails, MovieSummary, PagedResult, PersonCastCredit, PersonDetails,
    PopularPerson,
};
use crate::Result;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("catalog returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("catalog JSON parse failed at '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only view of the remote movie catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_by_category(&self, category: &str, page: u32)
        -> Result<PagedResult<MovieSummary>>;
    async fn search(&self, term: &str, page: u32) -> Result<PagedResult<MovieSummary>>;
    async fn movie_details(&self, id: i64) -> Result<MovieDetails>;
    async fn person_details(&self, id: i64) -> Result<PersonDetails>;
    async fn popular_people(&self, page: u32) -> Result<PagedResult<PopularPerson>>;
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CatalogClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, TMDB_BASE)
    }

    /// Points the client at another catalog host, e.g. a local stand-in.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn category_url(&self, category: &str, page: u32) -> String {
        format!(
            "{}/movie/{category}?api_key={}&page={page}",
            self.base_url, self.api_key
        )
    }

    fn search_url(&self, term: &str, page: u32) -> String {
        format!(
            "{}/search/movie?api_key={}&query={}&page={page}",
            self.base_url,
            self.api_key,
            urlencoding::encode(term)
        )
    }

    fn movie_url(&self, id: i64) -> String {
        format!(
            "{}/movie/{id}?api_key={}&append_to_response=credits,similar",
            self.base_url, self.api_key
        )
    }

    fn person_url(&self, id: i64) -> String {
        format!(
            "{}/person/{id}?api_key={}&append_to_response=combined_credits",
            self.base_url, self.api_key
        )
    }

    fn popular_people_url(&self, page: u32) -> String {
        format!(
            "{}/person/popular?api_key={}&page={page}",
            self.base_url, self.api_key
        )
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        debug!("GET {}", redact_key(url));
        // reqwest errors print their URL, which carries the api key.
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.without_url()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| CatalogError::Transport(e.without_url()))?;
        if !status.is_success() {
            warn!("Catalog responded {} for {}", status, redact_key(url));
            return Err(CatalogError::Status { status, body: text });
        }
        let deserializer = &mut serde_json::Deserializer::from_str(&text);
        serde_path_to_error::deserialize(deserializer).map_err(|e| CatalogError::Decode {
            path: e.path().to_string(),
            source: e.into_inner(),
        })
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_by_category(
        &self,
        category: &str,
        page: u32,
    ) -> Result<PagedResult<MovieSummary>> {
        self.get_json(&self.category_url(category, page)).await
    }

    async fn search(&self, term: &str, page: u32) -> Result<PagedResult<MovieSummary>> {
        self.get_json(&self.search_url(term, page)).await
    }

    async fn movie_details(&self, id: i64) -> Result<MovieDetails> {
        let wire: MovieAppended = self.get_json(&self.movie_url(id)).await?;
        Ok(wire.into())
    }

    async fn person_details(&self, id: i64) -> Result<PersonDetails> {
        let wire: PersonAppended = self.get_json(&self.person_url(id)).await?;
        Ok(wire.into())
    }

    async fn popular_people(&self, page: u32) -> Result<PagedResult<PopularPerson>> {
        self.get_json(&self.popular_people_url(page)).await
    }
}

fn redact_key(url: &str) -> String {
    match url.find("api_key=") {
        Some(start) => {
            let value_start = start + "api_key=".len();
            let value_end = url[value_start..]
                .find('&')
                .map(|i| value_start + i)
                .unwrap_or(url.len());
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastMember>,
}

#[derive(Debug, Deserialize)]
struct Similar {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct CombinedCredits {
    #[serde(default)]
    cast: Vec<PersonCastCredit>,
}

#[derive(Debug, Deserialize)]
struct MovieAppended {
    #[serde(flatten)]
    summary: MovieSummary,
    tagline: Option<String>,
    runtime: Option<u32>,
    credits: Option<Credits>,
    similar: Option<Similar>,
}

impl From<MovieAppended> for MovieDetails {
    fn from(wire: MovieAppended) -> Self {
        MovieDetails {
            summary: wire.summary,
            tagline: wire.tagline.filter(|t| !t.is_empty()),
            runtime_minutes: wire.runtime,
            cast: wire.credits.map(|c| c.cast).unwrap_or_default(),
            similar: wire.similar.map(|s| s.results).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PersonAppended {
    id: i64,
    name: String,
    #[serde(default)]
    biography: String,
    profile_path: Option<String>,
    known_for_department: Option<String>,
    combined_credits: Option<CombinedCredits>,
}

impl From<PersonAppended> for PersonDetails {
    fn from(wire: PersonAppended) -> Self {
        PersonDetails {
            id: wire.id,
            name: wire.name,
            biography: wire.biography,
            profile_path: wire.profile_path,
            known_for_department: wire.known_for_department.filter(|d| !d.is_empty()),
            combined_credits: wire.combined_credits.map(|c| c.cast).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_urls_with_encoded_terms_and_expansions() {
        let client = CatalogClient::with_base_url("k3y", "http://catalog.test/3/");
        assert_eq!(
            client.search_url("amélie & co", 2),
            "http://catalog.test/3/search/movie?api_key=k3y&query=am%C3%A9lie%20%26%20co&page=2"
        );
        assert_eq!(
            client.category_url("top_rated", 1),
            "http://catalog.test/3/movie/top_rated?api_key=k3y&page=1"
        );
        assert_eq!(
            client.movie_url(550),
            "http://catalog.test/3/movie/550?api_key=k3y&append_to_response=credits,similar"
        );
        assert_eq!(
            client.person_url(287),
            "http://catalog.test/3/person/287?api_key=k3y&append_to_response=combined_credits"
        );
    }

    #[test]
    fn redacts_api_key_in_logged_urls() {
        assert_eq!(
            redact_key("http://x/movie/1?api_key=secret&page=1"),
            "http://x/movie/1?api_key=***&page=1"
        );
        assert_eq!(redact_key("http://x/health"), "http://x/health");
    }

    #[test]
    fn flattens_appended_movie_payload() {
        let value = json!({
            "id": 550,
            "title": "Fight Club",
            "overview": "An insomniac office worker...",
            "poster_path": "/fc.jpg",
            "backdrop_path": null,
            "release_date": "1999-10-15",
            "vote_average": 8.4,
            "vote_count": 26000,
            "popularity": 61.4,
            "tagline": "",
            "runtime": 139,
            "credits": { "cast": [
                { "id": 819, "name": "Edward Norton", "character": "The Narrator", "profile_path": null }
            ]},
            "similar": { "page": 1, "results": [
                { "id": 807, "title": "Se7en", "poster_path": null, "backdrop_path": null }
            ]}
        });
        let wire: MovieAppended = serde_json::from_value(value).expect("movie deserialize");
        let details = MovieDetails::from(wire);
        assert_eq!(details.summary.title, "Fight Club");
        assert_eq!(details.tagline, None);
        assert_eq!(details.runtime_minutes, Some(139));
        assert_eq!(details.cast[0].character, "The Narrator");
        assert_eq!(details.similar[0].id, 807);
    }

    #[test]
    fn person_without_credits_expansion_has_no_credits() {
        let value = json!({
            "id": 287,
            "name": "Brad Pitt",
            "biography": "",
            "profile_path": "/bp.jpg",
            "known_for_department": "Acting"
        });
        let wire: PersonAppended = serde_json::from_value(value).expect("person deserialize");
        let person = PersonDetails::from(wire);
        assert!(person.combined_credits.is_empty());
        assert_eq!(person.known_for_department.as_deref(), Some("Acting"));
    }
}
