use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub popularity: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub summary: MovieSummary,
    pub tagline: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub cast: Vec<CastMember>,
    pub similar: Vec<MovieSummary>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PersonDetails {
    pub id: i64,
    pub name: String,
    pub biography: String,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
    pub combined_credits: Vec<PersonCastCredit>,
}

/// A single cast credit of a person. TV credits carry `name` instead of `title`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PersonCastCredit {
    pub id: i64,
    #[serde(default, alias = "name")]
    pub title: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub character: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PopularPerson {
    pub id: i64,
    pub name: String,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub popularity: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PagedResult<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl<T> PagedResult<T> {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            page: 1,
            total_pages: 0,
            total_results: 0,
        }
    }
}

fn first_page() -> u32 {
    1
}

/// Curated movie listings offered by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Popular,
    TopRated,
    Upcoming,
    NowPlaying,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Popular,
        Category::TopRated,
        Category::Upcoming,
        Category::NowPlaying,
    ];

    pub fn as_path(&self) -> &'static str {
        match self {
            Category::Popular => "popular",
            Category::TopRated => "top_rated",
            Category::Upcoming => "upcoming",
            Category::NowPlaying => "now_playing",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Popular => "Popular Movies",
            Category::TopRated => "Top Rated Movies",
            Category::Upcoming => "Upcoming Movies",
            Category::NowPlaying => "Now Playing",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_path() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}
