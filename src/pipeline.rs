//! Filter and ordering rules applied to catalog result sets before display.
//!
//! Everything here is pure: source records are never mutated, only cloned into a
//! filtered, reordered view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{MovieSummary, PersonCastCredit};

pub const MAX_RATING: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Popularity,
    VoteAverage,
    ReleaseDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryCriteria {
    search_term: Option<String>,
    sort_key: SortKey,
    min_rating: f64,
}

impl Default for QueryCriteria {
    fn default() -> Self {
        Self {
            search_term: None,
            sort_key: SortKey::Popularity,
            min_rating: 0.0,
        }
    }
}

impl QueryCriteria {
    pub fn new(search_term: Option<String>, sort_key: SortKey, min_rating: f64) -> Self {
        Self {
            search_term,
            sort_key,
            min_rating: clamp_rating(min_rating),
        }
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Always within `0.0..=MAX_RATING`.
    pub fn min_rating(&self) -> f64 {
        self.min_rating
    }

    /// The trimmed search term, or `None` when it is missing or blank.
    pub fn term(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

fn clamp_rating(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_RATING)
    }
}

/// Keeps movies rated at or above `criteria.min_rating`, then sorts them newest/highest first
/// by the selected key. The sort is stable, so equal keys keep their input order.
pub fn derive(raw: &[MovieSummary], criteria: &QueryCriteria) -> Vec<MovieSummary> {
    let mut view: Vec<MovieSummary> = raw
        .iter()
        .filter(|m| m.vote_average >= criteria.min_rating())
        .cloned()
        .collect();

    match criteria.sort_key() {
        SortKey::Popularity => view.sort_by(|a, b| b.popularity.total_cmp(&a.popularity)),
        SortKey::VoteAverage => view.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average)),
        SortKey::ReleaseDate => view.sort_by(|a, b| compare_release_desc(a, b)),
    }
    view
}

fn compare_release_desc(a: &MovieSummary, b: &MovieSummary) -> Ordering {
    release_day(b.release_date.as_deref()).cmp(&release_day(a.release_date.as_deref()))
}

/// Parses an ISO `YYYY-MM-DD` date. Missing or malformed dates sort as the oldest possible day.
pub fn release_day(date: Option<&str>) -> NaiveDate {
    date.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .unwrap_or(NaiveDate::MIN)
}

/// A person's most recognised credits: highest vote count first, at most `limit` entries.
pub fn known_for(credits: &[PersonCastCredit], limit: usize) -> Vec<PersonCastCredit> {
    let mut sorted = credits.to_vec();
    sorted.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
    sorted.truncate(limit);
    sorted
}
