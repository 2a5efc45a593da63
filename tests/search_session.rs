use cinescope::catalog::{CatalogApi, CatalogError};
use cinescope::models::{MovieDetails, MovieSummary, PagedResult, PersonDetails, PopularPerson};
use cinescope::pipeline::{QueryCriteria, SortKey};
use cinescope::session::SearchSession;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Catalog stand-in that records every request and can delay or fail selected terms.
#[derive(Default)]
struct ScriptedCatalog {
    calls: Mutex<Vec<String>>,
    delays: HashMap<String, Duration>,
    failing: Vec<String>,
}

impl ScriptedCatalog {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn page_for(label: &str) -> PagedResult<MovieSummary> {
        let movie = |id: i64, vote_average: f64, popularity: f64| MovieSummary {
            id,
            title: format!("{label} {id}"),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: Some("2020-01-01".to_string()),
            vote_average,
            vote_count: 10,
            popularity,
        };
        PagedResult {
            results: vec![movie(1, 4.0, 90.0), movie(2, 8.0, 10.0), movie(3, 7.0, 50.0)],
            page: 1,
            total_pages: 1,
            total_results: 3,
        }
    }

    async fn respond(&self, label: &str) -> cinescope::Result<PagedResult<MovieSummary>> {
        self.calls.lock().unwrap().push(label.to_string());
        if let Some(delay) = self.delays.get(label) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.iter().any(|f| f == label) {
            return Err(CatalogError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            });
        }
        Ok(Self::page_for(label))
    }
}

#[async_trait::async_trait]
impl CatalogApi for ScriptedCatalog {
    async fn list_by_category(
        &self,
        category: &str,
        _page: u32,
    ) -> cinescope::Result<PagedResult<MovieSummary>> {
        self.respond(&format!("category:{category}")).await
    }

    async fn search(&self, term: &str, _page: u32) -> cinescope::Result<PagedResult<MovieSummary>> {
        self.respond(term).await
    }

    async fn movie_details(&self, _id: i64) -> cinescope::Result<MovieDetails> {
        unreachable!("session never loads details")
    }

    async fn person_details(&self, _id: i64) -> cinescope::Result<PersonDetails> {
        unreachable!("session never loads people")
    }

    async fn popular_people(&self, _page: u32) -> cinescope::Result<PagedResult<PopularPerson>> {
        unreachable!("session never lists people")
    }
}

fn criteria(term: &str) -> QueryCriteria {
    QueryCriteria::new(Some(term.to_string()), SortKey::Popularity, 0.0)
}

#[tokio::test(start_paused = true)]
async fn rapid_input_collapses_into_one_request() {
    let catalog = Arc::new(ScriptedCatalog::default());
    let session = Arc::new(SearchSession::new(catalog.clone()));

    let mut handles = Vec::new();
    for term in ["b", "bl", "bla", "blade"] {
        let session = session.clone();
        handles.push(tokio::spawn(async move { session.submit(criteria(term)).await }));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let mut applied = Vec::new();
    for handle in handles {
        if let Some(outcome) = handle.await.unwrap().unwrap() {
            applied.push(outcome);
        }
    }

    assert_eq!(catalog.calls(), vec!["blade".to_string()]);
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].criteria.term(), Some("blade"));
}

#[tokio::test(start_paused = true)]
async fn stale_response_never_overwrites_newer_results() {
    let catalog = Arc::new(ScriptedCatalog {
        delays: HashMap::from([("slow".to_string(), Duration::from_secs(2))]),
        ..Default::default()
    });
    let session = Arc::new(SearchSession::new(catalog.clone()));

    let slow = {
        let session = session.clone();
        tokio::spawn(async move { session.submit(criteria("slow")).await })
    };
    // Past the quiet period, so the slow request is already in flight.
    tokio::time::sleep(Duration::from_millis(700)).await;
    let fast = {
        let session = session.clone();
        tokio::spawn(async move { session.submit(criteria("fast")).await })
    };

    let fast_outcome = fast.await.unwrap().unwrap().expect("newest submission applies");
    let slow_outcome = slow.await.unwrap().unwrap();

    assert!(slow_outcome.is_none());
    assert_eq!(catalog.calls(), vec!["slow".to_string(), "fast".to_string()]);
    let latest = session.latest().await.expect("an outcome was applied");
    assert_eq!(latest.ticket, fast_outcome.ticket);
    assert!(latest.movies.iter().all(|m| m.title.starts_with("fast")));
}

#[tokio::test(start_paused = true)]
async fn blank_term_loads_popular_movies_through_the_pipeline() {
    let catalog = Arc::new(ScriptedCatalog::default());
    let session = SearchSession::new(catalog.clone());

    let outcome = session
        .submit(QueryCriteria::new(Some("   ".to_string()), SortKey::VoteAverage, 5.0))
        .await
        .unwrap()
        .expect("single submission applies");

    assert_eq!(catalog.calls(), vec!["category:popular".to_string()]);
    let ids: Vec<i64> = outcome.movies.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(outcome.total_results, 3);
}

#[tokio::test(start_paused = true)]
async fn failures_surface_only_for_the_latest_submission() {
    let catalog = Arc::new(ScriptedCatalog {
        delays: HashMap::from([("broken-slow".to_string(), Duration::from_secs(2))]),
        failing: vec!["broken-slow".to_string(), "broken".to_string()],
        ..Default::default()
    });
    let session = Arc::new(SearchSession::with_quiet_period(
        catalog.clone(),
        Duration::from_millis(200),
    ));

    let stale = {
        let session = session.clone();
        tokio::spawn(async move { session.submit(criteria("broken-slow")).await })
    };
    tokio::time::sleep(Duration::from_millis(300)).await;
    let ok = session.submit(criteria("fine")).await.unwrap();
    assert!(ok.is_some());
    assert!(stale.await.unwrap().unwrap().is_none());

    let err = session.submit(criteria("broken")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Status { .. }));
    let latest = session.latest().await.expect("earlier outcome is kept");
    assert_eq!(latest.criteria.term(), Some("fine"));
}
