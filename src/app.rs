use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::catalog::{CatalogApi, CatalogClient, CatalogError};
use crate::config::Config;
use crate::images::{image_url, ImageSize};
use crate::models::{
    CastMember, Category, MovieSummary, PagedResult, PersonCastCredit, PopularPerson,
};
use crate::pipeline::{derive, known_for, QueryCriteria, SortKey};

const DETAIL_CAST_LIMIT: usize = 6;
const DETAIL_SIMILAR_LIMIT: usize = 6;
const KNOWN_FOR_LIMIT: usize = 8;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogApi>,
}

pub async fn run_server(config: Config) -> Result<()> {
    let catalog: Arc<dyn CatalogApi> = Arc::new(CatalogClient::new(config.api_key.clone()));
    let app = build_router(AppState { catalog });

    info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/movies", get(home_feed))
        .route("/movies/:id", get(movie_view))
        .route("/search", get(search_view))
        .route("/categories/:category", get(category_view))
        .route("/people", get(people_view))
        .route("/people/:id", get(person_view))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub sort: Option<SortKey>,
    pub min_rating: Option<f64>,
    pub page: Option<u32>,
}

impl ListQuery {
    fn criteria(&self) -> QueryCriteria {
        QueryCriteria::new(
            self.q.clone(),
            self.sort.unwrap_or_default(),
            self.min_rating.unwrap_or(0.0),
        )
    }

    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Serialize)]
pub struct MovieCard {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_url: String,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u32,
    pub popularity: f64,
}

impl From<&MovieSummary> for MovieCard {
    fn from(movie: &MovieSummary) -> Self {
        MovieCard {
            id: movie.id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            poster_url: image_url(ImageSize::Large, movie.poster_path.as_deref()),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            popularity: movie.popularity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiscoverView {
    pub title: String,
    pub page: u32,
    pub total_pages: u32,
    /// Upstream match count across all pages.
    pub total_results: u32,
    /// Movies on this page left after the rating filter.
    pub shown: usize,
    pub results: Vec<MovieCard>,
}

impl DiscoverView {
    fn build(title: String, page: &PagedResult<MovieSummary>, criteria: &QueryCriteria) -> Self {
        let results: Vec<MovieCard> = derive(&page.results, criteria)
            .iter()
            .map(MovieCard::from)
            .collect();
        DiscoverView {
            title,
            page: page.page,
            total_pages: page.total_pages,
            total_results: page.total_results,
            shown: results.len(),
            results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CastCard {
    pub id: i64,
    pub name: String,
    pub character: String,
    pub profile_url: String,
}

impl From<&CastMember> for CastCard {
    fn from(member: &CastMember) -> Self {
        CastCard {
            id: member.id,
            name: member.name.clone(),
            character: member.character.clone(),
            profile_url: image_url(ImageSize::Medium, member.profile_path.as_deref()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieView {
    pub id: i64,
    pub title: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub release_date: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub vote_average: f64,
    pub vote_count: u32,
    pub poster_url: String,
    pub backdrop_url: String,
    pub cast: Vec<CastCard>,
    pub similar: Vec<MovieCard>,
}

#[derive(Debug, Serialize)]
pub struct CreditCard {
    pub id: i64,
    pub title: String,
    pub character: String,
    pub poster_url: String,
    pub vote_count: u32,
}

impl From<&PersonCastCredit> for CreditCard {
    fn from(credit: &PersonCastCredit) -> Self {
        CreditCard {
            id: credit.id,
            title: credit.title.clone(),
            character: credit.character.clone(),
            poster_url: image_url(ImageSize::Medium, credit.poster_path.as_deref()),
            vote_count: credit.vote_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonView {
    pub id: i64,
    pub name: String,
    pub biography: String,
    pub known_for_department: Option<String>,
    pub profile_url: String,
    pub known_for: Vec<CreditCard>,
}

#[derive(Debug, Serialize)]
pub struct PersonCard {
    pub id: i64,
    pub name: String,
    pub known_for_department: Option<String>,
    pub profile_url: String,
}

impl From<&PopularPerson> for PersonCard {
    fn from(person: &PopularPerson) -> Self {
        PersonCard {
            id: person.id,
            name: person.name.clone(),
            known_for_department: person.known_for_department.clone(),
            profile_url: image_url(ImageSize::Large, person.profile_path.as_deref()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PeopleView {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub results: Vec<PersonCard>,
}

/// Any catalog failure, rendered to clients as a generic error.
pub struct AppError {
    action: String,
    source: CatalogError,
}

impl AppError {
    fn during(action: impl Into<String>) -> impl FnOnce(CatalogError) -> AppError {
        let action = action.into();
        move |source| AppError { action, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("{} failed: {}", self.action, self.source);
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({"status": "error", "message": "Something went wrong"})),
        )
            .into_response()
    }
}

type ViewResult<T> = std::result::Result<Json<T>, AppError>;

async fn home_feed(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ViewResult<DiscoverView> {
    let criteria = query.criteria();
    let (title, page) = match criteria.term() {
        Some(term) => (
            format!("Results for \"{}\"", term),
            state
                .catalog
                .search(term, query.page())
                .await
                .map_err(AppError::during(format!("Search for '{}'", term)))?,
        ),
        None => (
            Category::Popular.title().to_string(),
            state
                .catalog
                .list_by_category(Category::Popular.as_path(), query.page())
                .await
                .map_err(AppError::during("Popular listing"))?,
        ),
    };
    Ok(Json(DiscoverView::build(title, &page, &criteria)))
}

async fn search_view(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ViewResult<DiscoverView> {
    let criteria = query.criteria();
    let Some(term) = criteria.term() else {
        return Ok(Json(DiscoverView::build(
            "Search".to_string(),
            &PagedResult::empty(),
            &criteria,
        )));
    };
    let page = state
        .catalog
        .search(term, query.page())
        .await
        .map_err(AppError::during(format!("Search for '{}'", term)))?;
    Ok(Json(DiscoverView::build(
        format!("Results for \"{}\"", term),
        &page,
        &criteria,
    )))
}

async fn category_view(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<ListQuery>,
) -> ViewResult<DiscoverView> {
    let title = category
        .parse::<Category>()
        .map(|c| c.title().to_string())
        .unwrap_or_else(|_| category.clone());
    let page = state
        .catalog
        .list_by_category(&category, query.page())
        .await
        .map_err(AppError::during(format!("Category '{}' listing", category)))?;
    Ok(Json(DiscoverView::build(title, &page, &query.criteria())))
}

async fn movie_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ViewResult<MovieView> {
    let details = state
        .catalog
        .movie_details(id)
        .await
        .map_err(AppError::during(format!("Movie {} lookup", id)))?;
    let movie = &details.summary;
    Ok(Json(MovieView {
        id: movie.id,
        title: movie.title.clone(),
        tagline: details.tagline.clone(),
        overview: movie.overview.clone(),
        release_date: movie.release_date.clone(),
        runtime_minutes: details.runtime_minutes,
        vote_average: movie.vote_average,
        vote_count: movie.vote_count,
        poster_url: image_url(ImageSize::Large, movie.poster_path.as_deref()),
        backdrop_url: image_url(ImageSize::Original, movie.backdrop_path.as_deref()),
        cast: details
            .cast
            .iter()
            .take(DETAIL_CAST_LIMIT)
            .map(CastCard::from)
            .collect(),
        similar: details
            .similar
            .iter()
            .take(DETAIL_SIMILAR_LIMIT)
            .map(MovieCard::from)
            .collect(),
    }))
}

async fn person_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ViewResult<PersonView> {
    let person = state
        .catalog
        .person_details(id)
        .await
        .map_err(AppError::during(format!("Person {} lookup", id)))?;
    Ok(Json(PersonView {
        id: person.id,
        profile_url: image_url(ImageSize::Large, person.profile_path.as_deref()),
        known_for: known_for(&person.combined_credits, KNOWN_FOR_LIMIT)
            .iter()
            .map(CreditCard::from)
            .collect(),
        name: person.name,
        biography: person.biography,
        known_for_department: person.known_for_department,
    }))
}

async fn people_view(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ViewResult<PeopleView> {
    let people = state
        .catalog
        .popular_people(query.page())
        .await
        .map_err(AppError::during("Popular people listing"))?;
    Ok(Json(PeopleView {
        page: people.page,
        total_pages: people.total_pages,
        total_results: people.total_results,
        results: people.results.iter().map(PersonCard::from).collect(),
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
