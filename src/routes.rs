use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::Validate;

use crate::{
    AppState,
    auth::CurrentUser,
    error::{AppError, AppResult},
    extract::{JsonBody, PathParam},
    models::{
        CreditAdjustment, CreditBalance, Credentials, Movie, MovieSummary, NameSuggestions,
        PagedResult, Profile, ProfileUpdate, Registration, SearchCriteria, TokenResponse,
        TrailerLink,
    },
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/movies", post(search_movies))
        .route("/movies/all-genres", get(all_genres))
        .route("/movies/movie/{id}", get(movie))
        .route("/movies/movie/{id}/trailer", get(trailer))
        .route("/movies/suggestions/{term}", get(suggestions))
        .route("/movies/actor/suggestion/{term}", get(actor_suggestions))
        .route("/movies/writer/suggestion/{term}", get(writer_suggestions))
        .route("/movies/writer/{name}", get(movies_by_writer))
        .route("/users/auth/register", post(register))
        .route("/users/myaccount", get(my_account).patch(update_account))
        .route("/users/credits", get(credits).post(add_credits))
        .route("/users/rent/{film_id}", post(rent))
        .route("/users/rented-movies", get(rented_movies))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> AppResult<Json<TokenResponse>> {
    state.login_limiter.check().map_err(|_| AppError::RateLimited)?;
    let email = state.accounts.authenticate(&credentials).await?;
    let token = state.tokens.issue(&email)?;
    Ok(Json(TokenResponse { token }))
}

pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    JsonBody(criteria): JsonBody<SearchCriteria>,
) -> AppResult<Json<PagedResult<MovieSummary>>> {
    Ok(Json(state.movies.search_movies(&criteria).await?))
}

pub async fn all_genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.movies.get_genres().await?))
}

pub async fn movie(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<Movie>> {
    let movie = state.movies.get_movie(id).await?.ok_or(AppError::NotFound("movie"))?;
    Ok(Json(movie))
}

pub async fn trailer(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<TrailerLink>> {
    let url = state.movies.get_movie_trailer(id).await?.ok_or(AppError::NotFound("trailer"))?;
    Ok(Json(TrailerLink { url }))
}

pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    PathParam(term): PathParam<String>,
) -> AppResult<Json<NameSuggestions>> {
    let suggestions = state.movies.get_suggestions(&term).await?;
    Ok(Json(NameSuggestions { suggestions }))
}

pub async fn actor_suggestions(
    State(state): State<Arc<AppState>>,
    PathParam(term): PathParam<String>,
) -> AppResult<Json<NameSuggestions>> {
    let suggestions = state.movies.get_actor_suggestions(&term).await?;
    Ok(Json(NameSuggestions { suggestions }))
}

pub async fn writer_suggestions(
    State(state): State<Arc<AppState>>,
    PathParam(term): PathParam<String>,
) -> AppResult<Json<NameSuggestions>> {
    let suggestions = state.movies.get_writer_suggestions(&term).await?;
    Ok(Json(NameSuggestions { suggestions }))
}

pub async fn movies_by_writer(
    State(state): State<Arc<AppState>>,
    PathParam(name): PathParam<String>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    Ok(Json(state.movies.get_movies_by_writer(&name).await?))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(registration): JsonBody<Registration>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    let profile = state.accounts.register(&registration).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn my_account(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> AppResult<Json<Profile>> {
    let profile =
        state.accounts.get_profile(&user.email).await?.ok_or(AppError::NotFound("client"))?;
    Ok(Json(profile))
}

pub async fn update_account(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> AppResult<Json<Profile>> {
    if !state.accounts.update_profile(&user.email, &update).await? {
        return Err(AppError::NotFound("client"));
    }
    let profile =
        state.accounts.get_profile(&user.email).await?.ok_or(AppError::NotFound("client"))?;
    Ok(Json(profile))
}

pub async fn credits(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> AppResult<Json<CreditBalance>> {
    let credits =
        state.accounts.get_balance(&user.email).await?.ok_or(AppError::NotFound("client"))?;
    Ok(Json(CreditBalance { credits }))
}

pub async fn add_credits(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    JsonBody(adjustment): JsonBody<CreditAdjustment>,
) -> AppResult<Json<CreditBalance>> {
    adjustment.validate()?;
    let credits = state
        .accounts
        .add_credits(&user.email, adjustment.amount)
        .await?
        .ok_or(AppError::NotFound("client"))?;
    Ok(Json(CreditBalance { credits }))
}

pub async fn rent(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathParam(film_id): PathParam<i32>,
) -> AppResult<Json<CreditBalance>> {
    let credits = state.accounts.rent(&user.email, film_id).await?;
    Ok(Json(CreditBalance { credits }))
}

pub async fn rented_movies(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> AppResult<Json<Vec<MovieSummary>>> {
    Ok(Json(state.accounts.get_rented_movies(&user.email).await?))
}
