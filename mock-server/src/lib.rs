use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::Arc,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

/// Catalog bundled with the server, used when no seed file is configured.
pub const BUNDLED_SEED: &str = include_str!("../data/seed.json");

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub speakers: Vec<String>,
    #[serde(default)]
    pub is_service_session: bool,
    #[serde(default)]
    pub is_plenum_session: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub is_top_speaker: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub user_id: String,
    pub session_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: String,
    pub session_id: String,
    pub rating: i32,
}

/// The conference program: everything in `/all` that is not per-user.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl Catalog {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn bundled() -> serde_json::Result<Self> {
        Self::from_json(BUNDLED_SEED)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AllData {
    pub sessions: Vec<Session>,
    pub speakers: Vec<Speaker>,
    pub rooms: Vec<Room>,
    pub favorites: Vec<Favorite>,
    pub votes: Vec<Vote>,
}

#[derive(Debug, Default)]
pub struct Store {
    catalog: Catalog,
    session_ids: HashSet<String>,
    users: HashSet<String>,
    favorites: BTreeSet<(String, String)>,
    votes: BTreeMap<(String, String), i32>,
}

impl Store {
    pub fn new(catalog: Catalog) -> Self {
        let session_ids = catalog.sessions.iter().map(|s| s.id.clone()).collect();
        Self {
            catalog,
            session_ids,
            ..Self::default()
        }
    }

    /// Resolve the bearer token to a registered user.
    fn authorize(&self, headers: &HeaderMap) -> Result<String, StatusCode> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(StatusCode::UNAUTHORIZED)?;
        if !self.users.contains(token) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(token.to_string())
    }

    /// Authorize, then check the payload belongs to the caller and names a
    /// known session.
    fn check_owner(&self, headers: &HeaderMap, user_id: &str, session_id: &str) -> Result<(), StatusCode> {
        let user = self.authorize(headers)?;
        if user != user_id {
            return Err(StatusCode::FORBIDDEN);
        }
        if !self.session_ids.contains(session_id) {
            return Err(StatusCode::NOT_FOUND);
        }
        Ok(())
    }

    fn all_for(&self, user: &str) -> AllData {
        let favorites = self
            .favorites
            .iter()
            .filter(|(u, _)| u == user)
            .map(|(u, s)| Favorite {
                user_id: u.clone(),
                session_id: s.clone(),
            })
            .collect();
        let votes = self
            .votes
            .iter()
            .filter(|((u, _), _)| u == user)
            .map(|((u, s), rating)| Vote {
                user_id: u.clone(),
                session_id: s.clone(),
                rating: *rating,
            })
            .collect();
        AllData {
            sessions: self.catalog.sessions.clone(),
            speakers: self.catalog.speakers.clone(),
            rooms: self.catalog.rooms.clone(),
            favorites,
            votes,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Router over the bundled catalog.
pub fn app() -> Router {
    app_with(Catalog::bundled().unwrap_or_default())
}

pub fn app_with(catalog: Catalog) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new(catalog)));
    Router::new()
        .route("/users", post(create_user))
        .route("/all", get(get_all))
        .route("/favorites", post(post_favorite).delete(delete_favorite))
        .route("/votes", post(post_vote).delete(delete_vote))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Catalog::bundled().unwrap_or_default()).await
}

pub async fn run_with(listener: TcpListener, catalog: Catalog) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(catalog)).await
}

async fn create_user(State(db): State<Db>, body: String) -> StatusCode {
    let user_id = body.trim();
    if user_id.is_empty() {
        return StatusCode::BAD_REQUEST;
    }
    if db.write().await.users.insert(user_id.to_string()) {
        info!(user_id, "user registered");
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}

async fn get_all(State(db): State<Db>, headers: HeaderMap) -> Result<Json<AllData>, StatusCode> {
    let store = db.read().await;
    let user = store.authorize(&headers)?;
    Ok(Json(store.all_for(&user)))
}

async fn post_favorite(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Favorite>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store.check_owner(&headers, &input.user_id, &input.session_id)?;
    store.favorites.insert((input.user_id.clone(), input.session_id.clone()));
    info!(user_id = %input.user_id, session_id = %input.session_id, "favorite added");
    Ok(StatusCode::CREATED)
}

async fn delete_favorite(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Favorite>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store.check_owner(&headers, &input.user_id, &input.session_id)?;
    if !store.favorites.remove(&(input.user_id.clone(), input.session_id.clone())) {
        return Err(StatusCode::NOT_FOUND);
    }
    info!(user_id = %input.user_id, session_id = %input.session_id, "favorite removed");
    Ok(StatusCode::OK)
}

async fn post_vote(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Vote>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store.check_owner(&headers, &input.user_id, &input.session_id)?;
    if !(-1..=1).contains(&input.rating) {
        return Err(StatusCode::BAD_REQUEST);
    }
    store
        .votes
        .insert((input.user_id.clone(), input.session_id.clone()), input.rating);
    info!(user_id = %input.user_id, session_id = %input.session_id, rating = input.rating, "vote recorded");
    Ok(StatusCode::CREATED)
}

async fn delete_vote(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Vote>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store.check_owner(&headers, &input.user_id, &input.session_id)?;
    if store
        .votes
        .remove(&(input.user_id.clone(), input.session_id.clone()))
        .is_none()
    {
        return Err(StatusCode::NOT_FOUND);
    }
    info!(user_id = %input.user_id, session_id = %input.session_id, "vote removed");
    Ok(StatusCode::OK)
}
