//! Stateless HTTP request builder and response parser for the conference API.
//!
//! # Design
//! `KonfClient` holds only a `base_url` and the user id, which doubles as the
//! bearer token. Each endpoint is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the round-trip in between, keeping the core
//! deterministic and free of I/O.

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AllData, Favorite, Rating, Vote};

/// Synchronous, stateless client for the conference API.
#[derive(Debug, Clone)]
pub struct KonfClient {
    base_url: String,
    user_id: String,
}

impl KonfClient {
    pub fn new(base_url: &str, user_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// A favorite of `session_id` owned by this client's user.
    pub fn favorite(&self, session_id: &str) -> Favorite {
        Favorite {
            user_id: self.user_id.clone(),
            session_id: session_id.to_string(),
        }
    }

    /// A vote on `session_id` owned by this client's user.
    pub fn vote(&self, session_id: &str, rating: Rating) -> Vote {
        Vote {
            user_id: self.user_id.clone(),
            session_id: session_id.to_string(),
            rating: rating.value(),
        }
    }

    /// Register the user. The body is the bare user id, not JSON, and no
    /// bearer token is attached since the user does not exist yet.
    pub fn build_create_user(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/users", self.base_url),
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: Some(self.user_id.clone()),
        }
    }

    pub fn build_get_all(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/all", self.base_url),
            headers: vec![self.authorization()],
            body: None,
        }
    }

    pub fn build_post_favorite(&self, favorite: &Favorite) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "favorites", favorite)
    }

    pub fn build_delete_favorite(&self, favorite: &Favorite) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Delete, "favorites", favorite)
    }

    pub fn build_post_vote(&self, vote: &Vote) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "votes", vote)
    }

    pub fn build_delete_vote(&self, vote: &Vote) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Delete, "votes", vote)
    }

    /// Returns `true` when the user was created and `false` when the server
    /// already knew it (409). Either way the user is registered afterwards.
    pub fn parse_create_user(&self, response: HttpResponse) -> Result<bool, ApiError> {
        if response.status == 409 {
            return Ok(false);
        }
        check_status(&response)?;
        Ok(true)
    }

    pub fn parse_get_all(&self, response: HttpResponse) -> Result<AllData, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_post_favorite(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_favorite(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_post_vote(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_vote(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn authorization(&self) -> (String, String) {
        ("authorization".to_string(), format!("Bearer {}", self.user_id))
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: format!("{}/{endpoint}", self.base_url),
            headers: vec![
                self.authorization(),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        401 | 403 => Err(ApiError::Unauthorized {
            status: response.status,
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
