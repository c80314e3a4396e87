//! Executing client and native callback adapter.
//!
//! # Design
//! `KonfApi` glues `KonfClient` to a `Transport`: each method is
//! build → execute → parse. The `*_with` variants are for native callers
//! that cannot block or await. They run the blocking call on a fresh
//! background thread and hand the result to a plain callback exactly once.
//! Nothing is retried; the callback decides what to do with an error.

use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::client::KonfClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{AllData, Favorite, Vote};

pub struct KonfApi<T: Transport = UreqTransport> {
    client: KonfClient,
    transport: Arc<T>,
}

impl<T: Transport> Clone for KonfApi<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl KonfApi<UreqTransport> {
    pub fn new(base_url: &str, user_id: &str) -> Self {
        Self::with_transport(KonfClient::new(base_url, user_id), UreqTransport::new())
    }

    pub fn from_config(config: &ClientConfig, user_id: &str) -> Self {
        Self::new(&config.base_url(), user_id)
    }
}

impl<T: Transport> KonfApi<T> {
    pub fn with_transport(client: KonfClient, transport: T) -> Self {
        Self {
            client,
            transport: Arc::new(transport),
        }
    }

    pub fn client(&self) -> &KonfClient {
        &self.client
    }

    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "dispatching request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "response received");
        Ok(response)
    }

    pub fn create_user(&self) -> Result<bool, ApiError> {
        let response = self.round_trip(self.client.build_create_user())?;
        self.client.parse_create_user(response)
    }

    pub fn get_all(&self) -> Result<AllData, ApiError> {
        let response = self.round_trip(self.client.build_get_all())?;
        self.client.parse_get_all(response)
    }

    pub fn post_favorite(&self, favorite: &Favorite) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_post_favorite(favorite)?)?;
        self.client.parse_post_favorite(response)
    }

    pub fn delete_favorite(&self, favorite: &Favorite) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_favorite(favorite)?)?;
        self.client.parse_delete_favorite(response)
    }

    pub fn post_vote(&self, vote: &Vote) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_post_vote(vote)?)?;
        self.client.parse_post_vote(response)
    }

    pub fn delete_vote(&self, vote: &Vote) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_vote(vote)?)?;
        self.client.parse_delete_vote(response)
    }

    pub fn create_user_with<C>(&self, callback: C)
    where
        C: FnOnce(Result<bool, ApiError>) + Send + 'static,
    {
        self.dispatch("create_user", |api| api.create_user(), callback);
    }

    pub fn get_all_with<C>(&self, callback: C)
    where
        C: FnOnce(Result<AllData, ApiError>) + Send + 'static,
    {
        self.dispatch("get_all", |api| api.get_all(), callback);
    }

    pub fn post_favorite_with<C>(&self, favorite: Favorite, callback: C)
    where
        C: FnOnce(Result<(), ApiError>) + Send + 'static,
    {
        self.dispatch("post_favorite", move |api| api.post_favorite(&favorite), callback);
    }

    pub fn delete_favorite_with<C>(&self, favorite: Favorite, callback: C)
    where
        C: FnOnce(Result<(), ApiError>) + Send + 'static,
    {
        self.dispatch("delete_favorite", move |api| api.delete_favorite(&favorite), callback);
    }

    pub fn post_vote_with<C>(&self, vote: Vote, callback: C)
    where
        C: FnOnce(Result<(), ApiError>) + Send + 'static,
    {
        self.dispatch("post_vote", move |api| api.post_vote(&vote), callback);
    }

    pub fn delete_vote_with<C>(&self, vote: Vote, callback: C)
    where
        C: FnOnce(Result<(), ApiError>) + Send + 'static,
    {
        self.dispatch("delete_vote", move |api| api.delete_vote(&vote), callback);
    }

    fn dispatch<R, F, C>(&self, operation: &'static str, call: F, callback: C)
    where
        R: Send + 'static,
        F: FnOnce(&KonfApi<T>) -> Result<R, ApiError> + Send + 'static,
        C: FnOnce(Result<R, ApiError>) + Send + 'static,
    {
        let api = self.clone();
        thread::spawn(move || {
            let result = call(&api);
            if let Err(err) = &result {
                warn!(operation, error = %err, "request failed");
            }
            callback(result);
        });
    }
}
