//! Domain DTOs for the conference API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Field names travel as camelCase on the wire. Optional fields and the
//! per-user collections in `AllData` default when absent, so older payloads
//! keep decoding. Integration tests catch any schema drift between the two
//! crates.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single talk, workshop or service slot (lunch, registration, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    #[serde(default)]
    pub room_id: Option<i64>,
    /// Ids of the speakers presenting this session.
    #[serde(default)]
    pub speakers: Vec<String>,
    #[serde(default)]
    pub is_service_session: bool,
    #[serde(default)]
    pub is_plenum_session: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Ids of the sessions this speaker presents.
    #[serde(default)]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub is_top_speaker: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sort: Option<i32>,
}

/// A session the user marked as interesting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub user_id: String,
    pub session_id: String,
}

/// A user's rating of a session. See [`Rating`] for the accepted values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: String,
    pub session_id: String,
    pub rating: i32,
}

/// The three ratings the backend accepts, carried as `-1`, `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Bad,
    Ok,
    Good,
}

impl Rating {
    pub fn value(self) -> i32 {
        match self {
            Rating::Bad => -1,
            Rating::Ok => 0,
            Rating::Good => 1,
        }
    }

    pub fn from_value(value: i32) -> Option<Rating> {
        match value {
            -1 => Some(Rating::Bad),
            0 => Some(Rating::Ok),
            1 => Some(Rating::Good),
            _ => None,
        }
    }
}

/// Everything the app displays, fetched in one request.
///
/// `favorites` and `votes` belong to the user named by the bearer token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllData {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub favorites: Vec<Favorite>,
    #[serde(default)]
    pub votes: Vec<Vote>,
}
