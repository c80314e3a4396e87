//! Session list model behind the schedule screen.
//!
//! Sessions are shown in sections, one per start time. The table is rebuilt
//! from scratch whenever the data or the selected tab changes, and every
//! lookup is bounds-checked so a stale index from the view never panics.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::types::{AllData, Session};

/// Which tab of the schedule is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionsMode {
    #[default]
    All,
    Favorites,
}

/// Split `sessions` into runs of equal `starts_at`, preserving order.
///
/// Only adjacent sessions are merged: sort first if the input is not
/// already ordered by start time.
pub fn group_by_start_time(sessions: Vec<Session>) -> Vec<Vec<Session>> {
    let mut groups: Vec<Vec<Session>> = Vec::new();
    for session in sessions {
        match groups.last_mut() {
            Some(group) if group[0].starts_at == session.starts_at => group.push(session),
            _ => groups.push(vec![session]),
        }
    }
    groups
}

/// Start time, then room (sessions without a room first), then id.
pub fn compare_sessions(left: &Session, right: &Session) -> Ordering {
    left.starts_at
        .cmp(&right.starts_at)
        .then_with(|| left.room_id.cmp(&right.room_id))
        .then_with(|| left.id.cmp(&right.id))
}

pub fn sort_sessions(sessions: &mut [Session]) {
    sessions.sort_by(compare_sessions);
}

/// Sessions grouped into sections, as the schedule table displays them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTable {
    sections: Vec<Vec<Session>>,
}

impl SessionTable {
    pub fn build(data: &AllData, mode: SessionsMode) -> Self {
        let mut sessions: Vec<Session> = match mode {
            SessionsMode::All => data.sessions.clone(),
            SessionsMode::Favorites => {
                let favorite_ids: HashSet<&str> =
                    data.favorites.iter().map(|f| f.session_id.as_str()).collect();
                data.sessions
                    .iter()
                    .filter(|s| favorite_ids.contains(s.id.as_str()))
                    .cloned()
                    .collect()
            }
        };
        sort_sessions(&mut sessions);
        Self {
            sections: group_by_start_time(sessions),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn row_count(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, Vec::len)
    }

    pub fn session_at(&self, section: usize, row: usize) -> Option<&Session> {
        self.sections.get(section)?.get(row)
    }

    pub fn sections(&self) -> &[Vec<Session>] {
        &self.sections
    }
}
