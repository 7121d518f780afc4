//! The in-memory store: visit counter, users, and messages.
//!
//! All state lives in a single [`Store`] owned by the application for the
//! lifetime of the process; a restart yields empty collections and a zero
//! counter. A single mutex serializes every read and write so that id
//! assignment and insertion-order invariants hold even when requests are
//! handled concurrently. No lock is ever held across an `.await` point;
//! every operation is synchronous and copies its result out of the guard.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author recorded for messages posted without one.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// A registered user.
///
/// Immutable once created; the only lifecycle transition is deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A posted message.
///
/// Immutable once created; messages are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    visits: u64,
    next_user_id: u64,
    next_message_id: u64,
    users: Vec<User>,
    messages: Vec<Message>,
}

/// Process-wide in-memory state: a visit counter and two ordered collections.
///
/// Ids come from monotonic per-collection counters, not from collection
/// length, so an id is never reused after a deletion.
///
/// # Examples
///
/// ```
/// use pinboard::store::Store;
///
/// let store = Store::new();
/// let alice = store.add_user("Alice", "alice@example.com");
/// assert_eq!(alice.id, 1);
/// assert_eq!(store.user_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Store {
    inner: Mutex<Inner>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock means a panic unwound mid-operation; every operation
    // leaves `Inner` consistent at each step, so the state is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one inbound request. Called once per request regardless of outcome.
    pub fn record_visit(&self) {
        self.lock().visits += 1;
    }

    /// Returns the total number of requests seen by this process.
    pub fn visits(&self) -> u64 {
        self.lock().visits
    }

    /// Appends a new user and returns the created record.
    ///
    /// Callers are responsible for validating that `name` and `email` are
    /// present and non-empty before delegating here.
    pub fn add_user(&self, name: impl Into<String>, email: impl Into<String>) -> User {
        let mut inner = self.lock();
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            name: name.into(),
            email: email.into(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        user
    }

    /// Returns all users in insertion (creation) order.
    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    /// Returns the first user with the given id, if any.
    pub fn user(&self, id: u64) -> Option<User> {
        self.lock().users.iter().find(|u| u.id == id).cloned()
    }

    /// Removes every user whose id matches (at most one in practice).
    ///
    /// Returns `true` if a record was removed. Removing a non-existent id is
    /// not an error; callers treat both outcomes as success.
    pub fn remove_user(&self, id: u64) -> bool {
        let mut inner = self.lock();
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        inner.users.len() < before
    }

    /// Appends a new message and returns the created record.
    ///
    /// When `author` is `None` the message is attributed to
    /// [`ANONYMOUS_AUTHOR`]. Callers validate `content` presence first.
    pub fn add_message(&self, content: impl Into<String>, author: Option<String>) -> Message {
        let mut inner = self.lock();
        inner.next_message_id += 1;
        let message = Message {
            id: inner.next_message_id,
            content: content.into(),
            author: author.unwrap_or_else(|| ANONYMOUS_AUTHOR.to_owned()),
            created_at: Utc::now(),
        };
        inner.messages.push(message.clone());
        message
    }

    /// Returns all messages newest-first.
    ///
    /// Reverse insertion order applies to message listing only; user listing
    /// and search use forward insertion order.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.iter().rev().cloned().collect()
    }

    /// Returns users whose name contains `query`, case-insensitively, in
    /// insertion order.
    pub fn search_users(&self, query: &str) -> Vec<User> {
        let needle = query.to_lowercase();
        self.lock()
            .users
            .iter()
            .filter(|u| u.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Returns the current number of users.
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Returns the current number of messages.
    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }
}
