//! User registry.
//!
//! # Responsibility
//! - Own the ordered list of team members.
//! - Keep exactly one "Me" record alive across load, import and removal.
//!
//! # Invariants
//! - A missing "Me" is synthesized (prepended) before first use.
//! - `remove_user` on the "Me" record never changes the collection.

use crate::model::user::{User, UserPatch};
use crate::storage::{load_json, save_json, KeyValueStorage};
use log::{error, info, warn};

/// Persisted collection of `User` records.
pub struct UserRegistry<S: KeyValueStorage> {
    storage: S,
    key: String,
    users: Vec<User>,
}

impl<S: KeyValueStorage> UserRegistry<S> {
    /// Loads users from `storage[key]`, falling back to `[Me]` on read failure.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let users = match load_json::<Vec<User>>(&storage, &key) {
            Ok(Some(users)) => users,
            Ok(None) => Vec::new(),
            Err(err) => {
                error!(
                    "event=users_load module=repo status=error key={} error={}",
                    key, err
                );
                Vec::new()
            }
        };

        let (users, synthesized) = ensure_single_me(users);
        let registry = Self {
            storage,
            key,
            users,
        };
        info!(
            "event=users_load module=repo status=ok count={} me_synthesized={}",
            registry.users.len(),
            synthesized
        );
        if synthesized {
            registry.persist();
        }
        registry
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    /// Returns the "Me" record.
    pub fn me(&self) -> Option<&User> {
        self.users.iter().find(|user| user.is_me)
    }

    /// Appends a new regular member and returns it.
    ///
    /// Names are not required to be unique.
    pub fn add_user(&mut self, name: impl Into<String>, color: impl Into<String>) -> User {
        let user = User::new(name, color);
        self.users.push(user.clone());
        self.persist();
        user
    }

    /// Merges `patch` into the matching user.
    ///
    /// Returns `false` (and writes nothing) when `id` is unknown.
    pub fn update_user(&mut self, id: &str, patch: &UserPatch) -> bool {
        let Some(user) = self.users.iter_mut().find(|user| user.id == id) else {
            return false;
        };
        user.apply(patch);
        self.persist();
        true
    }

    /// Deletes the matching user unless it is the "Me" record.
    ///
    /// Returns whether a record was removed.
    pub fn remove_user(&mut self, id: &str) -> bool {
        let Some(index) = self.users.iter().position(|user| user.id == id) else {
            return false;
        };
        if self.users[index].is_me {
            return false;
        }
        self.users.remove(index);
        self.persist();
        true
    }

    /// Replaces the whole collection (bulk restore).
    pub fn replace_all(&mut self, users: Vec<User>) {
        let (users, synthesized) = ensure_single_me(users);
        self.users = users;
        info!(
            "event=users_replace module=repo status=ok count={} me_synthesized={}",
            self.users.len(),
            synthesized
        );
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = save_json(&self.storage, &self.key, &self.users) {
            error!(
                "event=users_persist module=repo status=error key={} error={}",
                self.key, err
            );
        }
    }
}

/// Guarantees exactly one `is_me` record.
///
/// Prepends the default "Me" when none exists; demotes any extra flagged
/// records after the first. Returns whether "Me" was synthesized.
fn ensure_single_me(mut users: Vec<User>) -> (Vec<User>, bool) {
    let mut seen_me = false;
    for user in users.iter_mut().filter(|user| user.is_me) {
        if seen_me {
            warn!(
                "event=users_normalize module=repo status=ok action=demote_extra_me id={}",
                user.id
            );
            user.is_me = false;
        }
        seen_me = true;
    }

    if seen_me {
        return (users, false);
    }
    users.insert(0, User::default_me());
    (users, true)
}
