// 🔑 Credential store - gates borrowing and returning behind a login
//
// Usernames are unique. Passwords are opaque strings compared by equality and
// are never written to the record file.

use serde::{Deserialize, Serialize};

use crate::error::PreconditionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        User {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Vec<User>,
}

impl UserStore {
    pub fn new() -> Self {
        UserStore { users: Vec::new() }
    }

    /// Build a store from seed users, keeping the first of any duplicate name
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut store = UserStore::new();
        for user in users {
            if let Err(err) = store.insert(user) {
                tracing::warn!("ignoring seed user: {}", err);
            }
        }
        store
    }

    pub fn register(
        &mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<&User, PreconditionError> {
        self.insert(User::new(username, password))
    }

    fn insert(&mut self, user: User) -> Result<&User, PreconditionError> {
        if self.contains(&user.username) {
            return Err(PreconditionError::UsernameTaken {
                username: user.username,
            });
        }
        self.users.push(user);
        Ok(&self.users[self.users.len() - 1])
    }

    /// Unknown user and wrong password fail the same way
    pub fn login(&self, username: &str, password: &str) -> Result<&User, PreconditionError> {
        self.users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .ok_or_else(|| PreconditionError::LoginFailed {
                username: username.to_string(),
            })
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.iter().any(|u| u.username == username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
