//! Registration, listing and removal of users.

use crate::error::{RegistrationError, Result};
use crate::ids::IdGenerator;
use crate::storage::UserStore;
use crate::user::{RegistrationRequest, User};
use crate::validation::validate_registration;
use std::sync::Arc;
use tracing::{debug, info};

/// Path a newly registered user can be fetched from.
pub fn user_location(id: &str) -> String {
    format!("/users/{}", id)
}

#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn UserStore>,
    ids: Arc<dyn IdGenerator>,
}

impl Registry {
    pub fn new(store: Arc<dyn UserStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Validates `request` and appends the new user.
    ///
    /// Usernames are not checked for duplicates.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<User> {
        let new_user = validate_registration(request).map_err(|e| {
            debug!("Rejected registration: {}", e);
            e
        })?;

        let user = User {
            id: self.ids.generate(),
            username: new_user.username,
            password: new_user.password,
            favorite_club: new_user.favorite_club,
            news_letter: new_user.news_letter,
        };
        self.store.insert_user(user.clone()).await?;

        info!(id = %user.id, club = %user.favorite_club, "Registered user");
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.store.list_users().await
    }

    pub async fn find(&self, id: &str) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| RegistrationError::UserNotFound(id.to_string()))
    }

    /// Removes the user with `id`, failing with `UserNotFound` if absent.
    pub async fn delete(&self, id: &str) -> Result<User> {
        let removed = self
            .store
            .remove_user(id)
            .await?
            .ok_or_else(|| RegistrationError::UserNotFound(id.to_string()))?;

        info!(id = %removed.id, "Deleted user");
        Ok(removed)
    }
}
