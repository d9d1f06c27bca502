use std::sync::Arc;

use uuid::Uuid;

use subkeeper_core::cache::{user_email_key, CacheableEntity};
use subkeeper_core::domain::{CreateUserRequest, UpdateUserRequest, User};
use subkeeper_core::pagination::{Page, PageRequest};
use subkeeper_core::storage::UserRepository;

use super::error::{found, Result, ServiceError};
use crate::cache::EntityCache;

/// User accounts, cached by id and by email.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    cache: EntityCache<User>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, cache: EntityCache<User>) -> Self {
        Self { repo, cache }
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        let user = self
            .cache
            .get_or_load(&User::key_for_id(id), || self.repo.get_user(id))
            .await?;
        found(user, "User", id)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        let user = self
            .cache
            .get_or_load(&user_email_key(email), || self.repo.get_user_by_email(email))
            .await?;
        user.ok_or_else(|| ServiceError::not_found("User", email))
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<User>> {
        let users = self.repo.list_users(&page).await?;
        Ok(Page::new(users, page.limit))
    }

    pub async fn create(&self, request: CreateUserRequest) -> Result<User> {
        request.validate()?;
        let user = request.into_user();

        self.repo.create_user(&user).await?;
        self.cache.set(&user).await;

        tracing::info!(user_id = %user.id, email = %user.email, "User created");
        Ok(user)
    }

    /// Applies a partial update.
    ///
    /// Both the old and the new email keys are invalidated, so a lookup by
    /// either address goes back to the repository.
    pub async fn update(&self, id: Uuid, request: UpdateUserRequest) -> Result<User> {
        request.validate()?;
        let current = found(self.repo.get_user(id).await?, "User", id)?;

        let mut user = current.clone();
        request.apply_to(&mut user);
        self.repo.update_user(&user).await?;

        self.cache.delete_all(&current).await;
        if user.email != current.email {
            self.cache.delete_by_key(&user_email_key(&user.email)).await;
        }

        tracing::debug!(user_id = %id, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let current = found(self.repo.get_user(id).await?, "User", id)?;

        self.repo.delete_user(id).await?;
        self.cache.delete_all(&current).await;

        tracing::debug!(user_id = %id, "User deleted");
        Ok(())
    }
}
