use std::sync::Arc;

use uuid::Uuid;

use subkeeper_core::cache::CacheableEntity;
use subkeeper_core::domain::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use subkeeper_core::pagination::{Page, PageRequest};
use subkeeper_core::storage::CategoryRepository;

use super::error::{found, Result};
use crate::cache::EntityCache;

#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    cache: EntityCache<Category>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>, cache: EntityCache<Category>) -> Self {
        Self { repo, cache }
    }

    pub async fn get(&self, id: Uuid) -> Result<Category> {
        let category = self
            .cache
            .get_or_load(&Category::key_for_id(id), || self.repo.get_category(id))
            .await?;
        found(category, "Category", id)
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Category>> {
        let categories = self.repo.list_categories(&page).await?;
        Ok(Page::new(categories, page.limit))
    }

    pub async fn create(&self, request: CreateCategoryRequest) -> Result<Category> {
        request.validate()?;
        let category = request.into_category();

        self.repo.create_category(&category).await?;
        self.cache.set(&category).await;

        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update(&self, id: Uuid, request: UpdateCategoryRequest) -> Result<Category> {
        request.validate()?;
        let mut category = found(self.repo.get_category(id).await?, "Category", id)?;

        request.apply_to(&mut category);
        self.repo.update_category(&category).await?;
        self.cache.delete_by_key(&Category::key_for_id(id)).await;

        tracing::debug!(category_id = %id, "Category updated");
        Ok(category)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete_category(id).await?;
        self.cache.delete_by_key(&Category::key_for_id(id)).await;

        tracing::debug!(category_id = %id, "Category deleted");
        Ok(())
    }
}
