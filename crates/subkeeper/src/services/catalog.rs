use std::sync::Arc;

use uuid::Uuid;

use subkeeper_core::cache::CacheableEntity;
use subkeeper_core::domain::{CreateServiceRequest, Service, UpdateServiceRequest};
use subkeeper_core::pagination::{Page, PageRequest};
use subkeeper_core::storage::ServiceRepository;

use super::error::{found, Result};
use crate::cache::EntityCache;

/// The catalog of subscribable services.
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn ServiceRepository>,
    cache: EntityCache<Service>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ServiceRepository>, cache: EntityCache<Service>) -> Self {
        Self { repo, cache }
    }

    pub async fn get(&self, id: Uuid) -> Result<Service> {
        let service = self
            .cache
            .get_or_load(&Service::key_for_id(id), || self.repo.get_service(id))
            .await?;
        found(service, "Service", id)
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Service>> {
        let services = self.repo.list_services(&page).await?;
        Ok(Page::new(services, page.limit))
    }

    /// Adds a service to the catalog. The category must exist.
    pub async fn create(&self, request: CreateServiceRequest) -> Result<Service> {
        request.validate()?;
        let service = request.into_service();

        self.repo.create_service(&service).await?;
        self.cache.set(&service).await;

        tracing::info!(
            service_id = %service.id,
            category_id = %service.category_id,
            name = %service.name,
            "Service created"
        );
        Ok(service)
    }

    pub async fn update(&self, id: Uuid, request: UpdateServiceRequest) -> Result<Service> {
        request.validate()?;
        let mut service = found(self.repo.get_service(id).await?, "Service", id)?;

        request.apply_to(&mut service);
        self.repo.update_service(&service).await?;
        self.cache.delete_by_key(&Service::key_for_id(id)).await;

        tracing::debug!(service_id = %id, "Service updated");
        Ok(service)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete_service(id).await?;
        self.cache.delete_by_key(&Service::key_for_id(id)).await;

        tracing::debug!(service_id = %id, "Service deleted");
        Ok(())
    }
}
