use std::sync::Arc;

use uuid::Uuid;

use subkeeper_core::cache::CacheableEntity;
use subkeeper_core::domain::{CreatePaymentRequest, Payment, UpdatePaymentRequest};
use subkeeper_core::pagination::{Page, PageRequest};
use subkeeper_core::storage::PaymentRepository;

use super::error::{found, Result};
use crate::cache::EntityCache;

/// Payments recorded against a subscription and an order.
#[derive(Clone)]
pub struct PaymentService {
    repo: Arc<dyn PaymentRepository>,
    cache: EntityCache<Payment>,
}

impl PaymentService {
    pub fn new(repo: Arc<dyn PaymentRepository>, cache: EntityCache<Payment>) -> Self {
        Self { repo, cache }
    }

    pub async fn get(&self, id: Uuid) -> Result<Payment> {
        let payment = self
            .cache
            .get_or_load(&Payment::key_for_id(id), || self.repo.get_payment(id))
            .await?;
        found(payment, "Payment", id)
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Payment>> {
        let payments = self.repo.list_payments(&page).await?;
        Ok(Page::new(payments, page.limit))
    }

    pub async fn create(&self, request: CreatePaymentRequest) -> Result<Payment> {
        request.validate()?;
        let payment = request.into_payment();

        self.repo.create_payment(&payment).await?;
        self.cache.set(&payment).await;

        tracing::info!(
            payment_id = %payment.id,
            subscription_id = %payment.subscription_id,
            amount = payment.amount,
            currency = %payment.currency,
            status = payment.payment_status.as_str(),
            "Payment recorded"
        );
        Ok(payment)
    }

    pub async fn update(&self, id: Uuid, request: UpdatePaymentRequest) -> Result<Payment> {
        request.validate()?;
        let mut payment = found(self.repo.get_payment(id).await?, "Payment", id)?;

        request.apply_to(&mut payment);
        self.repo.update_payment(&payment).await?;
        self.cache.delete_by_key(&Payment::key_for_id(id)).await;

        tracing::debug!(payment_id = %id, "Payment updated");
        Ok(payment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete_payment(id).await?;
        self.cache.delete_by_key(&Payment::key_for_id(id)).await;

        tracing::debug!(payment_id = %id, "Payment deleted");
        Ok(())
    }
}
