//! API request types for entity operations.
//!
//! Create requests carry every required field and convert into a fresh
//! entity. Update requests carry optional fields that are merged onto the
//! stored entity with `apply_to`. Both validate before conversion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValidationError;
use super::types::{
    timestamp_now, Category, Order, Payment, PaymentStatus, Role, Service, Subscription, User,
};

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(ValidationError::Missing(field));
    }
    if len < min || len > max {
        return Err(ValidationError::Length { field, min, max });
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

fn check_positive(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive(field))
    }
}

fn check_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCurrency(currency.to_string()))
    }
}

fn check_period(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), ValidationError> {
    match end {
        Some(end) if end < start => Err(ValidationError::InvalidPeriod),
        _ => Ok(()),
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_email(&self.email)?;
        check_length("first_name", &self.first_name, 2, 100)?;
        check_length("last_name", &self.last_name, 2, 100)
    }

    pub fn into_user(self) -> User {
        User::new(self.email, self.first_name, self.last_name)
            .with_role(self.role.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(first_name) = &self.first_name {
            check_length("first_name", first_name, 2, 100)?;
        }
        if let Some(last_name) = &self.last_name {
            check_length("last_name", last_name, 2, 100)?;
        }
        Ok(())
    }

    pub fn apply_to(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, 2, 100)
    }

    pub fn into_category(self) -> Category {
        Category::new(self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => check_length("name", name, 2, 100),
            None => Ok(()),
        }
    }

    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
    }
}

// ============================================================================
// Services
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub category_id: Uuid,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl CreateServiceRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, 2, 100)
    }

    pub fn into_service(self) -> Service {
        let mut service = Service::new(self.name, self.category_id);
        service.website = self.website;
        service.logo_url = self.logo_url;
        service
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl UpdateServiceRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => check_length("name", name, 2, 100),
            None => Ok(()),
        }
    }

    pub fn apply_to(self, service: &mut Service) {
        if let Some(name) = self.name {
            service.name = name;
        }
        if let Some(category_id) = self.category_id {
            service.category_id = category_id;
        }
        if let Some(website) = self.website {
            service.website = Some(website);
        }
        if let Some(logo_url) = self.logo_url {
            service.logo_url = Some(logo_url);
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub service_id: Uuid,
    #[serde(default)]
    pub is_paid: bool,
}

impl CreateOrderRequest {
    pub fn into_order(self) -> Order {
        let mut order = Order::new(self.user_id, self.service_id);
        order.is_paid = self.is_paid;
        order
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
}

impl UpdateOrderRequest {
    pub fn apply_to(self, order: &mut Order) {
        if let Some(is_paid) = self.is_paid {
            order.is_paid = is_paid;
        }
    }
}

// ============================================================================
// Payments
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub subscription_id: Uuid,
    pub order_id: Uuid,
    pub amount: i64,
    pub currency: String,
    /// Defaults to the time the payment is recorded.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
    pub provider: String,
}

impl CreatePaymentRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("amount", self.amount)?;
        check_currency(&self.currency)?;
        check_length("provider", &self.provider, 2, 50)
    }

    pub fn into_payment(self) -> Payment {
        let created_at = timestamp_now();
        Payment {
            id: Uuid::new_v4(),
            subscription_id: self.subscription_id,
            order_id: self.order_id,
            amount: self.amount,
            currency: self.currency.to_ascii_uppercase(),
            paid_at: self.paid_at.unwrap_or(created_at),
            payment_status: self.payment_status,
            provider: self.provider,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePaymentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl UpdatePaymentRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(amount) = self.amount {
            check_positive("amount", amount)?;
        }
        if let Some(currency) = &self.currency {
            check_currency(currency)?;
        }
        if let Some(provider) = &self.provider {
            check_length("provider", provider, 2, 50)?;
        }
        Ok(())
    }

    pub fn apply_to(self, payment: &mut Payment) {
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(currency) = self.currency {
            payment.currency = currency.to_ascii_uppercase();
        }
        if let Some(paid_at) = self.paid_at {
            payment.paid_at = paid_at;
        }
        if let Some(status) = self.payment_status {
            payment.payment_status = status;
        }
        if let Some(provider) = self.provider {
            payment.provider = provider;
        }
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub price: i64,
}

impl CreateSubscriptionRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("price", self.price)?;
        check_period(self.start_date, self.end_date)
    }

    pub fn into_subscription(self) -> Subscription {
        let mut subscription =
            Subscription::new(self.user_id, self.service_id, self.start_date, self.price);
        subscription.end_date = self.end_date;
        subscription
    }
}

/// Partial subscription update.
///
/// An absent `end_date` leaves the stored value untouched; an open-ended
/// subscription cannot be closed and reopened through this request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubscriptionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

impl UpdateSubscriptionRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.price {
            Some(price) => check_positive("price", price),
            None => Ok(()),
        }
    }

    /// Merges the update and re-checks the resulting period.
    pub fn apply_to(self, subscription: &mut Subscription) -> Result<(), ValidationError> {
        let start_date = self.start_date.unwrap_or(subscription.start_date);
        let end_date = self.end_date.or(subscription.end_date);
        check_period(start_date, end_date)?;

        subscription.start_date = start_date;
        subscription.end_date = end_date;
        if let Some(price) = self.price {
            subscription.price = price;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_user_request() -> CreateUserRequest {
        CreateUserRequest {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: None,
        }
    }

    #[test]
    fn test_create_user_defaults_role() {
        let user = create_user_request().into_user();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_create_user_rejects_bad_email() {
        let mut request = create_user_request();
        request.email = "not-an-email".to_string();
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_create_user_rejects_short_name() {
        let mut request = create_user_request();
        request.first_name = "A".to_string();
        assert_eq!(
            request.validate(),
            Err(ValidationError::Length {
                field: "first_name",
                min: 2,
                max: 100
            })
        );
    }

    #[test]
    fn test_update_user_applies_only_present_fields() {
        let mut user = User::new("old@example.com", "Old", "Name");
        let update = UpdateUserRequest {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };

        update.apply_to(&mut user);

        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.first_name, "Old");
    }

    #[test]
    fn test_category_name_required() {
        let request = CreateCategoryRequest {
            name: "   ".to_string(),
        };
        assert_eq!(request.validate(), Err(ValidationError::Missing("name")));
    }

    #[test]
    fn test_payment_validation() {
        let request = CreatePaymentRequest {
            subscription_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            amount: 0,
            currency: "usd".to_string(),
            paid_at: None,
            payment_status: PaymentStatus::Success,
            provider: "stripe".to_string(),
        };
        assert_eq!(
            request.validate(),
            Err(ValidationError::NotPositive("amount"))
        );

        let request = CreatePaymentRequest {
            amount: 1_000,
            currency: "dollars".to_string(),
            ..request
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_payment_currency_is_uppercased() {
        let payment = CreatePaymentRequest {
            subscription_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            amount: 1_000,
            currency: "eur".to_string(),
            paid_at: None,
            payment_status: PaymentStatus::Success,
            provider: "stripe".to_string(),
        }
        .into_payment();

        assert_eq!(payment.currency, "EUR");
        assert_eq!(payment.paid_at, payment.created_at);
    }

    #[test]
    fn test_subscription_rejects_inverted_period() {
        let request = CreateSubscriptionRequest {
            user_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            start_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            end_date: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            price: 100,
        };
        assert_eq!(request.validate(), Err(ValidationError::InvalidPeriod));
    }

    #[test]
    fn test_subscription_update_keeps_end_date_when_absent() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut sub = Subscription::new(Uuid::new_v4(), Uuid::new_v4(), start, 100)
            .with_end_date(end);

        UpdateSubscriptionRequest {
            price: Some(200),
            ..Default::default()
        }
        .apply_to(&mut sub)
        .unwrap();

        assert_eq!(sub.price, 200);
        assert_eq!(sub.end_date, Some(end));
    }

    #[test]
    fn test_subscription_update_rechecks_period() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut sub = Subscription::new(Uuid::new_v4(), Uuid::new_v4(), start, 100)
            .with_end_date(end);

        let result = UpdateSubscriptionRequest {
            start_date: Some(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        }
        .apply_to(&mut sub);

        assert_eq!(result, Err(ValidationError::InvalidPeriod));
        assert_eq!(sub.start_date, start);
    }
}
