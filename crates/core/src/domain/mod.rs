//! Domain entities of the subscription API and the requests that build them.

mod error;
mod requests;
mod types;

pub use error::ValidationError;
pub use requests::{
    CreateCategoryRequest, CreateOrderRequest, CreatePaymentRequest, CreateServiceRequest,
    CreateSubscriptionRequest, CreateUserRequest, UpdateCategoryRequest, UpdateOrderRequest,
    UpdatePaymentRequest, UpdateServiceRequest, UpdateSubscriptionRequest, UpdateUserRequest,
};
pub use types::{
    timestamp_now, Category, Order, Payment, PaymentStatus, Role, Service, Subscription,
    SubscriptionView, User,
};
