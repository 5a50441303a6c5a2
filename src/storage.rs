//! The storage seam shared by the HTTP API and the Discord command handler.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    InvalidTransition, NewOrder, NewOrderItem, Order, OrderStatus, OrderWithItems, Product,
    ProductCreate, User, UserCreate,
};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("Invalid data: {0}")]
    Invalid(String),
    #[error("Order code space exhausted")]
    CodeSpaceExhausted,
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<UserError> for StorageError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::ActorCommunicationError(msg) => StorageError::Unavailable(msg),
        }
    }
}

impl From<ProductError> for StorageError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Invalid(msg) => StorageError::Invalid(msg),
            ProductError::ActorCommunicationError(msg) => StorageError::Unavailable(msg),
        }
    }
}

impl From<OrderError> for StorageError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidTransition(t) => StorageError::InvalidTransition(t),
            OrderError::CodeSpaceExhausted => StorageError::CodeSpaceExhausted,
            OrderError::ActorCommunicationError(msg) => StorageError::Unavailable(msg),
        }
    }
}

/// Users, products and orders, however they are kept.
///
/// Lookups return `Ok(None)` for unknown ids; mutations of unknown orders do the same.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError>;
    async fn get_user_by_discord_id(&self, discord_id: &str)
        -> Result<Option<User>, StorageError>;
    async fn create_user(&self, user: UserCreate) -> Result<User, StorageError>;

    async fn get_products(&self) -> Result<Vec<Product>, StorageError>;
    async fn get_product(&self, id: &str) -> Result<Option<Product>, StorageError>;
    async fn create_product(&self, product: ProductCreate) -> Result<Product, StorageError>;

    async fn get_orders(&self) -> Result<Vec<OrderWithItems>, StorageError>;
    async fn get_order(&self, id: &str) -> Result<Option<OrderWithItems>, StorageError>;
    async fn get_order_by_code(&self, code: &str) -> Result<Option<OrderWithItems>, StorageError>;
    /// Creates the order and all of its items at once, assigning a fresh unique order code.
    async fn create_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderWithItems, StorageError>;
    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorageError>;
    async fn update_order_payment_link(
        &self,
        id: &str,
        link: String,
    ) -> Result<Option<Order>, StorageError>;
}
