use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::actor_framework::ResourceActor;
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::domain::{
    NewOrder, NewOrderItem, Order, OrderStatus, OrderWithItems, Product, ProductCreate, User,
    UserCreate,
};
use crate::order_actor::{OrderCodeGenerator, OrderService};
use crate::storage::{Storage, StorageError};

use super::sample_products;

const MAILBOX_SIZE: usize = 32;

fn next_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The in-memory store, running as one actor per collection.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct OrderSystem {
    storage: Arc<ActorStorage>,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    pub fn new() -> Self {
        Self::with_code_generator(OrderCodeGenerator::random())
    }

    pub fn with_code_generator(code_generator: OrderCodeGenerator) -> Self {
        let (user_actor, user_resource_client) = ResourceActor::<User>::new(MAILBOX_SIZE, next_uuid);
        let user_client = UserClient::new(user_resource_client);
        let user_handle = tokio::spawn(user_actor.run());

        let (product_actor, product_resource_client) =
            ResourceActor::<Product>::new(MAILBOX_SIZE, next_uuid);
        let product_client = ProductClient::new(product_resource_client);
        let product_handle = tokio::spawn(product_actor.run());

        let (order_service, order_client) =
            OrderService::new(MAILBOX_SIZE, next_uuid, code_generator);
        let order_handle = tokio::spawn(order_service.run());

        Self {
            storage: Arc::new(ActorStorage {
                user_client,
                product_client,
                order_client,
            }),
            handles: vec![user_handle, product_handle, order_handle],
        }
    }

    /// Shared handle to the store for the API and the Discord layer.
    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    #[instrument(skip(self))]
    pub async fn seed_sample_products(&self) -> Result<usize, StorageError> {
        let products = sample_products();
        let count = products.len();
        for product in products {
            self.storage.create_product(product).await?;
        }
        info!(count, "Sample catalog seeded");
        Ok(count)
    }

    /// Stops every actor and waits for them to finish.
    ///
    /// Clones of the storage handle that outlive this call get `Unavailable` errors.
    pub async fn shutdown(self) -> Result<(), StorageError> {
        info!("Shutting down order system...");
        self.storage.order_client.shutdown().await?;
        self.storage.product_client.shutdown().await?;
        self.storage.user_client.shutdown().await?;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(StorageError::Unavailable(format!("Actor task failed: {e}")));
            }
        }

        info!("Order system shutdown complete.");
        Ok(())
    }
}

impl Default for OrderSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Storage`] backed by the actor clients.
#[derive(Clone, Debug)]
pub struct ActorStorage {
    user_client: UserClient,
    product_client: ProductClient,
    order_client: OrderClient,
}

#[async_trait]
impl Storage for ActorStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        Ok(self.user_client.get_user(id.to_string()).await?)
    }

    async fn get_user_by_discord_id(
        &self,
        discord_id: &str,
    ) -> Result<Option<User>, StorageError> {
        Ok(self.user_client.find_by_discord_id(discord_id).await?)
    }

    async fn create_user(&self, user: UserCreate) -> Result<User, StorageError> {
        Ok(self.user_client.create_user(user).await?)
    }

    async fn get_products(&self) -> Result<Vec<Product>, StorageError> {
        Ok(self.product_client.list_products().await?)
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, StorageError> {
        Ok(self.product_client.get_product(id.to_string()).await?)
    }

    async fn create_product(&self, product: ProductCreate) -> Result<Product, StorageError> {
        Ok(self.product_client.create_product(product).await?)
    }

    async fn get_orders(&self) -> Result<Vec<OrderWithItems>, StorageError> {
        Ok(self.order_client.list_orders().await?)
    }

    async fn get_order(&self, id: &str) -> Result<Option<OrderWithItems>, StorageError> {
        Ok(self.order_client.get_order(id.to_string()).await?)
    }

    async fn get_order_by_code(&self, code: &str) -> Result<Option<OrderWithItems>, StorageError> {
        Ok(self.order_client.get_order_by_code(code.to_string()).await?)
    }

    async fn create_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderWithItems, StorageError> {
        Ok(self.order_client.create_order(order, items).await?)
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorageError> {
        Ok(self.order_client.update_status(id.to_string(), status).await?)
    }

    async fn update_order_payment_link(
        &self,
        id: &str,
        link: String,
    ) -> Result<Option<Order>, StorageError> {
        Ok(self.order_client.update_payment_link(id.to_string(), link).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_users_are_found_by_discord_id() {
        let system = OrderSystem::new();
        let storage = system.storage();

        let alice = storage.create_user(UserCreate::new("111", "alice")).await.unwrap();
        storage.create_user(UserCreate::new("222", "bob")).await.unwrap();

        assert_eq!(storage.get_user(&alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(storage.get_user_by_discord_id("111").await.unwrap(), Some(alice));
        assert_eq!(storage.get_user_by_discord_id("333").await.unwrap(), None);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_discord_ids_are_not_rejected() {
        let system = OrderSystem::new();
        let storage = system.storage();

        let first = storage.create_user(UserCreate::new("111", "alice")).await.unwrap();
        let second = storage.create_user(UserCreate::new("111", "alice2")).await.unwrap();
        assert_ne!(first.id, second.id);
        // lookup returns the earliest match
        assert_eq!(storage.get_user_by_discord_id("111").await.unwrap(), Some(first));

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_seeded_products_keep_catalog_order() {
        let system = OrderSystem::new();
        assert_eq!(system.seed_sample_products().await.unwrap(), 8);

        let storage = system.storage();
        let products = storage.get_products().await.unwrap();
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"Premium Gaming Account"));
        assert_eq!(names.last(), Some(&"Pro Streaming Setup Guide"));

        let one = storage.get_product(&products[3].id).await.unwrap().unwrap();
        assert_eq!(one.price, Decimal::new(14999, 2));
        assert_eq!(storage.get_product("nope").await.unwrap(), None);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_item_snapshots_survive_catalog_changes() {
        let system = OrderSystem::new();
        let storage = system.storage();
        let product = storage
            .create_product(ProductCreate {
                name: "Emotes".into(),
                description: "Animated".into(),
                price: Decimal::new(2999, 2),
                category: "Digital Goods".into(),
                image_url: "https://img.example/e.png".into(),
                in_stock: 4,
            })
            .await
            .unwrap();

        let order = storage
            .create_order(
                NewOrder {
                    user_id: None,
                    customer_discord_username: "carol".into(),
                    customer_discord_id: None,
                    total_amount: Decimal::new(1500, 2),
                    payment_link: None,
                },
                vec![NewOrderItem {
                    product_id: product.id.clone(),
                    // the cart carried an older price
                    product_name: "Emotes (launch)".into(),
                    product_price: Decimal::new(1500, 2),
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        let fetched = storage.get_order(&order.order.id).await.unwrap().unwrap();
        assert_eq!(fetched.items[0].product_name, "Emotes (launch)");
        assert_eq!(fetched.items[0].product_price, Decimal::new(1500, 2));
        assert_eq!(fetched.items[0].product_id, product.id);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_negative_stock_is_rejected_by_the_store() {
        let system = OrderSystem::new();
        let err = system
            .storage()
            .create_product(ProductCreate {
                name: "Broken".into(),
                description: "Broken".into(),
                price: Decimal::ZERO,
                category: "Misc".into(),
                image_url: "https://img.example/b.png".into(),
                in_stock: -1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_storage_handles_fail_after_shutdown() {
        let system = OrderSystem::new();
        let storage = system.storage();
        system.shutdown().await.unwrap();

        let err = storage.get_orders().await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
