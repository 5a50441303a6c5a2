//! # Mock Framework
//!
//! Utilities for testing in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then helpers like
//! [`expect_create`] or [`expect_get`] to assert what the client sends and to script the
//! actor's reply. [`CountingStorage`] and [`RecordingSink`] stand in for the store and
//! for Discord, and [`call`] drives the HTTP router without a socket.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tower::ServiceExt;

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use crate::discord::embeds::Embed;
use crate::discord::notifier::Destination;
use crate::discord::sink::{DiscordSink, SinkError};
use crate::domain::{
    NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems, Product,
    ProductCreate, User, UserCreate,
};
use crate::storage::{Storage, StorageError};

/// Creates a mock client and a receiver for asserting requests.
///
/// Instead of spinning up a `ResourceActor`, the client sends to a channel the test
/// controls, so the test decides how the "actor" answers (success, failure, silence).
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, oneshot::Sender<Result<T, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<oneshot::Sender<Result<Vec<T>, FrameworkError>>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// A pending order with two line items, for tests that only need something to render.
pub fn sample_order(status: OrderStatus) -> OrderWithItems {
    let now = Utc::now();
    OrderWithItems {
        order: Order {
            id: "order_1".into(),
            order_code: "4e-4242".into(),
            user_id: None,
            customer_discord_username: "gamer#0001".into(),
            customer_discord_id: Some("555".into()),
            status,
            total_amount: Decimal::new(6998, 2),
            payment_link: None,
            created_at: now,
            updated_at: now,
        },
        items: vec![
            OrderItem {
                id: "item_1".into(),
                order_id: "order_1".into(),
                product_id: "product_1".into(),
                product_name: "Custom Discord Bot".into(),
                product_price: Decimal::new(4999, 2),
                quantity: 1,
            },
            OrderItem {
                id: "item_2".into(),
                order_id: "order_1".into(),
                product_id: "product_2".into(),
                product_name: "Emotes".into(),
                product_price: Decimal::new(1999, 2),
                quantity: 1,
            },
        ],
    }
}

// =============================================================================
// Discord sink
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Dm { user_id: String, embed: Embed },
    Channel { channel_id: String, embed: Embed },
}

impl Sent {
    pub fn destination(&self) -> Destination {
        match self {
            Sent::Dm { user_id, .. } => Destination::Dm(user_id.clone()),
            Sent::Channel { channel_id, .. } => Destination::Channel(channel_id.clone()),
        }
    }

    pub fn embed(&self) -> &Embed {
        match self {
            Sent::Dm { embed, .. } | Sent::Channel { embed, .. } => embed,
        }
    }
}

/// Records every successful send. Can be told to fail one destination or to stall.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Sent>>,
    fail_for: Option<String>,
    delay: Option<Duration>,
}

impl RecordingSink {
    pub fn failing_for(id: &str) -> Self {
        Self {
            fail_for: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    async fn record(&self, id: &str, sent: Sent) -> Result<(), SinkError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_for.as_deref() == Some(id) {
            return Err(SinkError::Api(format!("Cannot send messages to {id}")));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl DiscordSink for RecordingSink {
    async fn send_dm(&self, user_id: &str, embed: &Embed) -> Result<(), SinkError> {
        let sent = Sent::Dm {
            user_id: user_id.to_string(),
            embed: embed.clone(),
        };
        self.record(user_id, sent).await
    }

    async fn send_channel(&self, channel_id: &str, embed: &Embed) -> Result<(), SinkError> {
        let sent = Sent::Channel {
            channel_id: channel_id.to_string(),
            embed: embed.clone(),
        };
        self.record(channel_id, sent).await
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Forwards to another store and counts every call.
pub struct CountingStorage {
    inner: Arc<dyn Storage>,
    calls: AtomicUsize,
}

impl CountingStorage {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        self.tick();
        self.inner.get_user(id).await
    }

    async fn get_user_by_discord_id(
        &self,
        discord_id: &str,
    ) -> Result<Option<User>, StorageError> {
        self.tick();
        self.inner.get_user_by_discord_id(discord_id).await
    }

    async fn create_user(&self, user: UserCreate) -> Result<User, StorageError> {
        self.tick();
        self.inner.create_user(user).await
    }

    async fn get_products(&self) -> Result<Vec<Product>, StorageError> {
        self.tick();
        self.inner.get_products().await
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, StorageError> {
        self.tick();
        self.inner.get_product(id).await
    }

    async fn create_product(&self, product: ProductCreate) -> Result<Product, StorageError> {
        self.tick();
        self.inner.create_product(product).await
    }

    async fn get_orders(&self) -> Result<Vec<OrderWithItems>, StorageError> {
        self.tick();
        self.inner.get_orders().await
    }

    async fn get_order(&self, id: &str) -> Result<Option<OrderWithItems>, StorageError> {
        self.tick();
        self.inner.get_order(id).await
    }

    async fn get_order_by_code(&self, code: &str) -> Result<Option<OrderWithItems>, StorageError> {
        self.tick();
        self.inner.get_order_by_code(code).await
    }

    async fn create_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderWithItems, StorageError> {
        self.tick();
        self.inner.create_order(order, items).await
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorageError> {
        self.tick();
        self.inner.update_order_status(id, status).await
    }

    async fn update_order_payment_link(
        &self,
        id: &str,
        link: String,
    ) -> Result<Option<Order>, StorageError> {
        self.tick();
        self.inner.update_order_payment_link(id, link).await
    }
}

// =============================================================================
// HTTP
// =============================================================================

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Sends one request through the router and decodes the JSON reply.
pub async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    send(app, request.unwrap()).await
}

/// Like [`call`], with a raw JSON-typed body that need not parse.
pub async fn call_raw(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::UserClient;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move { client.create(UserCreate::new("111", "tester")).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.discord_username, "tester");
        let user = User {
            id: "user_1".into(),
            discord_id: payload.discord_id,
            discord_username: payload.discord_username,
            discord_avatar: None,
        };
        responder.send(Ok(user.clone())).unwrap();

        assert_eq!(create_task.await.unwrap(), Ok(user));
    }

    #[tokio::test]
    async fn test_find_by_discord_id_scans_listing() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);

        let lookup = tokio::spawn(async move { client.find_by_discord_id("222").await });

        let responder = expect_list(&mut receiver).await.expect("Expected List request");
        let users = ["111", "222"]
            .into_iter()
            .enumerate()
            .map(|(i, discord_id)| User {
                id: format!("user_{i}"),
                discord_id: discord_id.into(),
                discord_username: format!("name{i}"),
                discord_avatar: None,
            })
            .collect();
        responder.send(Ok(users)).unwrap();

        let found = lookup.await.unwrap().unwrap().unwrap();
        assert_eq!(found.id, "user_1");
    }

    #[tokio::test]
    async fn test_dropped_responder_surfaces_as_error() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);

        let lookup = tokio::spawn(async move { client.get_user("user_1".into()).await });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, "user_1");
        drop(responder);

        assert!(lookup.await.unwrap().is_err());
    }
}
