//! The order actor: owns orders and their items so that creation is atomic
//! and every mutation of an order is applied in a single actor turn.

pub mod code;
pub mod error;
pub mod messages;

pub use code::*;
pub use error::*;
pub use messages::*;

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::clients::OrderClient;
use crate::domain::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems};

pub struct OrderService {
    receiver: mpsc::Receiver<OrderRequest>,
    orders: HashMap<String, Order>,
    // creation order of order ids, for listings
    sequence: Vec<String>,
    // order code -> order id
    codes: HashMap<String, String>,
    items: HashMap<String, OrderItem>,
    // order id -> item ids, in submission order
    items_by_order: HashMap<String, Vec<String>>,
    next_id_fn: Box<dyn Fn() -> String + Send + Sync>,
    code_generator: OrderCodeGenerator,
}

impl OrderService {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> String + Send + Sync + 'static,
        code_generator: OrderCodeGenerator,
    ) -> (Self, OrderClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            orders: HashMap::new(),
            sequence: Vec::new(),
            codes: HashMap::new(),
            items: HashMap::new(),
            items_by_order: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
            code_generator,
        };
        (service, OrderClient::new(sender))
    }

    #[instrument(name = "order_service", skip(self))]
    pub async fn run(mut self) {
        info!("OrderService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                OrderRequest::CreateOrder { order, items, respond_to } => {
                    let _ = respond_to.send(self.handle_create_order(order, items));
                }
                OrderRequest::GetOrder { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_get_order(&id)));
                }
                OrderRequest::GetOrderByCode { code, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_get_order_by_code(&code)));
                }
                OrderRequest::ListOrders { respond_to } => {
                    let orders = self
                        .sequence
                        .iter()
                        .filter_map(|id| self.with_items(id))
                        .collect();
                    let _ = respond_to.send(Ok(orders));
                }
                OrderRequest::UpdateStatus { id, status, respond_to } => {
                    let _ = respond_to.send(self.handle_update_status(&id, status));
                }
                OrderRequest::UpdatePaymentLink { id, link, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_update_payment_link(&id, link)));
                }
                OrderRequest::Shutdown => {
                    info!("OrderService shutting down");
                    break;
                }
                #[cfg(test)]
                OrderRequest::GetItemCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.items.len()));
                }
            }
        }
        info!("OrderService stopped");
    }

    #[instrument(fields(customer = %order.customer_discord_username, item_count = items.len()), skip_all)]
    fn handle_create_order(
        &mut self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderWithItems, OrderError> {
        debug!("Processing create_order request");
        let codes = &self.codes;
        let Some(order_code) = self.code_generator.next_code(|code| codes.contains_key(code))
        else {
            warn!("No free order codes left");
            return Err(OrderError::CodeSpaceExhausted);
        };

        // Everything below is infallible, so the order and its items appear together.
        let order_id = (self.next_id_fn)();
        let order = Order::from_new(order_id.clone(), order_code.clone(), order, Utc::now());
        let items: Vec<OrderItem> = items
            .into_iter()
            .map(|item| OrderItem::from_new((self.next_id_fn)(), order_id.clone(), item))
            .collect();

        self.items_by_order
            .insert(order_id.clone(), items.iter().map(|item| item.id.clone()).collect());
        for item in &items {
            self.items.insert(item.id.clone(), item.clone());
        }
        self.codes.insert(order_code.clone(), order_id.clone());
        self.orders.insert(order_id.clone(), order.clone());
        self.sequence.push(order_id.clone());

        info!(%order_id, %order_code, "Order created");
        Ok(OrderWithItems { order, items })
    }

    #[instrument(fields(order_id = %id), skip(self))]
    fn handle_get_order(&self, id: &str) -> Option<OrderWithItems> {
        let order = self.with_items(id);
        if order.is_none() {
            debug!("Order not found");
        }
        order
    }

    #[instrument(fields(order_code = %code), skip(self))]
    fn handle_get_order_by_code(&self, code: &str) -> Option<OrderWithItems> {
        if !is_valid_code(code) {
            debug!("Malformed order code");
            return None;
        }
        self.codes.get(code).and_then(|id| self.with_items(id))
    }

    #[instrument(fields(order_id = %id, status = %status), skip(self, status))]
    fn handle_update_status(
        &mut self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderError> {
        let Some(order) = self.orders.get_mut(id) else {
            debug!("Order not found");
            return Ok(None);
        };
        let previous = order.status;
        order.transition_to(status, Utc::now())?;
        info!(%previous, "Order status updated");
        Ok(Some(order.clone()))
    }

    #[instrument(fields(order_id = %id), skip(self, link))]
    fn handle_update_payment_link(&mut self, id: &str, link: String) -> Option<Order> {
        let order = self.orders.get_mut(id)?;
        order.set_payment_link(link, Utc::now());
        info!("Payment link updated");
        Some(order.clone())
    }

    fn with_items(&self, id: &str) -> Option<OrderWithItems> {
        let order = self.orders.get(id)?.clone();
        let items = self
            .items_by_order
            .get(id)
            .map(|ids| ids.iter().filter_map(|item_id| self.items.get(item_id).cloned()).collect())
            .unwrap_or_default();
        Some(OrderWithItems { order, items })
    }
}
