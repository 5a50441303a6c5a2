use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::domain::{NewOrder, NewOrderItem, Order, OrderStatus, OrderWithItems};
use crate::order_actor::{OrderError, OrderRequest};

/// Client for interacting with the Order actor.
#[derive(Clone, Debug)]
pub struct OrderClient {
    sender: mpsc::Sender<OrderRequest>,
}

impl OrderClient {
    pub fn new(sender: mpsc::Sender<OrderRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), OrderError> {
        debug!("Sending shutdown");
        self.sender
            .send(OrderRequest::Shutdown)
            .await
            .map_err(|_| OrderError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(OrderClient => fn create_order(order: NewOrder, items: Vec<NewOrderItem>) -> OrderWithItems as OrderRequest::CreateOrder, Error = OrderError);
client_method!(OrderClient => fn get_order(id: String) -> Option<OrderWithItems> as OrderRequest::GetOrder, Error = OrderError);
client_method!(OrderClient => fn get_order_by_code(code: String) -> Option<OrderWithItems> as OrderRequest::GetOrderByCode, Error = OrderError);
client_method!(OrderClient => fn list_orders() -> Vec<OrderWithItems> as OrderRequest::ListOrders, Error = OrderError);
client_method!(OrderClient => fn update_status(id: String, status: OrderStatus) -> Option<Order> as OrderRequest::UpdateStatus, Error = OrderError);
client_method!(OrderClient => fn update_payment_link(id: String, link: String) -> Option<Order> as OrderRequest::UpdatePaymentLink, Error = OrderError);
#[cfg(test)]
client_method!(OrderClient => fn get_item_count() -> usize as OrderRequest::GetItemCount, Error = OrderError);
