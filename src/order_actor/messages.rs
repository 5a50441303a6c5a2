use tokio::sync::oneshot;

use super::OrderError;
use crate::domain::{NewOrder, NewOrderItem, Order, OrderStatus, OrderWithItems};

pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Messages understood by [`super::OrderService`]. Each variant carries its
/// parameters and a oneshot channel for the reply.
#[derive(Debug)]
pub enum OrderRequest {
    CreateOrder {
        order: NewOrder,
        items: Vec<NewOrderItem>,
        respond_to: ServiceResponse<OrderWithItems, OrderError>,
    },
    GetOrder {
        id: String,
        respond_to: ServiceResponse<Option<OrderWithItems>, OrderError>,
    },
    GetOrderByCode {
        code: String,
        respond_to: ServiceResponse<Option<OrderWithItems>, OrderError>,
    },
    ListOrders {
        respond_to: ServiceResponse<Vec<OrderWithItems>, OrderError>,
    },
    UpdateStatus {
        id: String,
        status: OrderStatus,
        respond_to: ServiceResponse<Option<Order>, OrderError>,
    },
    UpdatePaymentLink {
        id: String,
        link: String,
        respond_to: ServiceResponse<Option<Order>, OrderError>,
    },
    Shutdown,
    #[cfg(test)]
    GetItemCount {
        respond_to: ServiceResponse<usize, OrderError>,
    },
}
