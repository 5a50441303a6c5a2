use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::money::{to_cents, validate_money};

/// Lifecycle state of an order.
///
/// `Completed` and `Cancelled` are terminal: once reached, the status is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    PaymentPending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::PaymentPending,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Wire name, as used in JSON bodies and Discord command choices.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::PaymentPending => "payment_pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Human label, e.g. "Payment Pending".
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::PaymentPending => "Payment Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Orders still waiting on the shop: shown by the pending listing and counted as pending in stats.
    pub fn is_open(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProgress)
    }

    pub fn can_transition_to(self, _next: OrderStatus) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
#[error("order is {from} and cannot move to {to}")]
pub struct InvalidTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// A purchase transaction. Items live separately and are joined on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_code: String,
    pub user_id: Option<String>,
    pub customer_discord_username: String,
    pub customer_discord_id: Option<String>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub payment_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_new(id: String, order_code: String, new: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            order_code,
            user_id: new.user_id,
            customer_discord_username: new.customer_discord_username,
            customer_discord_id: new.customer_discord_id,
            status: OrderStatus::Pending,
            total_amount: to_cents(new.total_amount),
            payment_link: new.payment_link,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition_to(
        &mut self,
        next: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition { from: self.status, to: next });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_payment_link(&mut self, link: String, now: DateTime<Utc>) {
        self.payment_link = Some(link);
        self.updated_at = now;
    }
}

/// A line item, with name and price copied from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    pub fn from_new(id: String, order_id: String, new: NewOrderItem) -> Self {
        Self {
            id,
            order_id,
            product_id: new.product_id,
            product_name: new.product_name,
            product_price: to_cents(new.product_price),
            quantity: new.quantity,
        }
    }
}

/// An order together with its items, the shape returned by every order read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order fields accepted at checkout.
///
/// The initial status is always `pending`, so a client-supplied status is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    pub user_id: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub customer_discord_username: String,
    #[serde(default)]
    pub customer_discord_id: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub total_amount: Decimal,
    #[serde(default)]
    #[validate(length(min = 1, max = 2048))]
    pub payment_link: Option<String>,
}

/// A cart line submitted with the order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[validate(custom(function = "validate_money"))]
    pub product_price: Decimal,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order(status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: "o1".into(),
            order_code: "4e-1234".into(),
            user_id: None,
            customer_discord_username: "alice".into(),
            customer_discord_id: None,
            status,
            total_amount: Decimal::new(2500, 2),
            payment_link: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_round_trips_through_wire_name() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert_eq!(
            "shipped".parse::<OrderStatus>(),
            Err(UnknownStatus("shipped".into()))
        );
    }

    #[test]
    fn open_orders_move_freely() {
        let mut order = sample_order(OrderStatus::Pending);
        let later = order.updated_at + chrono::Duration::seconds(1);
        order.transition_to(OrderStatus::PaymentPending, later).unwrap();
        assert_eq!(order.status, OrderStatus::PaymentPending);
        assert_eq!(order.updated_at, later);

        order.transition_to(OrderStatus::Pending, later).unwrap();
        order.transition_to(OrderStatus::Completed, later).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[test]
    fn terminal_orders_are_frozen() {
        for terminal in [OrderStatus::Completed, OrderStatus::Cancelled] {
            for next in OrderStatus::ALL {
                let mut order = sample_order(terminal);
                let before = order.clone();
                let err = order.transition_to(next, Utc::now()).unwrap_err();
                assert_eq!(err, InvalidTransition { from: terminal, to: next });
                assert_eq!(order, before);
            }
        }
    }

    #[test]
    fn order_serializes_camel_case_with_snake_status() {
        let mut order = sample_order(OrderStatus::InProgress);
        order.payment_link = Some("https://pay.example/1".into());
        let value = serde_json::to_value(OrderWithItems { order, items: vec![] }).unwrap();
        assert_eq!(value["orderCode"], "4e-1234");
        assert_eq!(value["status"], "in_progress");
        assert_eq!(value["totalAmount"], "25.00");
        assert_eq!(value["paymentLink"], "https://pay.example/1");
        assert!(value["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn new_item_defaults_quantity_to_one() {
        let item: NewOrderItem = serde_json::from_value(serde_json::json!({
            "productId": "p1",
            "productName": "Emotes",
            "productPrice": "29.99"
        }))
        .unwrap();
        assert_eq!(item.quantity, 1);
        assert!(item.validate().is_ok());
    }
}
