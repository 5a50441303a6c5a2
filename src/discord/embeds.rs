//! Pure renderers from orders to Discord embeds.
//!
//! Nothing here talks to Discord; the sink converts [`Embed`] into serenity's builder.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{format_money, OrderStatus, OrderWithItems};

pub const ORDER_FOOTER: &str = "4E Store Order System";
pub const PAYMENT_FOOTER: &str = "4E Store Payment System";
pub const DEFAULT_COLOUR: u32 = 0x8b5cf6;

pub const NEW_ORDER_TITLE: &str = "🆕 New Order Received";
pub const PAYMENT_TITLE: &str = "💳 Payment Required";
pub const STATS_TITLE: &str = "📊 Revenue Statistics";

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub title: String,
    pub description: Option<String>,
    pub colour: u32,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    fn new(title: impl Into<String>, colour: u32) -> Self {
        Self {
            title: title.into(),
            description: None,
            colour,
            fields: Vec::new(),
            footer: None,
            timestamp: Some(Utc::now()),
        }
    }

    fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn field(mut self, name: &str, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.to_string(),
            value: value.into(),
            inline,
        });
        self
    }

    fn footer(mut self, footer: &str) -> Self {
        self.footer = Some(footer.to_string());
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }
}

pub fn status_colour(status: OrderStatus) -> u32 {
    match status {
        OrderStatus::Pending => 0xfbbf24,
        OrderStatus::InProgress => 0x3b82f6,
        OrderStatus::PaymentPending => 0xf97316,
        OrderStatus::Completed => 0x10b981,
        OrderStatus::Cancelled => 0xef4444,
    }
}

/// Headline used when announcing a status change.
pub fn status_message(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "⏳ Your order is pending review",
        OrderStatus::InProgress => "🔄 Your order is being processed",
        OrderStatus::PaymentPending => "💳 Payment is required to complete your order",
        OrderStatus::Completed => "✅ Your order has been completed!",
        OrderStatus::Cancelled => "❌ Your order has been cancelled",
    }
}

/// `in_progress` becomes `IN PROGRESS`.
pub fn status_field(status: OrderStatus) -> String {
    status.as_str().to_uppercase().replace('_', " ")
}

fn items_text(order: &OrderWithItems) -> String {
    if order.items.is_empty() {
        return "No items".to_string();
    }
    order
        .items
        .iter()
        .map(|item| {
            format!(
                "• {} x{} - {}",
                item.product_name,
                item.quantity,
                format_money(&item.product_price)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn order_embed(order: &OrderWithItems, title: &str) -> Embed {
    Embed::new(title, status_colour(order.order.status))
        .description(format!("**Order Code:** `{}`", order.order.order_code))
        .field("Customer", order.order.customer_discord_username.clone(), true)
        .field("Status", status_field(order.order.status), true)
        .field("Total", format_money(&order.order.total_amount), true)
        .field("Items", items_text(order), false)
        .footer(ORDER_FOOTER)
}

pub fn new_order_embed(order: &OrderWithItems) -> Embed {
    order_embed(order, NEW_ORDER_TITLE)
}

pub fn status_changed_embed(order: &OrderWithItems, status: OrderStatus) -> Embed {
    order_embed(order, status_message(status))
}

pub fn payment_embed(order: &OrderWithItems, link: &str) -> Embed {
    Embed::new(PAYMENT_TITLE, status_colour(OrderStatus::PaymentPending))
        .description(format!(
            "**Order Code:** `{}`\n\nPlease complete your payment using the link below:",
            order.order.order_code
        ))
        .field("Total Amount", format_money(&order.order.total_amount), true)
        .field("Payment Link", format!("[Click here to pay]({link})"), false)
        .footer(PAYMENT_FOOTER)
}

/// Figures behind the stats embed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub revenue: Decimal,
}

impl OrderStats {
    /// Revenue counts completed orders only; `pending` covers pending and in-progress.
    /// Returns `None` when revenue no longer fits in a `Decimal`.
    pub fn from_orders(orders: &[OrderWithItems]) -> Option<Self> {
        orders.iter().try_fold(Self::default(), |mut stats, order| {
            stats.total += 1;
            if order.order.status == OrderStatus::Completed {
                stats.completed += 1;
                stats.revenue = stats.revenue.checked_add(order.order.total_amount)?;
            }
            if order.order.status.is_open() {
                stats.pending += 1;
            }
            Some(stats)
        })
    }
}

pub fn stats_embed(stats: &OrderStats) -> Embed {
    Embed::new(STATS_TITLE, DEFAULT_COLOUR)
        .field("Total Orders", stats.total.to_string(), true)
        .field("Completed", stats.completed.to_string(), true)
        .field("Pending", stats.pending.to_string(), true)
        .field("Total Revenue", format_money(&stats.revenue), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderItem};

    fn sample(status: OrderStatus, total: Decimal, items: Vec<(&str, Decimal, u32)>) -> OrderWithItems {
        let now = Utc::now();
        OrderWithItems {
            order: Order {
                id: "o1".into(),
                order_code: "4e-1234".into(),
                user_id: None,
                customer_discord_username: "alice".into(),
                customer_discord_id: None,
                status,
                total_amount: total,
                payment_link: None,
                created_at: now,
                updated_at: now,
            },
            items: items
                .into_iter()
                .enumerate()
                .map(|(i, (name, price, quantity))| OrderItem {
                    id: format!("i{i}"),
                    order_id: "o1".into(),
                    product_id: format!("p{i}"),
                    product_name: name.into(),
                    product_price: price,
                    quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn order_embed_lists_items_and_totals() {
        let order = sample(
            OrderStatus::InProgress,
            Decimal::new(6998, 2),
            vec![("Custom Discord Bot", Decimal::new(4999, 2), 1), ("Emotes", Decimal::new(1999, 2), 1)],
        );
        let embed = new_order_embed(&order);

        assert_eq!(embed.title, NEW_ORDER_TITLE);
        assert_eq!(embed.colour, 0x3b82f6);
        assert_eq!(embed.description.as_deref(), Some("**Order Code:** `4e-1234`"));
        assert_eq!(embed.field_value("Customer"), Some("alice"));
        assert_eq!(embed.field_value("Status"), Some("IN PROGRESS"));
        assert_eq!(embed.field_value("Total"), Some("$69.98"));
        assert_eq!(
            embed.field_value("Items"),
            Some("• Custom Discord Bot x1 - $49.99\n• Emotes x1 - $19.99")
        );
        assert_eq!(embed.footer.as_deref(), Some(ORDER_FOOTER));
    }

    #[test]
    fn empty_orders_say_no_items() {
        let embed = order_embed(&sample(OrderStatus::Pending, Decimal::ZERO, vec![]), "Pending Order");
        assert_eq!(embed.field_value("Items"), Some("No items"));
        assert_eq!(embed.field_value("Total"), Some("$0.00"));
    }

    #[test]
    fn status_change_uses_customer_message() {
        let order = sample(OrderStatus::Completed, Decimal::new(10, 0), vec![]);
        let embed = status_changed_embed(&order, OrderStatus::Completed);
        assert_eq!(embed.title, "✅ Your order has been completed!");
        assert_eq!(embed.colour, 0x10b981);
    }

    #[test]
    fn payment_embed_carries_link() {
        let order = sample(OrderStatus::PaymentPending, Decimal::new(2500, 2), vec![]);
        let embed = payment_embed(&order, "https://pay.example/abc");
        assert_eq!(embed.title, PAYMENT_TITLE);
        assert_eq!(embed.field_value("Total Amount"), Some("$25.00"));
        assert_eq!(
            embed.field_value("Payment Link"),
            Some("[Click here to pay](https://pay.example/abc)")
        );
    }

    #[test]
    fn stats_count_open_orders_and_completed_revenue() {
        let orders = vec![
            sample(OrderStatus::Completed, Decimal::new(1050, 2), vec![]),
            sample(OrderStatus::Completed, Decimal::new(2000, 2), vec![]),
            sample(OrderStatus::Pending, Decimal::new(999, 2), vec![]),
            sample(OrderStatus::InProgress, Decimal::new(100, 2), vec![]),
            sample(OrderStatus::PaymentPending, Decimal::new(500, 2), vec![]),
            sample(OrderStatus::Cancelled, Decimal::new(700, 2), vec![]),
        ];
        let stats = OrderStats::from_orders(&orders).unwrap();
        assert_eq!(stats.total, 6);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.revenue, Decimal::new(3050, 2));

        let embed = stats_embed(&stats);
        assert_eq!(embed.field_value("Total Revenue"), Some("$30.50"));
        assert_eq!(embed.field_value("Total Orders"), Some("6"));
    }

    #[test]
    fn stats_report_revenue_overflow() {
        let orders = vec![
            sample(OrderStatus::Completed, Decimal::MAX, vec![]),
            sample(OrderStatus::Completed, Decimal::MAX, vec![]),
        ];
        assert_eq!(OrderStats::from_orders(&orders), None);

        let fits = vec![sample(OrderStatus::Completed, Decimal::MAX, vec![])];
        assert_eq!(OrderStats::from_orders(&fits).unwrap().revenue, Decimal::MAX);
    }
}
