//! Admin slash commands, independent of the Discord transport.
//!
//! The bot adapter turns an interaction into a [`CommandInput`] and sends back whatever
//! [`Reply`] comes out of [`CommandHandler::handle`]. Every reply is ephemeral.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::domain::{OrderStatus, OrderWithItems};
use crate::storage::{Storage, StorageError};

use super::embeds::{self, Embed, OrderStats};
use super::notifier::{Notification, Notifier};

pub const PERMISSION_DENIED: &str = "❌ You don't have permission to use this command.";
pub const GENERIC_FAILURE: &str = "❌ An error occurred while processing the command";
pub const NO_PENDING_ORDERS: &str = "📦 No pending orders";
pub const NO_ORDER_HISTORY: &str = "📝 No order history";

const PENDING_LIMIT: usize = 10;
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ListPendingOrders,
    SetStatus { code: String, status: OrderStatus },
    SetPaymentLink { code: String, link: String },
    CompleteOrder { code: String },
    CancelOrder { code: String },
    Stats,
    RecentActivity,
}

/// Slash command name and its string options, as received from Discord.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandInput {
    pub name: String,
    pub options: HashMap<String, String>,
}

impl CommandInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: HashMap::new(),
        }
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    fn required(&self, name: &str) -> Result<String, CommandError> {
        self.options
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CommandError::MissingOption(name.to_string()))
    }
}

impl TryFrom<&CommandInput> for Command {
    type Error = CommandError;

    fn try_from(input: &CommandInput) -> Result<Self, Self::Error> {
        match input.name.as_str() {
            "orders" => Ok(Command::ListPendingOrders),
            "status" => {
                let code = input.required("code")?;
                let status = input
                    .required("status")?
                    .parse::<OrderStatus>()
                    .map_err(|e| CommandError::BadOption(e.to_string()))?;
                Ok(Command::SetStatus { code, status })
            }
            "payment" => Ok(Command::SetPaymentLink {
                code: input.required("code")?,
                link: input.required("link")?,
            }),
            "complete" => Ok(Command::CompleteOrder {
                code: input.required("code")?,
            }),
            "cancel" => Ok(Command::CancelOrder {
                code: input.required("code")?,
            }),
            "stats" => Ok(Command::Stats),
            "logs" => Ok(Command::RecentActivity),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing option: {0}")]
    MissingOption(String),
    #[error("bad option: {0}")]
    BadOption(String),
    #[error("order {0} not found")]
    NotFound(String),
    #[error("order {code} is {status}")]
    Frozen { code: String, status: OrderStatus },
    #[error("revenue total overflowed")]
    RevenueOverflow,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What gets sent back to the invoker.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Embeds(Vec<Embed>),
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::Embeds(_) => None,
        }
    }

    pub fn embeds(&self) -> &[Embed] {
        match self {
            Reply::Text(_) => &[],
            Reply::Embeds(embeds) => embeds,
        }
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::NotFound(code) => Reply::text(format!("❌ Order {code} not found")),
            CommandError::Frozen { code, status } => Reply::text(format!(
                "❌ Order {code} is {status} and can no longer change status"
            )),
            other => {
                error!(error = %other, "Command failed");
                Reply::text(GENERIC_FAILURE)
            }
        }
    }
}

#[derive(Clone)]
pub struct CommandHandler {
    storage: Arc<dyn Storage>,
    notifier: Notifier,
    admins: Vec<String>,
}

impl CommandHandler {
    pub fn new(storage: Arc<dyn Storage>, notifier: Notifier, admins: Vec<String>) -> Self {
        Self {
            storage,
            notifier,
            admins,
        }
    }

    /// Only the configured owner and co-owner may run commands.
    pub fn is_authorized(&self, invoker_id: &str) -> bool {
        self.admins.iter().any(|admin| admin == invoker_id)
    }

    #[instrument(skip(self, input), fields(command = %input.name))]
    pub async fn handle(&self, invoker_id: &str, input: &CommandInput) -> Reply {
        if !self.is_authorized(invoker_id) {
            warn!("Rejected command from non-admin");
            return Reply::text(PERMISSION_DENIED);
        }
        let result = match Command::try_from(input) {
            Ok(command) => self.execute(command).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(Reply::from)
    }

    async fn execute(&self, command: Command) -> Result<Reply, CommandError> {
        match command {
            Command::ListPendingOrders => self.list_pending().await,
            Command::SetStatus { code, status } => {
                let updated = self.set_status(&code, status).await?;
                Ok(Reply::Embeds(vec![embeds::order_embed(
                    &updated,
                    "Order Status Updated",
                )]))
            }
            Command::SetPaymentLink { code, link } => self.set_payment_link(&code, link).await,
            Command::CompleteOrder { code } => {
                self.set_status(&code, OrderStatus::Completed).await?;
                Ok(Reply::text(format!("✅ Order {code} marked as completed")))
            }
            Command::CancelOrder { code } => {
                self.set_status(&code, OrderStatus::Cancelled).await?;
                Ok(Reply::text(format!("✅ Order {code} cancelled")))
            }
            Command::Stats => {
                let orders = self.storage.get_orders().await?;
                let stats =
                    OrderStats::from_orders(&orders).ok_or(CommandError::RevenueOverflow)?;
                Ok(Reply::Embeds(vec![embeds::stats_embed(&stats)]))
            }
            Command::RecentActivity => self.recent_activity().await,
        }
    }

    async fn list_pending(&self) -> Result<Reply, CommandError> {
        let pending: Vec<Embed> = self
            .storage
            .get_orders()
            .await?
            .iter()
            .filter(|order| order.order.status.is_open())
            .take(PENDING_LIMIT)
            .map(|order| embeds::order_embed(order, "Pending Order"))
            .collect();
        if pending.is_empty() {
            return Ok(Reply::text(NO_PENDING_ORDERS));
        }
        Ok(Reply::Embeds(pending))
    }

    async fn recent_activity(&self) -> Result<Reply, CommandError> {
        let orders = self.storage.get_orders().await?;
        if orders.is_empty() {
            return Ok(Reply::text(NO_ORDER_HISTORY));
        }
        let recent = orders
            .iter()
            .rev()
            .take(RECENT_LIMIT)
            .map(|order| embeds::order_embed(order, "Recent Order"))
            .collect();
        Ok(Reply::Embeds(recent))
    }

    async fn find(&self, code: &str) -> Result<OrderWithItems, CommandError> {
        self.storage
            .get_order_by_code(code)
            .await?
            .ok_or_else(|| CommandError::NotFound(code.to_string()))
    }

    /// Applies the transition and announces it. Returns the order as it is afterwards.
    async fn set_status(
        &self,
        code: &str,
        status: OrderStatus,
    ) -> Result<OrderWithItems, CommandError> {
        let found = self.find(code).await?;
        let order = match self.storage.update_order_status(&found.order.id, status).await {
            Ok(Some(order)) => order,
            Ok(None) => return Err(CommandError::NotFound(code.to_string())),
            Err(StorageError::InvalidTransition(t)) => {
                return Err(CommandError::Frozen {
                    code: code.to_string(),
                    status: t.from,
                })
            }
            Err(e) => return Err(e.into()),
        };
        info!(order_code = %code, %status, "Order status updated from Discord");
        let updated = OrderWithItems {
            order,
            items: found.items,
        };
        self.notifier
            .notify(Notification::StatusChanged(updated.clone(), status));
        Ok(updated)
    }

    async fn set_payment_link(&self, code: &str, link: String) -> Result<Reply, CommandError> {
        let found = self.find(code).await?;
        let order = self
            .storage
            .update_order_payment_link(&found.order.id, link.clone())
            .await?
            .ok_or_else(|| CommandError::NotFound(code.to_string()))?;
        info!(order_code = %code, "Payment link set from Discord");
        self.notifier.notify(Notification::PaymentLinkSet(
            OrderWithItems {
                order,
                items: found.items,
            },
            link,
        ));
        Ok(Reply::text(format!(
            "✅ Payment link sent to customer for order {code}"
        )))
    }
}
