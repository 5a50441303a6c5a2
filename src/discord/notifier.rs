//! Fire-and-forget order notifications.
//!
//! Request handlers enqueue a [`Notification`] through [`Notifier::notify`], which never
//! blocks: a full queue drops the newest notification with a warning. A single
//! [`NotificationWorker`] renders each one and delivers it to every destination
//! independently, with each send bounded by a timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::config::DiscordConfig;
use crate::domain::{OrderStatus, OrderWithItems};

use super::embeds::{self, Embed};
use super::sink::{DiscordSink, SinkError};

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    OrderCreated(OrderWithItems),
    /// Carries the order as it is after the change.
    StatusChanged(OrderWithItems, OrderStatus),
    PaymentLinkSet(OrderWithItems, String),
}

impl Notification {
    fn kind(&self) -> &'static str {
        match self {
            Notification::OrderCreated(_) => "order_created",
            Notification::StatusChanged(..) => "status_changed",
            Notification::PaymentLinkSet(..) => "payment_link_set",
        }
    }

    fn order_code(&self) -> &str {
        match self {
            Notification::OrderCreated(order)
            | Notification::StatusChanged(order, _)
            | Notification::PaymentLinkSet(order, _) => &order.order.order_code,
        }
    }
}

/// Handle for enqueueing notifications. Disabled notifiers accept and discard everything.
#[derive(Clone, Debug)]
pub struct Notifier {
    sender: Option<mpsc::Sender<Notification>>,
}

impl Notifier {
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender: Some(sender) }, receiver)
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Returns whether the notification was queued.
    pub fn notify(&self, notification: Notification) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(notification) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(
                    kind = dropped.kind(),
                    order_code = dropped.order_code(),
                    "Notification queue full, dropping notification"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                warn!(
                    kind = dropped.kind(),
                    order_code = dropped.order_code(),
                    "Notification worker stopped, dropping notification"
                );
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Dm(String),
    Channel(String),
}

/// Who hears about what.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Destinations {
    pub admin_ids: Vec<String>,
    pub logs_channel_id: Option<String>,
}

impl Destinations {
    pub fn from_config(config: &DiscordConfig) -> Self {
        Self {
            admin_ids: config.admin_ids(),
            logs_channel_id: config.logs_channel_id().map(str::to_string),
        }
    }

    /// New orders reach the admins by DM and the logs channel; everything else only the channel.
    fn for_notification(&self, notification: &Notification) -> Vec<Destination> {
        let mut targets = Vec::new();
        if matches!(notification, Notification::OrderCreated(_)) {
            targets.extend(self.admin_ids.iter().cloned().map(Destination::Dm));
        }
        if let Some(channel) = &self.logs_channel_id {
            targets.push(Destination::Channel(channel.clone()));
        }
        targets
    }
}

pub fn render(notification: &Notification) -> Embed {
    match notification {
        Notification::OrderCreated(order) => embeds::new_order_embed(order),
        Notification::StatusChanged(order, status) => embeds::status_changed_embed(order, *status),
        Notification::PaymentLinkSet(order, link) => embeds::payment_embed(order, link),
    }
}

pub struct NotificationWorker {
    receiver: mpsc::Receiver<Notification>,
    sink: Arc<dyn DiscordSink>,
    destinations: Destinations,
    send_timeout: Duration,
}

impl NotificationWorker {
    pub fn new(
        receiver: mpsc::Receiver<Notification>,
        sink: Arc<dyn DiscordSink>,
        destinations: Destinations,
        send_timeout: Duration,
    ) -> Self {
        Self {
            receiver,
            sink,
            destinations,
            send_timeout,
        }
    }

    /// Runs until every [`Notifier`] clone is dropped and the queue is drained.
    pub async fn run(mut self) {
        info!("Notification worker started");
        while let Some(notification) = self.receiver.recv().await {
            self.deliver(&notification).await;
        }
        info!("Notification worker stopped");
    }

    /// Sends to each destination in turn and returns how many succeeded.
    #[instrument(skip_all, fields(kind = notification.kind(), order_code = notification.order_code()))]
    pub async fn deliver(&self, notification: &Notification) -> usize {
        let embed = render(notification);
        let mut delivered = 0;
        for destination in self.destinations.for_notification(notification) {
            match self.send(&destination, &embed).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(?destination, error = %e, "Failed to deliver notification"),
            }
        }
        debug!(delivered, "Notification processed");
        delivered
    }

    async fn send(&self, destination: &Destination, embed: &Embed) -> Result<(), SinkError> {
        let send = async {
            match destination {
                Destination::Dm(user_id) => self.sink.send_dm(user_id, embed).await,
                Destination::Channel(channel_id) => self.sink.send_channel(channel_id, embed).await,
            }
        };
        timeout(self.send_timeout, send)
            .await
            .map_err(|_| SinkError::Timeout)?
    }
}
