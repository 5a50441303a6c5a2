//! Discord integration: outbound order notifications and admin slash commands.

pub mod bot;
pub mod commands;
pub mod embeds;
pub mod notifier;
pub mod sink;

pub use bot::DiscordBot;
pub use commands::CommandHandler;
pub use notifier::{Destinations, Notification, NotificationWorker, Notifier};
pub use sink::SerenitySink;
