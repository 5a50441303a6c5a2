use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ApplicationId, CommandDataOptionValue, CommandInteraction, CommandOptionType, Context,
    CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseMessage, EventHandler, GatewayIntents, GuildId, Interaction,
    Permissions, Ready,
};
use serenity::gateway::ShardManager;
use serenity::Client;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::config::DiscordConfig;
use crate::domain::OrderStatus;

use super::commands::{CommandHandler, CommandInput, Reply};
use super::sink::to_serenity_embed;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Discord bot token is not configured")]
    MissingToken,
    #[error("Discord client error: {0}")]
    Client(#[from] serenity::Error),
}

const CODE_DESCRIPTION: &str = "Order code (e.g., 4e-1234)";

fn code_option() -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "code", CODE_DESCRIPTION).required(true)
}

/// The seven admin commands, restricted to administrators in the guild UI.
pub fn slash_commands() -> Vec<CreateCommand> {
    let status_option = OrderStatus::ALL.into_iter().fold(
        CreateCommandOption::new(CommandOptionType::String, "status", "New status").required(true),
        |option, status| option.add_string_choice(status.label(), status.as_str()),
    );

    vec![
        CreateCommand::new("orders").description("View all pending orders"),
        CreateCommand::new("status")
            .description("Update order status")
            .add_option(code_option())
            .add_option(status_option),
        CreateCommand::new("payment")
            .description("Send payment link to customer")
            .add_option(code_option())
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "link", "Payment link URL")
                    .required(true),
            ),
        CreateCommand::new("complete")
            .description("Mark order as completed")
            .add_option(code_option()),
        CreateCommand::new("cancel")
            .description("Cancel an order")
            .add_option(code_option()),
        CreateCommand::new("stats").description("View revenue and order statistics"),
        CreateCommand::new("logs").description("View recent order activity"),
    ]
    .into_iter()
    .map(|command| command.default_member_permissions(Permissions::ADMINISTRATOR))
    .collect()
}

fn command_input(interaction: &CommandInteraction) -> CommandInput {
    interaction
        .data
        .options
        .iter()
        .filter_map(|option| match &option.value {
            CommandDataOptionValue::String(value) => Some((option.name.clone(), value.clone())),
            _ => None,
        })
        .fold(CommandInput::new(interaction.data.name.clone()), |input, (name, value)| {
            input.option(name, value)
        })
}

fn ephemeral_response(reply: Reply) -> CreateInteractionResponse {
    let message = CreateInteractionResponseMessage::new().ephemeral(true);
    let message = match reply {
        Reply::Text(text) => message.content(text),
        Reply::Embeds(embeds) => message.embeds(embeds.iter().map(to_serenity_embed).collect()),
    };
    CreateInteractionResponse::Message(message)
}

struct Handler {
    commands: CommandHandler,
    guild_id: Option<GuildId>,
    register_commands: bool,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "Discord bot logged in");

        let Some(guild_id) = self.guild_id.filter(|_| self.register_commands) else {
            info!("Discord client ID or server ID not configured, skipping command registration");
            return;
        };
        match guild_id.set_commands(&ctx.http, slash_commands()).await {
            Ok(registered) => info!(count = registered.len(), %guild_id, "Slash commands registered"),
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        let input = command_input(&command);
        let invoker = command.user.id.to_string();
        let reply = self.commands.handle(&invoker, &input).await;

        if let Err(e) = command
            .create_response(&ctx.http, ephemeral_response(reply))
            .await
        {
            warn!(command = %input.name, error = %e, "Failed to respond to interaction");
        }
    }
}

fn parse_id(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.parse::<u64>().ok()).filter(|v| *v != 0)
}

/// A running gateway connection.
pub struct DiscordBot {
    shard_manager: Arc<ShardManager>,
    handle: JoinHandle<()>,
}

impl DiscordBot {
    /// Connects to the gateway in a background task.
    #[instrument(skip_all)]
    pub async fn start(config: &DiscordConfig, commands: CommandHandler) -> Result<Self, BotError> {
        let token = config.bot_token().ok_or(BotError::MissingToken)?;
        let application_id = parse_id(config.client_id());
        let guild_id = parse_id(config.server_id()).map(GuildId::new);

        let handler = Handler {
            commands,
            guild_id,
            register_commands: application_id.is_some(),
        };

        let mut builder = Client::builder(token, GatewayIntents::GUILDS).event_handler(handler);
        if let Some(id) = application_id {
            builder = builder.application_id(ApplicationId::new(id));
        }
        let mut client = builder.await?;
        let shard_manager = client.shard_manager.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = client.start().await {
                error!(error = %e, "Discord client stopped with an error");
            }
        });
        info!("Discord bot starting");
        Ok(Self {
            shard_manager,
            handle,
        })
    }

    pub async fn shutdown(self) {
        info!("Shutting down Discord bot...");
        self.shard_manager.shutdown_all().await;
        if let Err(e) = self.handle.await {
            error!(error = %e, "Discord client task failed");
        }
    }
}
