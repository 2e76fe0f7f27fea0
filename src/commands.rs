//! Command registry — explicit name-to-handler dispatch.
//!
//! Handlers share one contract: `(sender, arguments) -> reply text`.
//! Registration is an explicit call; there is no reflection or attribute
//! scanning involved. Uses enum dispatch to avoid trait objects.

use crate::error::{CoreError, Result};
use crate::model::Identity;
use crate::store::RecordStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Built-in command handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandHandler {
    /// Show usage
    Help,
    /// Report a player's accumulated time
    Get,
    /// Set a player's checkpoint to an explicit value
    Set,
    /// Rebase a player's timer to now
    Reset,
}

/// Mapping from command name to handler
pub struct CommandRegistry {
    store: Arc<RecordStore>,
    handlers: HashMap<&'static str, CommandHandler>,
}

impl CommandRegistry {
    /// Empty registry; handlers must be registered explicitly
    pub fn new(store: Arc<RecordStore>) -> Self {
        CommandRegistry {
            store,
            handlers: HashMap::new(),
        }
    }

    /// Registry with the standard command set
    pub fn with_defaults(store: Arc<RecordStore>) -> Self {
        let mut registry = Self::new(store);
        registry.register("help", CommandHandler::Help);
        registry.register("get", CommandHandler::Get);
        registry.register("set", CommandHandler::Set);
        registry.register("reset", CommandHandler::Reset);
        registry
    }

    /// Bind a name to a handler, replacing any previous binding
    pub fn register(&mut self, name: &'static str, handler: CommandHandler) {
        self.handlers.insert(name, handler);
    }

    /// Registered command names, sorted for stable output
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run the named command on behalf of `sender` and return the reply
    pub async fn dispatch(&self, name: &str, sender: &Identity, args: &[&str]) -> Result<String> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| CoreError::Command(format!("Unknown command: {}", name)))?;

        match handler {
            CommandHandler::Help => Ok(self.help_text()),
            CommandHandler::Get => self.handle_get(sender, args).await,
            CommandHandler::Set => self.handle_set(args).await,
            CommandHandler::Reset => self.handle_reset(sender, args).await,
        }
    }

    fn help_text(&self) -> String {
        [
            "Wakacraft Help",
            "  get [player]        - Get the waka time of a player.",
            "  reset [player]      - Reset the waka time of a player.",
            "  set [player] [time] - Set the waka time of a player.",
        ]
        .join("\n")
    }

    async fn handle_get(&self, sender: &Identity, args: &[&str]) -> Result<String> {
        let target = target_identity(sender, args.first().copied());
        let record = self.store.load(&target).await?;

        if args.is_empty() {
            Ok(format!("Your waka time is {}", record.formatted()))
        } else {
            Ok(format!(
                "The waka time of {} is {}",
                record.name(),
                record.formatted()
            ))
        }
    }

    async fn handle_set(&self, args: &[&str]) -> Result<String> {
        let (name, time) = match args {
            [name, time] => (*name, *time),
            _ => {
                return Err(CoreError::Command(
                    "Usage: set [player] [time]".to_string(),
                ))
            }
        };

        let time: i64 = time
            .parse()
            .map_err(|_| CoreError::Command(format!("Invalid time: {}", time)))?;

        self.store.save(&Identity::by_name(name), time).await?;
        Ok(format!("The waka time of {} was set to {}.", name, time))
    }

    async fn handle_reset(&self, sender: &Identity, args: &[&str]) -> Result<String> {
        let target = target_identity(sender, args.first().copied());
        self.store.reset(&target).await?;
        Ok(format!("The waka time of {} was reset.", target.name()))
    }
}

/// The sender themselves when no name argument is given, otherwise a
/// by-name reference to the named player
fn target_identity(sender: &Identity, name: Option<&str>) -> Identity {
    match name {
        Some(name) => Identity::by_name(name),
        None => sender.clone(),
    }
}
