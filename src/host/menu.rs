//! Application menu commands and their broadcasts.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use crate::channels;
use crate::events::EventPublisher;

/// Menu entries that notify the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuCommand {
    ImportPng,
    ExportPng,
}

impl MenuCommand {
    pub const ALL: [MenuCommand; 2] = [MenuCommand::ImportPng, MenuCommand::ExportPng];

    /// Broadcast channel fired when the entry is clicked.
    pub fn channel(self) -> &'static str {
        match self {
            MenuCommand::ImportPng => channels::IMPORT_PNG,
            MenuCommand::ExportPng => channels::EXPORT_PNG,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuCommand::ImportPng => "Import PNG...",
            MenuCommand::ExportPng => "Export PNG...",
        }
    }

    pub fn accelerator(self) -> &'static str {
        match self {
            MenuCommand::ImportPng => "CmdOrCtrl+O",
            MenuCommand::ExportPng => "CmdOrCtrl+S",
        }
    }
}

impl fmt::Display for MenuCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown menu command: {0}")]
pub struct UnknownMenuCommand(pub String);

impl FromStr for MenuCommand {
    type Err = UnknownMenuCommand;

    /// Accepts the short form (`import`) or the channel name (`import_png`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "import" | "import_png" => Ok(MenuCommand::ImportPng),
            "export" | "export_png" => Ok(MenuCommand::ExportPng),
            other => Err(UnknownMenuCommand(other.to_string())),
        }
    }
}

/// The File menu, wired to the broadcast publisher.
#[derive(Debug, Clone)]
pub struct AppMenu {
    publisher: EventPublisher,
}

impl AppMenu {
    pub fn new(publisher: EventPublisher) -> Self {
        Self { publisher }
    }

    /// `(label, accelerator, command)` for every entry, in menu order.
    pub fn entries(&self) -> Vec<(&'static str, &'static str, MenuCommand)> {
        MenuCommand::ALL
            .iter()
            .map(|c| (c.label(), c.accelerator(), *c))
            .collect()
    }

    /// The user clicked `command`.
    pub fn activate(&self, command: MenuCommand) {
        log::info!("Menu: {}", command);
        self.publisher.publish(command.channel(), Value::Null);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::wire::{link, HostMessage};

    #[test]
    fn test_parse() {
        assert_eq!("import".parse(), Ok(MenuCommand::ImportPng));
        assert_eq!(" Export_PNG ".parse(), Ok(MenuCommand::ExportPng));
        assert_eq!(
            "quit".parse::<MenuCommand>(),
            Err(UnknownMenuCommand("quit".into()))
        );
    }

    #[tokio::test]
    async fn test_activate_publishes_without_payload() {
        let (host, mut sandbox) = link();
        let menu = AppMenu::new(EventPublisher::new(host.outbound.clone()));
        assert_eq!(menu.entries().len(), 2);

        menu.activate(MenuCommand::ExportPng);
        match sandbox.inbound.recv().await.unwrap() {
            HostMessage::Event(msg) => {
                assert_eq!(msg.channel, "export_png");
                assert_eq!(*msg.payload, Value::Null);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
