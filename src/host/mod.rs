//! Privileged host process: menu, startup timer, and shell wiring.

pub mod menu;
pub mod shell;
pub mod timer;

pub use menu::{AppMenu, MenuCommand, UnknownMenuCommand};
pub use shell::{Shell, ShellBuilder};
pub use timer::schedule_tick;
