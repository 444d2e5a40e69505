// Library exports for testing and embedding
//
// # Concurrency Policy
//
// The decoration addon is single-owner: it is mutated through `&mut self`
// from whichever thread pumps `process_events`. Shared collaborators
// (emitters, decorations, markers, services) use `parking_lot::Mutex` and
// atomics so they can be fired from other threads; their events queue up
// until the next pump.

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod debug;
pub mod decorations;
pub mod error;
pub mod replay;
pub mod services;
pub mod settings;

pub use decorations::{AddonServices, CommandAction, DecorationAddon};
pub use error::{DecorationError, RegistryError};
pub use services::{ClipboardService, ContextMenuService, HoverService, SystemClipboard};
pub use settings::{ConfigChangeEvent, ConfigurationService};
