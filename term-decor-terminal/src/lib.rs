//! Terminal-side model for the term-decor decoration manager.
//!
//! This crate provides the pieces a terminal session exposes to the
//! decoration manager:
//!
//! - Event streams with disposable subscriptions
//! - Buffer markers and a scroll buffer that allocates and trims them
//! - Commands and the capability store announcing command detection
//! - Decorations, their rendered elements, and a headless renderer

pub mod buffer;
pub mod capabilities;
pub mod command;
pub mod decoration;
pub mod event;
pub mod host;
pub mod marker;

// Re-export main types for convenience
pub use buffer::ScrollbackBuffer;
pub use capabilities::{CapabilityStore, CommandDetectionCapability, TerminalCapability};
pub use command::TerminalCommand;
pub use decoration::{Decoration, DecorationElement, DecorationRenderer, InlineStyle, PointerEvent};
pub use event::{Emitter, Sequenced, Subscription};
pub use host::DecorationHost;
pub use marker::{Marker, MarkerId};
