//! UI Command Protocol
//!
//! Declarative UI-update vocabulary rendered by the companion device:
//! screen changes, element text/bitmap updates, and selectable lists,
//! with TTL-bound transient values.
//!
//! The vocabulary is a closed set; adding a command kind is additive and
//! existing kinds are never renamed.

mod command;
mod screen;

pub use command::{Animation, Command, CommandBatch, ElementId, ListItem, Ttl, UiAction};
pub use screen::ScreenId;

/// Icon glyphs from the device's symbol font.
pub mod icon {
    pub const CLOCK: char = '\u{e02b}';
    pub const MULTIPLIER: char = '\u{e022}';
    pub const PROFILE: char = '\u{e023}';
    pub const PIN: char = '\u{e021}';
    pub const PRICE: char = '\u{e020}';
}

/// Well-known element slots shared across screen layouts.
pub mod element {
    use crate::ElementId;

    /// Transient status placeholder re-armed on every poll.
    pub const STATUS_PLACEHOLDER: ElementId = ElementId(1);
    /// Placeholder shown while the device resolves its location.
    pub const LOCATE_PLACEHOLDER: ElementId = ElementId(0);
    /// Alert title slot on the error screen.
    pub const ALERT_TITLE: ElementId = ElementId(0);
    /// Alert message slot on the error screen.
    pub const ALERT_MESSAGE: ElementId = ElementId(1);
}
