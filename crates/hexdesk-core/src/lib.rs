//! The hexdesk desktop.
//!
//! [`Desktop`] owns one instance of every core component and is the only
//! place they meet: terminal commands and window opens become progression
//! events, engine state is persisted after each change, and user-facing
//! signals collect in a notice queue for the presentation layer to drain.

mod desktop;
mod progress;

pub use desktop::Desktop;

pub use hexdesk_quest::{ClaimOutcome, EventKind, TrackOutcome};
pub use hexdesk_story::{ClueSource, DiscoverOutcome};
pub use hexdesk_terminal::{AiTicket, CommandOutput};
pub use hexdesk_types::notice::Notice;
pub use hexdesk_wm::{OpenOutcome, Props, Side, Size};
