//! Linear chapter story gated by clues found across the desktop.

pub mod catalog;
pub mod engine;

pub use catalog::{Chapter, Clue, ClueSource, builtin_chapters, builtin_clues};
pub use engine::{ChapterProgress, DiscoverOutcome, NarrativeEngine, NarrativeState};

/// Storage key for the persisted [`NarrativeState`].
pub const NARRATIVE_KEY: &str = "hexdesk.narrative.v1";
