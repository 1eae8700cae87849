//! Quest and progression engine.
//!
//! Turns a stream of gameplay events into quest progress, experience, and
//! levels. Each `(event, target)` pair counts at most once for the lifetime
//! of the progression state.

pub mod catalog;
pub mod engine;
pub mod event;
pub mod level;

pub use catalog::{
    Quest, QuestCategory, Requirement, Reward, RewardKind, builtin_quests, builtin_rewards,
};
pub use engine::{
    ClaimOutcome, LevelUpSignal, ProgressionState, QuestEngine, RoleGate, TrackOutcome,
    TrackingGate,
};
pub use event::EventKind;
pub use level::LevelCurve;

/// Storage key for the persisted [`ProgressionState`].
pub const PROGRESS_KEY: &str = "hexdesk.progress.v2";
