//! Event tracking, quest completion, leveling, and rewards.

use std::collections::{BTreeMap, BTreeSet};

use hexdesk_types::config::ProgressionConfig;
use hexdesk_types::notice::Notice;
use hexdesk_types::session::{Difficulty, Role, Session};
use serde::{Deserialize, Serialize};

use crate::catalog::{Quest, QuestCategory, Reward, RewardKind, builtin_quests, builtin_rewards};
use crate::event::EventKind;
use crate::level::LevelCurve;

/// History entry recorded for events without a target.
const UNTARGETED: &str = "*";

/// Decides whether the current session earns progression at all.
pub trait TrackingGate {
    fn allows(&self, session: &Session) -> bool;
}

impl<F> TrackingGate for F
where
    F: Fn(&Session) -> bool,
{
    fn allows(&self, session: &Session) -> bool {
        self(session)
    }
}

/// Gate that admits exactly one role/difficulty pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGate {
    pub role: Role,
    pub difficulty: Difficulty,
}

impl RoleGate {
    pub fn from_config(config: &ProgressionConfig) -> Self {
        Self {
            role: config.tracked_role,
            difficulty: config.tracked_difficulty,
        }
    }
}

impl TrackingGate for RoleGate {
    fn allows(&self, session: &Session) -> bool {
        session.role == self.role && session.difficulty == self.difficulty
    }
}

/// The persisted progression aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub quests: Vec<Quest>,
    pub rewards: Vec<Reward>,
    pub xp: u32,
    /// Always `curve.level_for(xp)`; stored for readers of the blob.
    pub level: u32,
    /// Targets already seen per event kind.
    pub history: BTreeMap<EventKind, BTreeSet<String>>,
}

impl ProgressionState {
    pub fn new(quests: Vec<Quest>, rewards: Vec<Reward>) -> Self {
        Self {
            quests,
            rewards,
            xp: 0,
            level: 1,
            history: BTreeMap::new(),
        }
    }
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::new(builtin_quests(), builtin_rewards())
    }
}

/// A level-up raised by [`QuestEngine::track_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpSignal {
    pub level: u32,
    pub delay_ms: u64,
    /// Acknowledged on the spot because a dedicated screen covers this level.
    pub suppressed: bool,
}

/// Result of one tracked event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackOutcome {
    /// The event was new and got recorded in the history.
    pub recorded: bool,
    /// Quest ids completed by this event.
    pub completed: Vec<String>,
    pub xp_gained: u32,
    pub level_up: Option<LevelUpSignal>,
    pub notices: Vec<Notice>,
}

impl TrackOutcome {
    /// Whether persisted state changed.
    pub fn changed(&self) -> bool {
        self.recorded
    }
}

/// Result of [`QuestEngine::claim_reward`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed { kind: RewardKind, notice: Notice },
    AlreadyClaimed,
    Locked { unlock_level: u32 },
    Unknown,
}

/// Owner of the progression state.
pub struct QuestEngine {
    state: ProgressionState,
    initial: ProgressionState,
    curve: LevelCurve,
    suppressed_levels: BTreeSet<u32>,
    level_up_delay_ms: u64,
    gate: Box<dyn TrackingGate>,
    pending_level_up: Option<u32>,
}

impl QuestEngine {
    pub fn new(
        initial: ProgressionState,
        config: &ProgressionConfig,
        gate: Box<dyn TrackingGate>,
    ) -> Self {
        let curve = LevelCurve::from_config(config);
        let mut state = initial.clone();
        state.level = curve.level_for(state.xp);
        Self {
            state,
            initial,
            curve,
            suppressed_levels: config.suppressed_level_ups.iter().copied().collect(),
            level_up_delay_ms: config.level_up_delay_ms,
            gate,
            pending_level_up: None,
        }
    }

    /// Engine over the stock catalog with the configured role gate.
    pub fn from_config(config: &ProgressionConfig) -> Self {
        Self::new(
            ProgressionState::default(),
            config,
            Box::new(RoleGate::from_config(config)),
        )
    }

    /// Replace the live state with a previously persisted one.
    pub fn restore(&mut self, mut state: ProgressionState) {
        state.level = self.curve.level_for(state.xp);
        self.state = state;
        self.pending_level_up = None;
    }

    // -- Read access --

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn quests(&self) -> &[Quest] {
        &self.state.quests
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.state.rewards
    }

    pub fn xp(&self) -> u32 {
        self.state.xp
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn curve(&self) -> LevelCurve {
        self.curve
    }

    /// `(earned, span)` for the progress bar of the current level.
    pub fn level_progress(&self) -> (u32, u32) {
        self.curve.progress_in_level(self.state.xp)
    }

    /// Level-up waiting for [`QuestEngine::acknowledge_level_up`].
    pub fn pending_level_up(&self) -> Option<u32> {
        self.pending_level_up
    }

    pub fn is_tracking(&self, session: &Session) -> bool {
        self.gate.allows(session)
    }

    // -- Transitions --

    /// Record an event and advance every quest listening for it.
    ///
    /// Events from sessions the gate rejects, and `(kind, target)` pairs seen
    /// before, leave the state untouched.
    pub fn track_event(
        &mut self,
        session: &Session,
        kind: EventKind,
        target: Option<&str>,
    ) -> TrackOutcome {
        let mut outcome = TrackOutcome::default();
        if !self.gate.allows(session) {
            return outcome;
        }

        let key = target.unwrap_or(UNTARGETED);
        if !self.state.history.entry(kind).or_default().insert(key.to_string()) {
            return outcome;
        }
        outcome.recorded = true;

        for quest in self.state.quests.iter_mut().filter(|q| !q.is_completed) {
            let Some(requirement) = quest.requirement_for(kind) else {
                continue;
            };
            if requirement.target.as_deref().is_some_and(|t| Some(t) != target) {
                continue;
            }
            let needed = requirement.count;
            quest.progress += 1;
            if quest.progress >= needed {
                quest.is_completed = true;
                outcome.xp_gained = outcome.xp_gained.saturating_add(quest.xp);
                outcome.completed.push(quest.id.clone());
                outcome.notices.push(completion_notice(quest));
                log::info!("quest complete: {} (+{} xp)", quest.id, quest.xp);
            }
        }

        if outcome.xp_gained == 0 {
            return outcome;
        }

        let old_level = self.state.level;
        self.state.xp = self.state.xp.saturating_add(outcome.xp_gained);
        self.state.level = self.curve.level_for(self.state.xp);

        if self.state.level > old_level {
            let level = self.state.level;
            let suppressed = self.suppressed_levels.contains(&level);
            log::info!("level up: {old_level} -> {level}");
            if suppressed {
                self.pending_level_up = None;
            } else {
                self.pending_level_up = Some(level);
                outcome.notices.push(Notice::LevelUp {
                    level,
                    delay_ms: self.level_up_delay_ms,
                });
            }
            outcome.level_up = Some(LevelUpSignal {
                level,
                delay_ms: self.level_up_delay_ms,
                suppressed,
            });
        }
        outcome
    }

    /// Clear the pending level-up signal, returning it.
    pub fn acknowledge_level_up(&mut self) -> Option<u32> {
        self.pending_level_up.take()
    }

    /// Claim an unlocked reward. Claiming twice has no further effect.
    pub fn claim_reward(&mut self, reward_id: &str) -> ClaimOutcome {
        let level = self.state.level;
        let Some(reward) = self.state.rewards.iter_mut().find(|r| r.id == reward_id) else {
            return ClaimOutcome::Unknown;
        };
        if reward.is_claimed {
            return ClaimOutcome::AlreadyClaimed;
        }
        if level < reward.unlock_level {
            return ClaimOutcome::Locked {
                unlock_level: reward.unlock_level,
            };
        }
        reward.is_claimed = true;
        log::info!("reward claimed: {}", reward.id);
        let message = match reward.kind {
            RewardKind::Wallpaper => {
                format!("{} is now available in wallpaper settings.", reward.title)
            },
            RewardKind::Theme => format!("{} can be applied from settings.", reward.title),
            RewardKind::File => format!("{} was added to your home folder.", reward.title),
            RewardKind::Badge => format!("{} pinned to your profile.", reward.title),
        };
        ClaimOutcome::Claimed {
            kind: reward.kind,
            notice: Notice::success("Reward unlocked", message),
        }
    }

    /// Return to the initial snapshot.
    pub fn reset_progress(&mut self) {
        self.state = self.initial.clone();
        self.state.level = self.curve.level_for(self.state.xp);
        self.pending_level_up = None;
        log::info!("progression reset");
    }
}

fn completion_notice(quest: &Quest) -> Notice {
    match quest.category {
        QuestCategory::Main => Notice::success(
            "Main story advanced",
            format!("{} complete. +{} XP", quest.title, quest.xp),
        ),
        QuestCategory::Side => Notice::success(
            "Side quest complete",
            format!("{}. +{} XP", quest.title, quest.xp),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Requirement;

    fn hard_guest() -> Session {
        Session::new(Role::Guest, Difficulty::Hard)
    }

    fn engine() -> QuestEngine {
        QuestEngine::from_config(&ProgressionConfig::default())
    }

    fn single_quest_engine(count: u32, xp: u32, target: Option<&str>) -> QuestEngine {
        let quest = Quest::new(
            "q",
            "Quest",
            "",
            xp,
            QuestCategory::Side,
            vec![Requirement {
                event: EventKind::TerminalCmd,
                target: target.map(str::to_string),
                count,
            }],
        );
        QuestEngine::new(
            ProgressionState::new(vec![quest], builtin_rewards()),
            &ProgressionConfig::default(),
            Box::new(|_: &Session| true),
        )
    }

    fn quest<'a>(engine: &'a QuestEngine, id: &str) -> &'a Quest {
        engine.quests().iter().find(|q| q.id == id).unwrap()
    }

    #[test]
    fn gate_blocks_other_sessions() {
        let mut e = engine();
        for session in [
            Session::new(Role::Guest, Difficulty::Easy),
            Session::new(Role::Recruiter, Difficulty::Hard),
            Session::new(Role::Admin, Difficulty::Hard),
        ] {
            assert!(!e.is_tracking(&session));
            let outcome = e.track_event(&session, EventKind::CtfProgress, Some("FRAGMENT_1"));
            assert!(!outcome.changed());
        }
        assert!(e.is_tracking(&hard_guest()));
        assert_eq!(e.xp(), 0);
        assert!(e.state().history.is_empty());
    }

    #[test]
    fn huge_rewards_saturate_instead_of_overflowing() {
        let quests = ["a", "b"]
            .into_iter()
            .map(|id| {
                Quest::new(
                    id,
                    "Jackpot",
                    "",
                    u32::MAX,
                    QuestCategory::Side,
                    vec![Requirement {
                        event: EventKind::TerminalCmd,
                        target: None,
                        count: 1,
                    }],
                )
            })
            .collect();
        let mut e = QuestEngine::new(
            ProgressionState::new(quests, builtin_rewards()),
            &ProgressionConfig::default(),
            Box::new(|_: &Session| true),
        );
        let outcome = e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("ls"));
        assert_eq!(outcome.completed.len(), 2);
        assert_eq!(outcome.xp_gained, u32::MAX);
        assert_eq!(e.xp(), u32::MAX);
        assert_eq!(e.level(), 5);
    }

    #[test]
    fn duplicate_event_counts_once() {
        let mut e = engine();
        let first = e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("ls"));
        let second = e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("ls"));
        assert!(first.recorded);
        assert!(!second.recorded);
        assert_eq!(quest(&e, "shell-novice").progress, 1);
    }

    #[test]
    fn distinct_targets_accumulate_to_completion() {
        let mut e = engine();
        for cmd in ["ls", "cd", "pwd", "cat"] {
            e.track_event(&hard_guest(), EventKind::TerminalCmd, Some(cmd));
        }
        assert!(!quest(&e, "shell-novice").is_completed);
        let outcome = e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("grep"));
        assert_eq!(outcome.completed, vec!["shell-novice".to_string()]);
        assert_eq!(e.xp(), 100);
        assert_eq!(outcome.notices.len(), 1);
    }

    #[test]
    fn untargeted_events_share_one_history_slot() {
        let mut e = single_quest_engine(2, 10, None);
        assert!(e.track_event(&hard_guest(), EventKind::TerminalCmd, None).recorded);
        assert!(!e.track_event(&hard_guest(), EventKind::TerminalCmd, None).recorded);
        assert_eq!(quest(&e, "q").progress, 1);
    }

    #[test]
    fn targeted_requirement_ignores_other_targets() {
        let mut e = single_quest_engine(1, 10, Some("sudo"));
        e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("ls"));
        assert_eq!(quest(&e, "q").progress, 0);
        e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("sudo"));
        assert!(quest(&e, "q").is_completed);
    }

    #[test]
    fn completion_awards_xp_and_levels_up_once() {
        let mut e = single_quest_engine(1, 250, None);
        let outcome = e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("ls"));
        assert_eq!(e.xp(), 250);
        assert_eq!(e.level(), 2);
        assert_eq!(
            outcome.level_up,
            Some(LevelUpSignal {
                level: 2,
                delay_ms: 1500,
                suppressed: false,
            })
        );
        assert_eq!(e.pending_level_up(), Some(2));
        let level_notices = outcome
            .notices
            .iter()
            .filter(|n| matches!(n, Notice::LevelUp { .. }))
            .count();
        assert_eq!(level_notices, 1);
        assert_eq!(e.acknowledge_level_up(), Some(2));
        assert_eq!(e.pending_level_up(), None);
    }

    #[test]
    fn completed_quest_is_frozen() {
        let mut e = single_quest_engine(1, 10, None);
        e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("a"));
        e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("b"));
        let q = quest(&e, "q");
        assert!(q.is_completed);
        assert_eq!(q.progress, 1);
        assert_eq!(e.xp(), 10);
    }

    #[test]
    fn max_level_signal_is_suppressed() {
        let mut e = single_quest_engine(1, 5000, None);
        let outcome = e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("x"));
        assert_eq!(e.level(), 5);
        assert!(outcome.level_up.unwrap().suppressed);
        assert_eq!(e.pending_level_up(), None);
        assert!(!outcome.notices.iter().any(|n| matches!(n, Notice::LevelUp { .. })));
    }

    #[test]
    fn main_and_side_notices_differ() {
        let mut e = engine();
        let main = e.track_event(&hard_guest(), EventKind::CtfProgress, Some("FRAGMENT_1"));
        let side = e.track_event(&hard_guest(), EventKind::FileRead, Some("/var/log/auth.log"));
        let title = |o: &TrackOutcome| match &o.notices[0] {
            Notice::Toast { title, .. } => title.clone(),
            other => panic!("unexpected notice {other:?}"),
        };
        assert_eq!(title(&main), "Main story advanced");
        assert_eq!(title(&side), "Side quest complete");
    }

    #[test]
    fn reward_claim_requires_level_and_is_idempotent() {
        let mut e = engine();
        assert_eq!(
            e.claim_reward("matrix-rain"),
            ClaimOutcome::Locked { unlock_level: 2 }
        );
        e.track_event(&hard_guest(), EventKind::CtfProgress, Some("FRAGMENT_1"));
        assert!(matches!(
            e.claim_reward("matrix-rain"),
            ClaimOutcome::Claimed {
                kind: RewardKind::Wallpaper,
                ..
            }
        ));
        assert_eq!(e.claim_reward("matrix-rain"), ClaimOutcome::AlreadyClaimed);
        assert_eq!(e.claim_reward("nope"), ClaimOutcome::Unknown);
    }

    #[test]
    fn reset_restores_initial_snapshot() {
        let mut e = engine();
        e.track_event(&hard_guest(), EventKind::CtfProgress, Some("FRAGMENT_1"));
        e.reset_progress();
        assert_eq!(e.state(), &ProgressionState::default());
        assert_eq!(e.pending_level_up(), None);
        let again = e.track_event(&hard_guest(), EventKind::CtfProgress, Some("FRAGMENT_1"));
        assert!(again.recorded);
    }

    #[test]
    fn restore_recomputes_level_from_xp() {
        let mut e = engine();
        let saved = ProgressionState {
            xp: 600,
            level: 1,
            ..ProgressionState::default()
        };
        e.restore(saved);
        assert_eq!(e.level(), 3);
    }

    #[test]
    fn state_roundtrips_through_json() {
        let mut e = engine();
        e.track_event(&hard_guest(), EventKind::TerminalCmd, Some("ls"));
        let json = serde_json::to_string(e.state()).unwrap();
        assert!(json.contains("\"TERMINAL_CMD\":[\"ls\"]"));
        let back: ProgressionState = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, e.state());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn level_never_exceeds_cap(events in proptest::collection::vec((0usize..6, "[A-Z_0-9]{1,12}"), 0..60)) {
                let mut e = engine();
                for (kind, target) in events {
                    e.track_event(&hard_guest(), EventKind::ALL[kind], Some(target.as_str()));
                    prop_assert!(e.level() <= 5);
                    prop_assert_eq!(e.level(), e.curve().level_for(e.xp()));
                }
            }

            #[test]
            fn replaying_history_changes_nothing(events in proptest::collection::vec((0usize..6, "[a-z]{1,4}"), 0..30)) {
                let mut e = engine();
                for (kind, target) in &events {
                    e.track_event(&hard_guest(), EventKind::ALL[*kind], Some(target.as_str()));
                }
                let snapshot = e.state().clone();
                for (kind, target) in &events {
                    let outcome = e.track_event(&hard_guest(), EventKind::ALL[*kind], Some(target.as_str()));
                    prop_assert!(!outcome.changed());
                }
                prop_assert_eq!(e.state(), &snapshot);
            }
        }
    }
}
