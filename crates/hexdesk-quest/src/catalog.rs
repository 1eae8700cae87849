//! Quest and reward definitions, plus the stock catalog.

use serde::{Deserialize, Serialize};

use crate::event::EventKind;

/// One condition a quest listens for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub event: EventKind,
    /// Only this target counts. `None` accepts any target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Distinct matching events needed to complete the quest.
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestCategory {
    Main,
    Side,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub xp: u32,
    pub requirements: Vec<Requirement>,
    pub is_completed: bool,
    pub progress: u32,
    pub category: QuestCategory,
}

impl Quest {
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        xp: u32,
        category: QuestCategory,
        requirements: Vec<Requirement>,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            xp,
            requirements,
            is_completed: false,
            progress: 0,
            category,
        }
    }

    /// The requirement an event of `kind` is checked against: the first one
    /// listening for that kind.
    pub fn requirement_for(&self, kind: EventKind) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.event == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    Wallpaper,
    Theme,
    File,
    Badge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: String,
    pub title: String,
    pub description: String,
    pub unlock_level: u32,
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub is_claimed: bool,
}

fn req(event: EventKind, target: Option<&str>, count: u32) -> Requirement {
    Requirement {
        event,
        target: target.map(str::to_string),
        count,
    }
}

/// The stock quest catalog.
pub fn builtin_quests() -> Vec<Quest> {
    use EventKind::*;
    use QuestCategory::{Main, Side};

    vec![
        Quest::new(
            "fragment-1",
            "Breadcrumbs",
            "Recover the first key fragment.",
            250,
            Main,
            vec![req(CtfProgress, Some("FRAGMENT_1"), 1)],
        ),
        Quest::new(
            "fragment-2",
            "Following the Trail",
            "Recover the second key fragment.",
            250,
            Main,
            vec![req(CtfProgress, Some("FRAGMENT_2"), 1)],
        ),
        Quest::new(
            "fragment-3",
            "Signal in the Noise",
            "Recover the third key fragment from the packet capture.",
            250,
            Main,
            vec![req(CtfProgress, Some("FRAGMENT_3"), 1)],
        ),
        Quest::new(
            "fragment-4",
            "Last Piece",
            "Recover the final key fragment.",
            300,
            Main,
            vec![req(CtfProgress, Some("FRAGMENT_4"), 1)],
        ),
        Quest::new(
            "root-access",
            "Root of Trust",
            "Assemble the fragments and take back administrator access.",
            1000,
            Main,
            vec![req(CtfProgress, Some("ROOT_ACCESS"), 1)],
        ),
        Quest::new(
            "shell-novice",
            "Shell Novice",
            "Run five different terminal commands.",
            100,
            Side,
            vec![req(TerminalCmd, None, 5)],
        ),
        Quest::new(
            "window-shopper",
            "Window Shopper",
            "Open three different apps.",
            50,
            Side,
            vec![req(AppOpen, None, 3)],
        ),
        Quest::new(
            "packet-sniffer",
            "Packet Sniffer",
            "Inspect three packets in the capture viewer.",
            100,
            Side,
            vec![req(PacketInspect, None, 3)],
        ),
        Quest::new(
            "log-diver",
            "Log Diver",
            "Read the authentication log.",
            75,
            Side,
            vec![req(FileRead, Some("/var/log/auth.log"), 1)],
        ),
        Quest::new(
            "bookworm",
            "Bookworm",
            "Read five different files.",
            100,
            Side,
            vec![req(FileRead, None, 5)],
        ),
        Quest::new(
            "detective",
            "Detective",
            "Uncover three story clues.",
            150,
            Side,
            vec![req(ClueFound, None, 3)],
        ),
    ]
}

/// The stock reward catalog.
pub fn builtin_rewards() -> Vec<Reward> {
    let reward = |id: &str, title: &str, description: &str, unlock_level, kind| Reward {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        unlock_level,
        kind,
        is_claimed: false,
    };
    vec![
        reward(
            "matrix-rain",
            "Matrix Rain",
            "Animated green-rain wallpaper.",
            2,
            RewardKind::Wallpaper,
        ),
        reward("amber-crt", "Amber CRT", "Amber phosphor terminal theme.", 3, RewardKind::Theme),
        reward(
            "incident-report",
            "Incident Report",
            "The full write-up of the breach, dropped into your home folder.",
            4,
            RewardKind::File,
        ),
        reward("root-badge", "Root Badge", "Proof you took the box back.", 5, RewardKind::Badge),
    ]
}
