//! Gameplay event kinds.

use std::fmt;
use std::str::FromStr;

use hexdesk_types::error::HexError;
use serde::{Deserialize, Serialize};

/// A discrete user action the engine can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A terminal command ran. Target: command name.
    TerminalCmd,
    /// An app window opened. Target: app id.
    AppOpen,
    /// A packet was inspected in the capture viewer. Target: packet id.
    PacketInspect,
    /// A file was read. Target: absolute path.
    FileRead,
    /// A capture-the-flag milestone. Target: milestone name.
    CtfProgress,
    /// A narrative clue was discovered. Target: clue id.
    ClueFound,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        Self::TerminalCmd,
        Self::AppOpen,
        Self::PacketInspect,
        Self::FileRead,
        Self::CtfProgress,
        Self::ClueFound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TerminalCmd => "TERMINAL_CMD",
            Self::AppOpen => "APP_OPEN",
            Self::PacketInspect => "PACKET_INSPECT",
            Self::FileRead => "FILE_READ",
            Self::CtfProgress => "CTF_PROGRESS",
            Self::ClueFound => "CLUE_FOUND",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| HexError::Command(format!("unknown event type: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_display() {
        for kind in EventKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("ctf_progress".parse::<EventKind>().unwrap(), EventKind::CtfProgress);
        assert!("SOMETHING".parse::<EventKind>().is_err());
    }
}
