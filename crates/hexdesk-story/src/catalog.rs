//! Chapters and clues of the stock campaign.

use std::fmt;
use std::str::FromStr;

use hexdesk_types::error::{HexError, Result};
use serde::{Deserialize, Serialize};

/// Where a clue is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueSource {
    Terminal,
    #[serde(rename = "wireshark")]
    PacketCapture,
    Files,
    Logs,
}

impl ClueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::PacketCapture => "wireshark",
            Self::Files => "files",
            Self::Logs => "logs",
        }
    }
}

impl fmt::Display for ClueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClueSource {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "terminal" => Ok(Self::Terminal),
            "wireshark" | "packet-capture" | "packets" => Ok(Self::PacketCapture),
            "files" => Ok(Self::Files),
            "logs" => Ok(Self::Logs),
            other => Err(HexError::Command(format!("unknown clue source: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: String,
    pub chapter: u32,
    pub title: String,
    pub description: String,
    pub source: ClueSource,
    /// Matched verbatim against the trigger reported by the source.
    pub trigger: String,
    pub discovered: bool,
    pub narrative_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub is_unlocked: bool,
    pub is_completed: bool,
}

pub fn builtin_chapters() -> Vec<Chapter> {
    let chapter = |id: u32, title: &str, description: &str| Chapter {
        id,
        title: title.to_string(),
        description: description.to_string(),
        is_unlocked: id == 1,
        is_completed: false,
    };
    vec![
        chapter(1, "Fresh Login", "Get your bearings on an unfamiliar workstation."),
        chapter(2, "Footprints", "Someone else has been here. Find out who."),
        chapter(3, "The Leak", "Data is leaving the building on a schedule."),
        chapter(4, "Ghost in the Machine", "Trace the implant to its source."),
    ]
}

fn clue(
    id: &str,
    chapter: u32,
    source: ClueSource,
    trigger: &str,
    title: &str,
    text: &str,
) -> Clue {
    Clue {
        id: id.to_string(),
        chapter,
        title: title.to_string(),
        description: format!("Found via {source}."),
        source,
        trigger: trigger.to_string(),
        discovered: false,
        narrative_text: text.to_string(),
    }
}

pub fn builtin_clues() -> Vec<Clue> {
    use ClueSource::*;
    vec![
        clue(
            "who-am-i",
            1,
            Terminal,
            "whoami",
            "Borrowed Identity",
            "The account is 'guest', but the home folder has been lived in.",
        ),
        clue(
            "motd",
            1,
            Files,
            "/etc/motd",
            "Welcome Banner",
            "The banner mentions a maintenance window that never ended.",
        ),
        clue(
            "failed-logins",
            2,
            Logs,
            "/var/log/auth.log",
            "Failed Logins",
            "A burst of failed logins for 'admin', then one success from 10.0.13.37.",
        ),
        clue(
            "beacon",
            2,
            PacketCapture,
            "beacon-10.0.13.37",
            "Heartbeat",
            "Every sixty seconds the workstation pings 10.0.13.37.",
        ),
        clue(
            "shell-history",
            2,
            Files,
            "/home/guest/.bash_history",
            "Careless Typing",
            "Someone ran commands as guest and forgot to clear the history.",
        ),
        clue(
            "dns-exfil",
            3,
            PacketCapture,
            "dns-exfil",
            "Long Queries",
            "DNS lookups with base64 subdomains. Something is talking.",
        ),
        clue(
            "backup-cron",
            3,
            Files,
            "/etc/cron.d/backup",
            "Nightly Backup",
            "The backup job uploads to a host nobody recognises.",
        ),
        clue(
            "history-cmd",
            3,
            Terminal,
            "history",
            "Retracing Steps",
            "Your own history lines up with the intruder's timeline.",
        ),
        clue(
            "manifest",
            4,
            Files,
            "/opt/ghost/manifest.txt",
            "The Manifest",
            "A list of every file the implant has shipped out.",
        ),
        clue(
            "kernel-taint",
            4,
            Logs,
            "/var/log/kern.log",
            "Tainted Kernel",
            "An unsigned module named 'ghost' loaded at boot.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_chapter_has_clues() {
        let clues = builtin_clues();
        for chapter in builtin_chapters() {
            assert!(clues.iter().any(|c| c.chapter == chapter.id), "chapter {}", chapter.id);
        }
    }

    #[test]
    fn only_first_chapter_starts_unlocked() {
        let unlocked: Vec<u32> = builtin_chapters()
            .iter()
            .filter(|c| c.is_unlocked)
            .map(|c| c.id)
            .collect();
        assert_eq!(unlocked, vec![1]);
    }

    #[test]
    fn clue_ids_are_unique() {
        let clues = builtin_clues();
        let ids: HashSet<&str> = clues.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), clues.len());
    }

    #[test]
    fn packet_capture_serializes_as_wireshark() {
        let json = serde_json::to_string(&ClueSource::PacketCapture).unwrap();
        assert_eq!(json, "\"wireshark\"");
        assert_eq!("Wireshark".parse::<ClueSource>().unwrap(), ClueSource::PacketCapture);
        assert!("radio".parse::<ClueSource>().is_err());
    }
}
