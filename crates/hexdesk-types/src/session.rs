//! Who is at the keyboard: role and difficulty.
//!
//! Roles gate which apps may open and whether progression is tracked. The
//! "login" that selects a role is a demonstration, not a security boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HexError;

/// Identity the desktop was entered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Recruiter,
    Admin,
}

/// Game difficulty chosen at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

/// The active role/difficulty pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    pub difficulty: Difficulty,
}

impl Session {
    pub fn new(role: Role, difficulty: Difficulty) -> Self {
        Self { role, difficulty }
    }
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Recruiter => "recruiter",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "guest" => Ok(Self::Guest),
            "recruiter" => Ok(Self::Recruiter),
            "admin" | "root" | "administrator" => Ok(Self::Admin),
            other => Err(HexError::Config(format!("unknown role: {other}"))),
        }
    }
}

impl FromStr for Difficulty {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "hard" => Ok(Self::Hard),
            other => Err(HexError::Config(format!("unknown difficulty: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_easy_guest() {
        let s = Session::default();
        assert_eq!(s.role, Role::Guest);
        assert_eq!(s.difficulty, Difficulty::Easy);
    }

    #[test]
    fn role_parse_aliases() {
        assert_eq!("ROOT".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Recruiter".parse::<Role>().unwrap(), Role::Recruiter);
        assert!("hacker".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Recruiter).unwrap();
        assert_eq!(json, "\"recruiter\"");
    }
}
