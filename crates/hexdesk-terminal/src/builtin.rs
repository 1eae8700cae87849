//! The fixed command set.

/// Every command the terminal understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Help,
    Ls,
    Cd,
    Pwd,
    Cat,
    Grep,
    Head,
    Wc,
    Mkdir,
    Touch,
    Echo,
    Clear,
    History,
    Whoami,
    Uname,
    Hostname,
    Gemini,
    Exit,
}

impl Builtin {
    pub const ALL: [Builtin; 18] = [
        Self::Help,
        Self::Ls,
        Self::Cd,
        Self::Pwd,
        Self::Cat,
        Self::Grep,
        Self::Head,
        Self::Wc,
        Self::Mkdir,
        Self::Touch,
        Self::Echo,
        Self::Clear,
        Self::History,
        Self::Whoami,
        Self::Uname,
        Self::Hostname,
        Self::Gemini,
        Self::Exit,
    ];

    /// Look up a command by name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|b| b.name() == lower)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Ls => "ls",
            Self::Cd => "cd",
            Self::Pwd => "pwd",
            Self::Cat => "cat",
            Self::Grep => "grep",
            Self::Head => "head",
            Self::Wc => "wc",
            Self::Mkdir => "mkdir",
            Self::Touch => "touch",
            Self::Echo => "echo",
            Self::Clear => "clear",
            Self::History => "history",
            Self::Whoami => "whoami",
            Self::Uname => "uname",
            Self::Hostname => "hostname",
            Self::Gemini => "gemini",
            Self::Exit => "exit",
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Ls => "ls [-a] [path]",
            Self::Cd => "cd [path]",
            Self::Pwd => "pwd",
            Self::Cat => "cat <file>...",
            Self::Grep => "grep [-i] <pattern> [file]",
            Self::Head => "head [-n N] [file]",
            Self::Wc => "wc [file]",
            Self::Mkdir => "mkdir <path>",
            Self::Touch => "touch <path>",
            Self::Echo => "echo [text]",
            Self::Clear => "clear",
            Self::History => "history",
            Self::Whoami => "whoami",
            Self::Uname => "uname [-a]",
            Self::Hostname => "hostname",
            Self::Gemini => "gemini <prompt>",
            Self::Exit => "exit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Help => "List available commands",
            Self::Ls => "List directory contents",
            Self::Cd => "Change the working directory",
            Self::Pwd => "Print the working directory",
            Self::Cat => "Print file contents",
            Self::Grep => "Print lines matching a pattern",
            Self::Head => "Print the first lines of input",
            Self::Wc => "Count lines, words and bytes",
            Self::Mkdir => "Create a directory",
            Self::Touch => "Create an empty file",
            Self::Echo => "Print arguments",
            Self::Clear => "Clear the screen",
            Self::History => "Show command history",
            Self::Whoami => "Print the current user",
            Self::Uname => "Print system information",
            Self::Hostname => "Print the machine name",
            Self::Gemini => "Ask the assistant",
            Self::Exit => "Close the terminal session",
        }
    }

    /// Commands that read piped input when given no file argument.
    pub fn reads_stdin(self) -> bool {
        matches!(self, Self::Cat | Self::Grep | Self::Head | Self::Wc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_case() {
        assert_eq!(Builtin::parse("LS"), Some(Builtin::Ls));
        assert_eq!(Builtin::parse("Gemini"), Some(Builtin::Gemini));
        assert_eq!(Builtin::parse("rm"), None);
    }

    #[test]
    fn names_roundtrip() {
        for b in Builtin::ALL {
            assert_eq!(Builtin::parse(b.name()), Some(b));
        }
    }
}
