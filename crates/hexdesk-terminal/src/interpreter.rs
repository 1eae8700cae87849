//! Line parsing, pipelines, and the terminal session state.

use std::collections::BTreeSet;

use hexdesk_quest::EventKind;
use hexdesk_story::ClueSource;
use hexdesk_types::error::{HexError, Result};
use hexdesk_types::session::Session;
use hexdesk_vfs::Vfs;

use crate::builtin::Builtin;
use crate::commands::{self, shell_error};
use crate::history::History;

/// Identifies one outstanding assistant request.
pub type AiTicket = u64;

/// Shown in place of an assistant answer when the request failed.
pub const AI_PLACEHOLDER: &str =
    "gemini: the assistant is unreachable right now. Try again in a moment.";

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Plain text lines.
    Text(String),
    /// Command produced no visible output.
    None,
    /// Signal to clear the transcript.
    Clear,
    /// Signal to the host to send `prompt` to the assistant and report back
    /// through [`Terminal::complete_ai`].
    AiRequest { ticket: AiTicket, prompt: String },
    /// The session was closed by `exit`.
    Exit,
}

/// Receiver for the progression side effects of commands.
pub trait ProgressSink {
    fn track_event(&mut self, kind: EventKind, target: Option<&str>);
    fn discover_clue(&mut self, trigger: &str, source: ClueSource);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn track_event(&mut self, _kind: EventKind, _target: Option<&str>) {}
    fn discover_clue(&mut self, _trigger: &str, _source: ClueSource) {}
}

/// Shared mutable environment passed to every command.
pub struct Environment<'a> {
    /// The virtual file system, including the working directory.
    pub vfs: &'a mut dyn Vfs,
    /// Where progression events go.
    pub events: &'a mut dyn ProgressSink,
    /// Who is typing.
    pub session: Session,
    /// Piped input from the previous pipeline stage.
    pub stdin: Option<String>,
    /// Set while the current stage's output feeds another stage.
    pub piped: bool,
}

impl<'a> Environment<'a> {
    pub fn new(vfs: &'a mut dyn Vfs, events: &'a mut dyn ProgressSink, session: Session) -> Self {
        Self {
            vfs,
            events,
            session,
            stdin: None,
            piped: false,
        }
    }
}

/// One interactive terminal session.
#[derive(Debug, Default)]
pub struct Terminal {
    transcript: Vec<String>,
    history: History,
    next_ticket: AiTicket,
    pending: BTreeSet<AiTicket>,
    ended: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_prev(&mut self) -> Option<&str> {
        self.history.older()
    }

    pub fn history_next(&mut self) -> Option<&str> {
        self.history.newer()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn pending_requests(&self) -> impl Iterator<Item = AiTicket> + '_ {
        self.pending.iter().copied()
    }

    /// The prompt shown before input, e.g. `guest@hexdesk:/tmp$`.
    pub fn prompt(env: &Environment<'_>) -> String {
        format!(
            "{}@{}:{}$",
            commands::user_name(env.session.role),
            commands::host_name(&*env.vfs),
            env.vfs.cwd()
        )
    }

    /// Run one input line and apply its output to the transcript.
    ///
    /// The prompt and line are echoed, then only the final pipeline stage's
    /// output is appended.
    pub fn execute(&mut self, line: &str, env: &mut Environment<'_>) -> CommandOutput {
        if self.ended {
            log::debug!("terminal: input after exit ignored");
            return CommandOutput::None;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return CommandOutput::None;
        }

        self.history.push(trimmed);
        let echo = format!("{} {trimmed}", Self::prompt(env));
        self.transcript.push(echo);

        let output = self.execute_pipeline(trimmed, env);
        env.stdin = None;

        match &output {
            CommandOutput::Text(text) => self.append(text),
            CommandOutput::Clear => self.transcript.clear(),
            CommandOutput::AiRequest { ticket, .. } => {
                self.pending.insert(*ticket);
                self.transcript.push("gemini: thinking...".to_string());
            },
            CommandOutput::Exit => {
                self.transcript.push("logout".to_string());
                self.end_session();
            },
            CommandOutput::None => {},
        }
        output
    }

    /// Execute `cmd1 | cmd2 | ...`, feeding each stage's text to the next.
    fn execute_pipeline(&mut self, line: &str, env: &mut Environment<'_>) -> CommandOutput {
        let stages: Vec<&str> = line.split('|').map(str::trim).collect();
        if stages.len() > 1 && stages.iter().any(|s| s.is_empty()) {
            return CommandOutput::Text("syntax error near unexpected token `|'".to_string());
        }

        let last = stages.len() - 1;
        let mut stdin = None;
        for (i, stage) in stages.iter().enumerate() {
            env.stdin = stdin.take();
            env.piped = i != last;
            let result = self.execute_stage(stage, env);
            env.piped = false;
            let output = match result {
                Ok(output) => output,
                Err(message) => return CommandOutput::Text(message),
            };
            if i == last {
                return output;
            }
            stdin = match output {
                CommandOutput::Text(text) => Some(text),
                _ => None,
            };
        }
        CommandOutput::None
    }

    /// Execute one pipeline stage. Errors come back already rendered.
    fn execute_stage(
        &mut self,
        stage: &str,
        env: &mut Environment<'_>,
    ) -> std::result::Result<CommandOutput, String> {
        let mut tokens = stage.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(CommandOutput::None);
        };
        let args: Vec<&str> = tokens.collect();
        let Some(builtin) = Builtin::parse(name) else {
            return Err(format!("{name}: command not found"));
        };

        env.events.track_event(EventKind::TerminalCmd, Some(builtin.name()));
        env.events.discover_clue(builtin.name(), ClueSource::Terminal);
        if !builtin.reads_stdin() {
            env.stdin = None;
        }

        self.dispatch(builtin, &args, env)
            .map_err(|e| shell_error(builtin.name(), &e))
    }

    fn dispatch(
        &mut self,
        builtin: Builtin,
        args: &[&str],
        env: &mut Environment<'_>,
    ) -> Result<CommandOutput> {
        match builtin {
            Builtin::Help => Ok(help_text()),
            Builtin::Ls => commands::ls(args, env),
            Builtin::Cd => commands::cd(args, env),
            Builtin::Pwd => Ok(commands::pwd(env)),
            Builtin::Cat => commands::cat(args, env),
            Builtin::Grep => commands::grep(args, env),
            Builtin::Head => commands::head(args, env),
            Builtin::Wc => commands::wc(args, env),
            Builtin::Mkdir => commands::mkdir(args, env),
            Builtin::Touch => commands::touch(args, env),
            Builtin::Echo => Ok(commands::echo(args)),
            Builtin::Clear => Ok(CommandOutput::Clear),
            Builtin::History => Ok(self.history_listing()),
            Builtin::Whoami => Ok(commands::whoami(env)),
            Builtin::Uname => Ok(commands::uname(args, env)),
            Builtin::Hostname => Ok(commands::hostname(env)),
            Builtin::Gemini => self.gemini(args),
            Builtin::Exit => Ok(CommandOutput::Exit),
        }
    }

    fn history_listing(&self) -> CommandOutput {
        let lines: Vec<String> = self
            .history
            .entries()
            .enumerate()
            .map(|(i, line)| format!("{:>4}  {line}", i + 1))
            .collect();
        CommandOutput::Text(lines.join("\n"))
    }

    fn gemini(&mut self, args: &[&str]) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(HexError::Command("usage: gemini <prompt>".to_string()));
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        log::debug!("terminal: assistant request {ticket} issued");
        Ok(CommandOutput::AiRequest {
            ticket,
            prompt: args.join(" "),
        })
    }

    /// Deliver the answer for `ticket`.
    ///
    /// Answers for unknown tickets, or arriving after the session ended, are
    /// dropped and `false` is returned. A failed request shows a placeholder.
    pub fn complete_ai(&mut self, ticket: AiTicket, answer: Result<String>) -> bool {
        if self.ended || !self.pending.remove(&ticket) {
            log::debug!("terminal: discarded assistant answer for ticket {ticket}");
            return false;
        }
        match answer {
            Ok(text) => self.append(&text),
            Err(e) => {
                log::warn!("assistant request {ticket} failed: {e}");
                self.transcript.push(AI_PLACEHOLDER.to_string());
            },
        }
        true
    }

    /// Tear the session down. Pending assistant requests are forgotten.
    pub fn end_session(&mut self) {
        self.ended = true;
        self.pending.clear();
    }

    fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.transcript.extend(text.lines().map(str::to_string));
    }
}

fn help_text() -> CommandOutput {
    let width = Builtin::ALL.iter().map(|b| b.usage().len()).max().unwrap_or(0);
    let mut lines = vec!["Available commands:".to_string()];
    lines.extend(
        Builtin::ALL
            .iter()
            .map(|b| format!("  {:<width$}  {}", b.usage(), b.description())),
    );
    CommandOutput::Text(lines.join("\n"))
}
