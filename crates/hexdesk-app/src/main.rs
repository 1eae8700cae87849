//! hexdesk console entry point.
//!
//! Reads lines from stdin. Lines starting with `:` drive the desktop (open
//! windows, inspect packets, claim rewards); everything else is typed into
//! the terminal. Notices raised by the core are printed after each line.

mod commands;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use commands::Reply;
use hexdesk_core::{CommandOutput, Desktop, Notice};
use hexdesk_types::config::HexdeskConfig;
use hexdesk_types::error::HexError;
use hexdesk_types::session::Session;
use hexdesk_types::store::{FileStore, MemoryStore, StateStore};
use hexdesk_wm::StaticAppRegistry;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Config path from CLI arg or HEXDESK_CONFIG; defaults otherwise.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HEXDESK_CONFIG").ok())
        .map(PathBuf::from);
    let config = match &config_path {
        Some(path) => HexdeskConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => HexdeskConfig::default(),
    };
    log::info!(
        "Starting hexdesk ({}x{}, home {})",
        config.display.width,
        config.display.height,
        config.vfs.home
    );

    let store: Box<dyn StateStore> = match &config.storage.dir {
        Some(dir) => Box::new(FileStore::open(dir).context("opening state directory")?),
        None => {
            log::info!("no storage dir configured, progress lasts for this run only");
            Box::new(MemoryStore::new())
        },
    };

    let mut desktop = Desktop::new(
        config,
        Box::new(StaticAppRegistry::builtin()),
        store,
        Session::default(),
    )?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print_prompt(&mut stdout)?;
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let keep_going = match line.strip_prefix(':') {
            Some(command) => match commands::run(&mut desktop, command) {
                Ok(Reply::Text(text)) => {
                    if !text.is_empty() {
                        writeln!(stdout, "{text}")?;
                    }
                    true
                },
                Ok(Reply::Quit) => false,
                Err(e) => {
                    writeln!(stdout, "error: {e:#}")?;
                    true
                },
            },
            None => run_terminal_line(&mut desktop, &line, &mut stdout)?,
        };
        print_notices(&mut desktop, &mut stdout)?;
        if !keep_going {
            break;
        }
        print_prompt(&mut stdout)?;
    }

    log::info!("hexdesk shutting down");
    Ok(())
}

/// Feed one line to the terminal and print what it appended. Returns `false`
/// once the session has exited.
fn run_terminal_line(desktop: &mut Desktop, line: &str, out: &mut impl Write) -> Result<bool> {
    let before = desktop.terminal().transcript().len();
    let output = desktop.run_command(line);
    match output {
        CommandOutput::Clear | CommandOutput::None => {},
        CommandOutput::AiRequest { ticket, ref prompt } => {
            let answer = ask_assistant(prompt);
            let mark = desktop.terminal().transcript().len();
            desktop.complete_ai(ticket, answer);
            print_since(desktop, mark, out)?;
        },
        CommandOutput::Text(_) | CommandOutput::Exit => {
            // Skip the echoed prompt line.
            print_since(desktop, before + 1, out)?;
        },
    }
    Ok(output != CommandOutput::Exit)
}

/// The console build has no network access; every request fails and the
/// terminal shows its placeholder.
fn ask_assistant(prompt: &str) -> hexdesk_types::error::Result<String> {
    log::debug!("assistant prompt: {prompt}");
    Err(HexError::External("no assistant available offline".to_string()))
}

fn print_since(desktop: &Desktop, from: usize, out: &mut impl Write) -> Result<()> {
    for line in desktop.terminal().transcript().iter().skip(from) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn print_notices(desktop: &mut Desktop, out: &mut impl Write) -> Result<()> {
    for notice in desktop.drain_notices() {
        match notice {
            Notice::Toast { kind, title, message } => {
                writeln!(out, "[{kind:?}] {title}: {message}")?;
            },
            Notice::ResourceLimit { limit } => {
                writeln!(
                    out,
                    "[!] Too many windows. Close one of the {limit} open windows first."
                )?;
            },
            Notice::LevelUp { level, .. } => {
                writeln!(out, "*** LEVEL UP: you reached level {level} (:ack to dismiss) ***")?;
            },
        }
    }
    Ok(())
}

fn print_prompt(out: &mut impl Write) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}
