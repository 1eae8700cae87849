//! Handlers for the file and text builtins.
//!
//! Each handler takes its positional arguments and the shared environment
//! and returns the produced output. Errors are rendered by the caller.

use hexdesk_quest::EventKind;
use hexdesk_story::ClueSource;
use hexdesk_types::error::{HexError, Result};
use hexdesk_types::session::Role;
use hexdesk_vfs::{NodeKind, Vfs};

use crate::interpreter::{CommandOutput, Environment};

const DEFAULT_HEAD_LINES: usize = 10;
const FALLBACK_HOSTNAME: &str = "hexdesk";

/// Render an error the way a shell would, prefixed by the command name.
pub fn shell_error(cmd: &str, err: &HexError) -> String {
    match err {
        HexError::NotFound(p) => format!("{cmd}: {p}: No such file or directory"),
        HexError::NotADirectory(p) => format!("{cmd}: {p}: Not a directory"),
        HexError::IsADirectory(p) => format!("{cmd}: {p}: Is a directory"),
        HexError::AlreadyExists(p) => format!("{cmd}: {p}: File exists"),
        HexError::Command(msg) => format!("{cmd}: {msg}"),
        other => format!("{cmd}: {other}"),
    }
}

fn usage(text: &str) -> HexError {
    HexError::Command(format!("usage: {text}"))
}

/// File content without its final newline, so output lines stay tight.
fn trim_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Text from `file` if given, else the piped input.
fn read_input(cmd: &str, file: Option<&str>, env: &mut Environment<'_>) -> Result<String> {
    match file {
        Some(path) => env.vfs.read_file(path),
        None => env
            .stdin
            .take()
            .ok_or_else(|| HexError::Command(format!("missing file operand (try '{cmd} <file>')"))),
    }
}

/// User name shown for a role.
pub fn user_name(role: Role) -> &'static str {
    match role {
        Role::Guest => "guest",
        Role::Recruiter => "recruiter",
        Role::Admin => "root",
    }
}

pub fn host_name(vfs: &dyn Vfs) -> String {
    vfs.read_file("/etc/hostname")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string())
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

pub fn ls(args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
    let show_hidden = args.iter().any(|a| *a == "-a" || *a == "-la" || *a == "-al");
    let path = args.iter().find(|a| !a.starts_with('-')).copied().unwrap_or("");
    let mut names = env.vfs.readdir(path)?;
    if env.vfs.kind(path) == Some(NodeKind::File) {
        return Ok(CommandOutput::Text(names.join(separator(env))));
    }
    names.retain(|n| show_hidden || !n.starts_with('.'));
    names.sort();
    let dir = env.vfs.resolve(path);
    let listed: Vec<String> = names
        .into_iter()
        .map(|name| {
            let child = if dir == "/" { format!("/{name}") } else { format!("{dir}/{name}") };
            match env.vfs.kind(&child) {
                Some(NodeKind::Folder) => format!("{name}/"),
                _ => name,
            }
        })
        .collect();
    Ok(CommandOutput::Text(listed.join(separator(env))))
}

/// Columns for the screen, one entry per line for the next stage.
fn separator(env: &Environment<'_>) -> &'static str {
    if env.piped { "\n" } else { "  " }
}

pub fn cd(args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
    env.vfs.change_dir(args.first().copied().unwrap_or("~"))?;
    Ok(CommandOutput::None)
}

pub fn pwd(env: &Environment<'_>) -> CommandOutput {
    CommandOutput::Text(env.vfs.cwd().to_string())
}

pub fn mkdir(args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
    if args.is_empty() {
        return Err(usage("mkdir <path>"));
    }
    for path in args {
        env.vfs.mkdir(path)?;
    }
    Ok(CommandOutput::None)
}

pub fn touch(args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
    if args.is_empty() {
        return Err(usage("touch <path>"));
    }
    for path in args {
        env.vfs.touch(path, None)?;
    }
    Ok(CommandOutput::None)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Print files, reporting each successful read as progress.
pub fn cat(args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
    if args.is_empty() {
        let text = read_input("cat", None, env)?;
        return Ok(CommandOutput::Text(text));
    }
    let mut out = Vec::with_capacity(args.len());
    for path in args {
        let content = match env.vfs.read_file(path) {
            Ok(c) => c,
            // A lone file reports its failure directly.
            Err(e) if args.len() == 1 => return Err(e),
            Err(e) => {
                out.push(shell_error("cat", &e));
                continue;
            },
        };
        let abs = env.vfs.resolve(path);
        env.events.track_event(EventKind::FileRead, Some(&abs));
        let source = if abs.starts_with("/var/log/") {
            ClueSource::Logs
        } else {
            ClueSource::Files
        };
        env.events.discover_clue(&abs, source);
        out.push(trim_trailing_newline(content));
    }
    Ok(CommandOutput::Text(out.join("\n")))
}

pub fn grep(args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
    let ignore_case = args.contains(&"-i");
    let mut positional = args.iter().filter(|a| !a.starts_with('-'));
    let pattern = positional
        .next()
        .ok_or_else(|| usage("grep [-i] <pattern> [file]"))?;
    let text = read_input("grep", positional.next().copied(), env)?;

    let needle = if ignore_case { pattern.to_lowercase() } else { pattern.to_string() };
    let matched: Vec<&str> = text
        .lines()
        .filter(|line| {
            if ignore_case {
                line.to_lowercase().contains(&needle)
            } else {
                line.contains(&needle)
            }
        })
        .collect();
    Ok(CommandOutput::Text(matched.join("\n")))
}

pub fn head(args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
    let mut count = DEFAULT_HEAD_LINES;
    let mut file = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "-n" {
            let n = iter.next().ok_or_else(|| usage("head [-n N] [file]"))?;
            count = parse_count(n)?;
        } else if let Some(n) = arg.strip_prefix('-') {
            count = parse_count(n)?;
        } else {
            file = Some(*arg);
        }
    }
    let text = read_input("head", file, env)?;
    let lines: Vec<&str> = text.lines().take(count).collect();
    Ok(CommandOutput::Text(lines.join("\n")))
}

fn parse_count(n: &str) -> Result<usize> {
    n.parse()
        .map_err(|_| HexError::Command(format!("invalid number of lines: '{n}'")))
}

pub fn wc(args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
    let file = args.first().copied();
    let text = read_input("wc", file, env)?;
    let lines = text.lines().count();
    let words = text.split_whitespace().count();
    let bytes = text.len();
    let counts = format!("{lines} {words} {bytes}");
    Ok(CommandOutput::Text(match file {
        Some(f) => format!("{counts} {f}"),
        None => counts,
    }))
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

pub fn echo(args: &[&str]) -> CommandOutput {
    CommandOutput::Text(args.join(" "))
}

pub fn whoami(env: &Environment<'_>) -> CommandOutput {
    CommandOutput::Text(user_name(env.session.role).to_string())
}

pub fn hostname(env: &Environment<'_>) -> CommandOutput {
    CommandOutput::Text(host_name(&*env.vfs))
}

pub fn uname(args: &[&str], env: &Environment<'_>) -> CommandOutput {
    if args.contains(&"-a") {
        let host = host_name(&*env.vfs);
        CommandOutput::Text(format!("HexdeskOS {host} 6.1.0-hexdesk x86_64 GNU/Linux"))
    } else {
        CommandOutput::Text("HexdeskOS".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_error_formats() {
        assert_eq!(
            shell_error("cat", &HexError::NotFound("/x".into())),
            "cat: /x: No such file or directory"
        );
        assert_eq!(
            shell_error("cd", &HexError::NotADirectory("/etc/motd".into())),
            "cd: /etc/motd: Not a directory"
        );
        assert_eq!(shell_error("head", &usage("head")), "head: usage: head");
    }

    #[test]
    fn admin_is_root() {
        assert_eq!(user_name(Role::Admin), "root");
        assert_eq!(user_name(Role::Guest), "guest");
    }

    #[test]
    fn trailing_newline_trimmed_once() {
        assert_eq!(trim_trailing_newline("a\n\n".to_string()), "a\n");
        assert_eq!(trim_trailing_newline("a".to_string()), "a");
    }
}
