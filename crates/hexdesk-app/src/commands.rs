//! `:`-prefixed console commands that act on the desktop directly.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use hexdesk_core::{ClaimOutcome, ClueSource, Desktop, OpenOutcome, Props, Side, Size};
use hexdesk_types::session::{Difficulty, Role, Session};

/// Result of a console command.
pub enum Reply {
    Text(String),
    Quit,
}

const HELP: &str = "\
:open <app> [key=value...]   open or focus an app
:close|:focus|:min|:max <app>
:move <app> <x> <y>          :resize <app> <w> <h>
:snap <app> left|right       :assist <app>  :assist-cancel
:viewport [<w> <h>]          :windows
:read <path>                 open a file in the viewer
:packet <id>                 inspect a captured packet
:clue <source> <trigger>     report a clue (terminal|wireshark|files|logs)
:ctf <milestone>             e.g. FRAGMENT_1
:quests  :rewards  :claim <id>  :ack  :story
:login <role> [easy|hard]    :reset  :quit";

pub fn run(desktop: &mut Desktop, line: &str) -> Result<Reply> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = tokens.split_first() else {
        return Ok(Reply::Text(HELP.to_string()));
    };

    let text = match name.to_ascii_lowercase().as_str() {
        "help" => HELP.to_string(),
        "quit" | "q" => return Ok(Reply::Quit),
        "open" => {
            let app = arg(args, 0, "app")?;
            let props = parse_props(&args[1..])?;
            match desktop.open_app(app, props) {
                Some(OpenOutcome::Created) => format!("opened {app}"),
                Some(OpenOutcome::Existing) => format!("focused {app}"),
                None => String::new(),
            }
        },
        "close" => flag(desktop.close_window(arg(args, 0, "app")?)),
        "focus" => flag(desktop.focus_window(arg(args, 0, "app")?)),
        "min" => flag(desktop.toggle_minimize(arg(args, 0, "app")?)),
        "max" => flag(desktop.toggle_maximize(arg(args, 0, "app")?)),
        "move" => {
            let app = arg(args, 0, "app")?;
            flag(desktop.move_window(app, number(args, 1, "x")?, number(args, 2, "y")?))
        },
        "resize" => {
            let app = arg(args, 0, "app")?;
            flag(desktop.resize_window(app, number(args, 1, "width")?, number(args, 2, "height")?))
        },
        "snap" => {
            let app = arg(args, 0, "app")?;
            let side = match arg(args, 1, "side")? {
                "left" => Side::Left,
                "right" => Side::Right,
                other => bail!("side must be left or right, not {other}"),
            };
            flag(desktop.snap_window(app, side))
        },
        "assist" => flag(desktop.select_snap_assist(arg(args, 0, "app")?)),
        "assist-cancel" => {
            desktop.cancel_snap_assist();
            String::new()
        },
        "viewport" if args.is_empty() => {
            let wm = desktop.window_manager();
            let viewport = wm.viewport();
            let layout = if wm.is_mobile() { "mobile" } else { "desktop" };
            format!("{}x{} ({layout})", viewport.width, viewport.height)
        },
        "viewport" => {
            desktop.set_viewport(Size::new(number(args, 0, "width")?, number(args, 1, "height")?));
            String::new()
        },
        "windows" => list_windows(desktop),
        "read" => desktop.open_file(arg(args, 0, "path")?)?,
        "packet" => {
            desktop.inspect_packet(arg(args, 0, "packet id")?);
            String::new()
        },
        "clue" => {
            let source: ClueSource = arg(args, 0, "source")?.parse()?;
            let trigger = arg(args, 1, "trigger")?;
            match desktop.discover_clue(trigger, source) {
                Some(_) => String::new(),
                None => "nothing new here".to_string(),
            }
        },
        "ctf" => {
            desktop.ctf_progress(arg(args, 0, "milestone")?);
            String::new()
        },
        "quests" => list_quests(desktop),
        "rewards" => list_rewards(desktop),
        "claim" => match desktop.claim_reward(arg(args, 0, "reward id")?) {
            ClaimOutcome::Claimed { .. } => String::new(),
            ClaimOutcome::AlreadyClaimed => "already claimed".to_string(),
            ClaimOutcome::Locked { unlock_level } => format!("unlocks at level {unlock_level}"),
            ClaimOutcome::Unknown => "no such reward".to_string(),
        },
        "ack" => match desktop.acknowledge_level_up() {
            Some(level) => format!("level {level} acknowledged"),
            None => "nothing to acknowledge".to_string(),
        },
        "story" => list_story(desktop),
        "login" => {
            let role: Role = arg(args, 0, "role")?.parse()?;
            let difficulty: Difficulty = match args.get(1) {
                Some(d) => d.parse()?,
                None => Difficulty::default(),
            };
            desktop.set_session(Session::new(role, difficulty));
            format!("logged in as {role} ({difficulty:?})")
        },
        "reset" => {
            desktop.reset_progress();
            String::new()
        },
        other => bail!("unknown console command :{other} (try :help)"),
    };
    Ok(Reply::Text(text))
}

fn arg<'a>(args: &[&'a str], index: usize, what: &str) -> Result<&'a str> {
    args.get(index).copied().with_context(|| format!("missing {what}"))
}

fn number(args: &[&str], index: usize, what: &str) -> Result<i32> {
    let raw = arg(args, index, what)?;
    raw.parse().with_context(|| format!("{what} must be a number, got {raw}"))
}

fn flag(done: bool) -> String {
    if done { String::new() } else { "no such window".to_string() }
}

/// `key=value` pairs into window props. Values that parse as JSON keep their
/// type; anything else is a string.
fn parse_props(pairs: &[&str]) -> Result<Option<Props>> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let mut props = Props::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected key=value, got {pair}");
        };
        let value =
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        props.insert(key.to_string(), value);
    }
    Ok(Some(props))
}

fn list_windows(desktop: &Desktop) -> String {
    let windows = desktop.windows();
    if windows.is_empty() {
        return "no open windows".to_string();
    }
    let active = desktop.active_window();
    windows
        .iter()
        .map(|w| {
            let mut flags = String::new();
            if Some(w.app_id.as_str()) == active {
                flags.push('*');
            }
            if w.is_minimized {
                flags.push('_');
            }
            if w.is_maximized {
                flags.push('^');
            }
            format!(
                "{:<14}{:<3} z={:<3} {}x{} at ({}, {})",
                w.app_id, flags, w.z_index, w.size.width, w.size.height, w.position.x, w.position.y
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn list_quests(desktop: &Desktop) -> String {
    let engine = desktop.quests();
    let (earned, span) = engine.level_progress();
    let mut lines = vec![format!(
        "level {} ({} xp, {earned}/{span} into level)",
        engine.level(),
        engine.xp()
    )];
    for quest in engine.quests() {
        let target = quest.requirements.first().map_or(1, |r| r.count);
        let mark = if quest.is_completed { "x" } else { " " };
        lines.push(format!(
            "[{mark}] {:<16} {:>2}/{:<2} {:>5} xp  {}",
            quest.id, quest.progress, target, quest.xp, quest.title
        ));
    }
    lines.join("\n")
}

fn list_rewards(desktop: &Desktop) -> String {
    desktop
        .quests()
        .rewards()
        .iter()
        .map(|r| {
            let state = if r.is_claimed { "claimed" } else { "" };
            format!("{:<16} level {}  {:<8} {state}", r.id, r.unlock_level, format!("{:?}", r.kind))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn list_story(desktop: &Desktop) -> String {
    let story = desktop.story();
    let current = story.current_chapter();
    let mut lines = Vec::new();
    for (chapter, progress) in story.chapters().iter().zip(story.progress()) {
        let state = if chapter.is_completed {
            "done"
        } else if chapter.is_unlocked {
            "open"
        } else {
            "locked"
        };
        let marker = if chapter.id == current { ">" } else { " " };
        lines.push(format!(
            "{marker} {}. {:<22} {state:<6} {}/{} clues",
            chapter.id, chapter.title, progress.discovered, progress.total
        ));
    }
    if story.is_campaign_complete() {
        lines.push("campaign complete".to_string());
    }
    lines.join("\n")
}
