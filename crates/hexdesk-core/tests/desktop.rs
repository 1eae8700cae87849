//! End-to-end behaviour of the composed desktop.

use hexdesk_core::{ClaimOutcome, ClueSource, CommandOutput, Desktop, EventKind, Notice};
use hexdesk_quest::{PROGRESS_KEY, RewardKind};
use hexdesk_types::config::HexdeskConfig;
use hexdesk_types::notice::ToastKind;
use hexdesk_types::session::{Difficulty, Role, Session};
use hexdesk_types::store::{FileStore, MemoryStore, StateStore};
use hexdesk_wm::StaticAppRegistry;

fn hard_guest() -> Session {
    Session::new(Role::Guest, Difficulty::Hard)
}

fn desktop_with(store: Box<dyn StateStore>, session: Session) -> Desktop {
    Desktop::new(
        HexdeskConfig::default(),
        Box::new(StaticAppRegistry::builtin()),
        store,
        session,
    )
    .unwrap()
}

fn tracked_desktop() -> Desktop {
    desktop_with(Box::new(MemoryStore::new()), hard_guest())
}

fn quest_done(desktop: &Desktop, id: &str) -> bool {
    desktop
        .quests()
        .quests()
        .iter()
        .any(|q| q.id == id && q.is_completed)
}

#[test]
fn ctf_run_reaches_max_level_with_one_suppressed_signal() {
    let mut desktop = tracked_desktop();
    let signals: Vec<_> = ["FRAGMENT_1", "FRAGMENT_2", "FRAGMENT_3", "FRAGMENT_4", "ROOT_ACCESS"]
        .into_iter()
        .filter_map(|m| desktop.ctf_progress(m).level_up)
        .collect();

    assert_eq!(desktop.quests().xp(), 2050);
    assert_eq!(desktop.quests().level(), 5);
    let suppressed: Vec<u32> = signals.iter().filter(|s| s.suppressed).map(|s| s.level).collect();
    assert_eq!(suppressed, vec![5]);
    assert_eq!(signals.last().map(|s| s.level), Some(5));
    // Level 4 was never acknowledged, and reaching 5 clears it.
    assert_eq!(desktop.acknowledge_level_up(), None);

    let level_ups = desktop
        .drain_notices()
        .into_iter()
        .filter(|n| matches!(n, Notice::LevelUp { .. }))
        .count();
    assert_eq!(level_ups, 3);
}

#[test]
fn untracked_session_earns_nothing_but_story_advances() {
    let mut desktop = desktop_with(Box::new(MemoryStore::new()), Session::default());
    desktop.ctf_progress("FRAGMENT_1");
    assert_eq!(desktop.quests().xp(), 0);

    desktop.run_command("whoami");
    desktop.run_command("cat /etc/motd");
    assert_eq!(desktop.story().current_chapter(), 2);
    assert_eq!(desktop.quests().xp(), 0);
}

#[test]
fn opening_apps_counts_towards_quests() {
    let mut desktop = tracked_desktop();
    for app in ["terminal", "files", "resume"] {
        assert!(desktop.open_app(app, None).is_some());
    }
    desktop.open_app("terminal", None);
    assert!(quest_done(&desktop, "window-shopper"));
    assert_eq!(desktop.quests().xp(), 50);
    assert_eq!(desktop.active_window(), Some("terminal"));
}

#[test]
fn window_cap_raises_resource_limit_not_permission_error() {
    let mut desktop = tracked_desktop();
    for app in ["terminal", "files", "resume", "logs"] {
        desktop.open_app(app, None);
    }
    desktop.drain_notices();

    assert!(desktop.open_app("quests", None).is_none());
    assert_eq!(desktop.windows().len(), 4);
    let notices = desktop.drain_notices();
    assert_eq!(notices, vec![Notice::ResourceLimit { limit: 4 }]);
}

#[test]
fn denied_app_raises_error_toast() {
    let mut desktop = tracked_desktop();
    assert!(desktop.open_app("admin-console", None).is_none());
    assert!(desktop.windows().is_empty());
    let notices = desktop.drain_notices();
    assert!(matches!(
        notices.as_slice(),
        [Notice::Toast { kind: ToastKind::Error, .. }]
    ));

    desktop.set_session(Session::new(Role::Admin, Difficulty::Hard));
    assert!(desktop.open_app("admin-console", None).is_some());
}

#[test]
fn terminal_clues_complete_first_chapter() {
    let mut desktop = tracked_desktop();
    desktop.run_command("whoami");
    desktop.run_command("cat /etc/motd");

    let story = desktop.story();
    assert!(story.chapters()[0].is_completed);
    assert_eq!(story.current_chapter(), 2);
    let found = &desktop.quests().state().history[&EventKind::ClueFound];
    assert!(found.contains("who-am-i"));
    assert!(found.contains("motd"));
}

#[test]
fn locked_chapter_clue_waits_for_its_turn() {
    let mut desktop = tracked_desktop();
    desktop.run_command("cat /var/log/auth.log");
    assert!(quest_done(&desktop, "log-diver"));
    assert!(desktop.story().clues().iter().all(|c| c.id != "failed-logins" || !c.discovered));

    desktop.discover_clue("whoami", ClueSource::Terminal);
    desktop.discover_clue("/etc/motd", ClueSource::Files);
    let found = desktop.open_file("/var/log/auth.log").unwrap();
    assert!(found.contains("Accepted password"));
    assert!(desktop.story().clues().iter().any(|c| c.id == "failed-logins" && c.discovered));
}

#[test]
fn packet_inspection_feeds_quest_and_story() {
    let mut desktop = tracked_desktop();
    for packet in ["arp-1", "tcp-syn-7", "beacon-10.0.13.37"] {
        desktop.inspect_packet(packet);
    }
    assert!(quest_done(&desktop, "packet-sniffer"));
    // Beacon belongs to chapter 2, still locked.
    assert!(desktop.story().clues().iter().all(|c| !c.discovered));
}

#[test]
fn progress_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        let mut desktop = desktop_with(Box::new(store), hard_guest());
        desktop.ctf_progress("FRAGMENT_1");
        desktop.run_command("whoami");
    }
    let store = FileStore::open(dir.path()).unwrap();
    let desktop = desktop_with(Box::new(store), hard_guest());
    assert_eq!(desktop.quests().xp(), 250);
    assert_eq!(desktop.quests().level(), 2);
    assert!(desktop.story().clues().iter().any(|c| c.id == "who-am-i" && c.discovered));
}

#[test]
fn unreadable_saved_state_falls_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.save(PROGRESS_KEY, "{not json").unwrap();
    let desktop = desktop_with(Box::new(store), hard_guest());
    assert_eq!(desktop.quests().xp(), 0);
    assert_eq!(desktop.quests().level(), 1);
}

#[test]
fn reset_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        let mut desktop = desktop_with(Box::new(store), hard_guest());
        desktop.ctf_progress("FRAGMENT_1");
        desktop.run_command("whoami");
        desktop.reset_progress();
        assert_eq!(desktop.quests().xp(), 0);
        assert_eq!(desktop.story().current_chapter(), 1);
    }
    let store = FileStore::open(dir.path()).unwrap();
    let desktop = desktop_with(Box::new(store), hard_guest());
    assert_eq!(desktop.quests().xp(), 0);
    assert!(desktop.story().clues().iter().all(|c| !c.discovered));
}

#[test]
fn file_reward_lands_in_home() {
    let mut desktop = tracked_desktop();
    assert!(matches!(
        desktop.claim_reward("incident-report"),
        ClaimOutcome::Locked { unlock_level: 4 }
    ));
    for m in ["FRAGMENT_1", "FRAGMENT_2", "FRAGMENT_3"] {
        desktop.ctf_progress(m);
    }
    assert!(matches!(
        desktop.claim_reward("incident-report"),
        ClaimOutcome::Claimed { kind: RewardKind::File, .. }
    ));
    use hexdesk_vfs::Vfs;
    let body = desktop.vfs().read_file("~/rewards/incident-report.txt").unwrap();
    assert!(!body.is_empty());
    assert_eq!(desktop.claim_reward("incident-report"), ClaimOutcome::AlreadyClaimed);
}

#[test]
fn closing_terminal_drops_pending_answer() {
    let mut desktop = tracked_desktop();
    desktop.open_app("terminal", None);
    let CommandOutput::AiRequest { ticket, .. } = desktop.run_command("gemini who is ghost") else {
        panic!("expected an assistant request");
    };
    assert!(desktop.close_window("terminal"));
    assert!(!desktop.complete_ai(ticket, Ok("late answer".to_string())));

    desktop.open_app("terminal", None);
    assert!(desktop.terminal().transcript().is_empty());
    assert!(!desktop.terminal().is_ended());
}

#[test]
fn exit_closes_terminal_window() {
    let mut desktop = tracked_desktop();
    desktop.open_app("terminal", None);
    assert_eq!(desktop.run_command("exit"), CommandOutput::Exit);
    assert!(desktop.windows().is_empty());
}

#[test]
fn history_recall_through_desktop() {
    let mut desktop = tracked_desktop();
    desktop.run_command("ls");
    desktop.run_command("pwd");
    assert_eq!(desktop.history_prev(), Some("pwd"));
    assert_eq!(desktop.history_prev(), Some("ls"));
    assert_eq!(desktop.history_next(), Some("pwd"));
}
