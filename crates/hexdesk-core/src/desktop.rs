//! The composition root.

use std::sync::Arc;

use hexdesk_quest::{
    ClaimOutcome, EventKind, PROGRESS_KEY, ProgressionState, QuestEngine, RewardKind, TrackOutcome,
};
use hexdesk_story::{ClueSource, DiscoverOutcome, NARRATIVE_KEY, NarrativeEngine, NarrativeState};
use hexdesk_terminal::{AiTicket, CommandOutput, Environment, Terminal};
use hexdesk_types::config::HexdeskConfig;
use hexdesk_types::error::{HexError, Result};
use hexdesk_types::notice::Notice;
use hexdesk_types::session::Session;
use hexdesk_types::store::{MemoryStore, StateStore, load_or_default, save_best_effort};
use hexdesk_vfs::{MemoryVfs, Vfs, seed_tree};
use hexdesk_wm::{
    AppRegistry, OpenOutcome, Props, Side, Size, StaticAppRegistry, Window, WindowManager,
};

use crate::progress::Progress;

/// App id of the terminal window. Closing it ends the terminal session.
const TERMINAL_APP: &str = "terminal";

/// Every core component plus the session and notice queue.
pub struct Desktop {
    session: Session,
    vfs: MemoryVfs,
    wm: WindowManager,
    quests: QuestEngine,
    story: NarrativeEngine,
    terminal: Terminal,
    store: Box<dyn StateStore>,
    notices: Vec<Notice>,
}

impl Desktop {
    /// Build a desktop, restoring any progression saved in `store`.
    pub fn new(
        config: HexdeskConfig,
        registry: Box<dyn AppRegistry>,
        store: Box<dyn StateStore>,
        session: Session,
    ) -> Result<Self> {
        let vfs = seed_tree(&config.vfs.home)?;
        let wm = WindowManager::new(config.windows.clone(), config.display.clone(), registry);

        let mut quests = QuestEngine::from_config(&config.progression);
        if let Some(saved) = load_or_default::<ProgressionState>(store.as_ref(), PROGRESS_KEY) {
            quests.restore(saved);
        }
        let mut story = NarrativeEngine::default();
        if let Some(saved) = load_or_default::<NarrativeState>(store.as_ref(), NARRATIVE_KEY) {
            story.restore(saved);
        }
        log::info!(
            "desktop ready: {} as {:?}/{:?}, level {}, chapter {}",
            config.vfs.home,
            session.role,
            session.difficulty,
            quests.level(),
            story.current_chapter()
        );

        Ok(Self {
            session,
            vfs,
            wm,
            quests,
            story,
            terminal: Terminal::new(),
            store,
            notices: Vec::new(),
        })
    }

    /// Stock app table, in-memory persistence, default session.
    pub fn with_defaults(config: HexdeskConfig) -> Result<Self> {
        Self::new(
            config,
            Box::new(StaticAppRegistry::builtin()),
            Box::new(MemoryStore::new()),
            Session::default(),
        )
    }

    // -- Read access --

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn vfs(&self) -> &MemoryVfs {
        &self.vfs
    }

    pub fn window_manager(&self) -> &WindowManager {
        &self.wm
    }

    pub fn windows(&self) -> Arc<Vec<Window>> {
        self.wm.windows()
    }

    pub fn active_window(&self) -> Option<&str> {
        self.wm.active_window()
    }

    pub fn quests(&self) -> &QuestEngine {
        &self.quests
    }

    pub fn story(&self) -> &NarrativeEngine {
        &self.story
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    /// Take every notice raised since the last drain, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Switch role or difficulty, as a login screen would.
    pub fn set_session(&mut self, session: Session) {
        log::info!("session changed to {:?}/{:?}", session.role, session.difficulty);
        self.session = session;
    }

    // -- Windows --

    /// Open or focus an app.
    ///
    /// Refusals are reported through the notice queue and leave the window
    /// list unchanged: a permission refusal as an error toast, the window cap
    /// as [`Notice::ResourceLimit`].
    pub fn open_app(&mut self, app_id: &str, props: Option<Props>) -> Option<OpenOutcome> {
        let outcome = match self.wm.open_app(app_id, props, self.session.role) {
            Ok(outcome) => outcome,
            Err(HexError::ResourceExhausted { limit }) => {
                self.notices.push(Notice::ResourceLimit { limit });
                return None;
            },
            Err(e @ HexError::PermissionDenied { .. }) => {
                self.notices.push(Notice::error("Access denied", e.to_string()));
                return None;
            },
            Err(e) => {
                log::warn!("open {app_id} failed: {e}");
                self.notices.push(Notice::error("Could not open app", e.to_string()));
                return None;
            },
        };
        if app_id == TERMINAL_APP && self.terminal.is_ended() {
            self.terminal = Terminal::new();
        }
        self.track_event(EventKind::AppOpen, Some(app_id));
        Some(outcome)
    }

    pub fn close_window(&mut self, app_id: &str) -> bool {
        let closed = self.wm.close_window(app_id);
        if closed && app_id == TERMINAL_APP {
            self.terminal.end_session();
        }
        closed
    }

    pub fn toggle_minimize(&mut self, app_id: &str) -> bool {
        self.wm.toggle_minimize(app_id)
    }

    pub fn toggle_maximize(&mut self, app_id: &str) -> bool {
        self.wm.toggle_maximize(app_id)
    }

    pub fn focus_window(&mut self, app_id: &str) -> bool {
        self.wm.focus_window(app_id)
    }

    pub fn move_window(&mut self, app_id: &str, x: i32, y: i32) -> bool {
        self.wm.move_window(app_id, x, y)
    }

    pub fn resize_window(&mut self, app_id: &str, width: i32, height: i32) -> bool {
        self.wm.resize_window(app_id, width, height)
    }

    pub fn snap_window(&mut self, app_id: &str, side: Side) -> bool {
        self.wm.snap_window(app_id, side)
    }

    pub fn select_snap_assist(&mut self, app_id: &str) -> bool {
        self.wm.select_snap_assist(app_id)
    }

    pub fn cancel_snap_assist(&mut self) {
        self.wm.cancel_snap_assist();
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.wm.set_viewport(viewport);
    }

    // -- Files --

    pub fn readdir(&self, path: &str) -> Result<Vec<String>> {
        self.vfs.readdir(path)
    }

    pub fn change_dir(&mut self, path: &str) -> Result<()> {
        self.vfs.change_dir(path)
    }

    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        self.vfs.mkdir(path)
    }

    pub fn touch(&mut self, path: &str, content: Option<&str>) -> Result<()> {
        self.vfs.touch(path, content)
    }

    /// Read a file on the user's behalf (file manager, log viewer). Counts as
    /// a `FILE_READ` and may reveal a clue.
    pub fn open_file(&mut self, path: &str) -> Result<String> {
        let content = self.vfs.read_file(path)?;
        let abs = self.vfs.resolve(path);
        let source = if abs.starts_with("/var/log/") {
            ClueSource::Logs
        } else {
            ClueSource::Files
        };
        self.with_progress(|p| {
            p.track(EventKind::FileRead, Some(&abs));
            p.discover(&abs, source);
        });
        Ok(content)
    }

    // -- Terminal --

    /// Run one terminal line against the desktop's file system.
    pub fn run_command(&mut self, line: &str) -> CommandOutput {
        let mut progress =
            Progress::new(&mut self.quests, &mut self.story, self.session, &mut self.notices);
        let mut env = Environment::new(&mut self.vfs, &mut progress, self.session);
        let output = self.terminal.execute(line, &mut env);
        let (quests_dirty, story_dirty) = progress.dirty();
        self.persist(quests_dirty, story_dirty);
        if output == CommandOutput::Exit {
            self.wm.close_window(TERMINAL_APP);
        }
        output
    }

    /// Hand an assistant answer to the terminal. See [`Terminal::complete_ai`].
    pub fn complete_ai(&mut self, ticket: AiTicket, answer: Result<String>) -> bool {
        self.terminal.complete_ai(ticket, answer)
    }

    pub fn history_prev(&mut self) -> Option<&str> {
        self.terminal.history_prev()
    }

    pub fn history_next(&mut self) -> Option<&str> {
        self.terminal.history_next()
    }

    // -- Progression --

    pub fn track_event(&mut self, kind: EventKind, target: Option<&str>) -> TrackOutcome {
        self.with_progress(|p| p.track(kind, target))
    }

    pub fn discover_clue(&mut self, trigger: &str, source: ClueSource) -> Option<DiscoverOutcome> {
        self.with_progress(|p| p.discover(trigger, source))
    }

    /// A packet was opened in the capture viewer.
    pub fn inspect_packet(&mut self, packet_id: &str) -> TrackOutcome {
        self.with_progress(|p| {
            let outcome = p.track(EventKind::PacketInspect, Some(packet_id));
            p.discover(packet_id, ClueSource::PacketCapture);
            outcome
        })
    }

    /// A capture-the-flag milestone was reached, e.g. `FRAGMENT_1`.
    pub fn ctf_progress(&mut self, milestone: &str) -> TrackOutcome {
        self.track_event(EventKind::CtfProgress, Some(milestone))
    }

    pub fn acknowledge_level_up(&mut self) -> Option<u32> {
        self.quests.acknowledge_level_up()
    }

    /// Claim a reward. File rewards are delivered into `~/rewards`.
    pub fn claim_reward(&mut self, reward_id: &str) -> ClaimOutcome {
        let outcome = self.quests.claim_reward(reward_id);
        if let ClaimOutcome::Claimed { kind, notice } = &outcome {
            if *kind == RewardKind::File {
                self.deliver_file_reward(reward_id);
            }
            self.notices.push(notice.clone());
            self.persist(true, false);
        }
        outcome
    }

    /// Return both engines to their initial state and persist that.
    pub fn reset_progress(&mut self) {
        self.quests.reset_progress();
        self.story.reset();
        self.persist(true, true);
        self.notices.push(Notice::info("Progress reset", "Quests and story start over."));
    }

    fn deliver_file_reward(&mut self, reward_id: &str) {
        let Some(reward) = self.quests.rewards().iter().find(|r| r.id == reward_id) else {
            return;
        };
        let dir = format!("{}/rewards", self.vfs.home());
        let path = format!("{dir}/{reward_id}.txt");
        let body = format!("{}\n\n{}\n", reward.title, reward.description);
        let written = self
            .vfs
            .mkdir_all(&dir)
            .and_then(|()| self.vfs.write_file(&path, &body));
        match written {
            Ok(()) => log::info!("reward file written to {path}"),
            Err(e) => log::warn!("could not deliver reward {reward_id}: {e}"),
        }
    }

    fn with_progress<T>(&mut self, f: impl FnOnce(&mut Progress<'_>) -> T) -> T {
        let mut progress =
            Progress::new(&mut self.quests, &mut self.story, self.session, &mut self.notices);
        let result = f(&mut progress);
        let (quests_dirty, story_dirty) = progress.dirty();
        self.persist(quests_dirty, story_dirty);
        result
    }

    fn persist(&mut self, quests: bool, story: bool) {
        if quests {
            save_best_effort(self.store.as_mut(), PROGRESS_KEY, self.quests.state());
        }
        if story {
            save_best_effort(self.store.as_mut(), NARRATIVE_KEY, self.story.state());
        }
    }
}
