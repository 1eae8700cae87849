//! Routing of progression events into the quest and narrative engines.

use hexdesk_quest::{EventKind, QuestEngine, TrackOutcome};
use hexdesk_story::{ClueSource, DiscoverOutcome, NarrativeEngine};
use hexdesk_terminal::ProgressSink;
use hexdesk_types::notice::Notice;
use hexdesk_types::session::Session;

/// Borrowed view over both engines for the duration of one operation.
///
/// Records which aggregates changed so the caller persists only those.
pub(crate) struct Progress<'a> {
    quests: &'a mut QuestEngine,
    story: &'a mut NarrativeEngine,
    session: Session,
    notices: &'a mut Vec<Notice>,
    quests_dirty: bool,
    story_dirty: bool,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(
        quests: &'a mut QuestEngine,
        story: &'a mut NarrativeEngine,
        session: Session,
        notices: &'a mut Vec<Notice>,
    ) -> Self {
        Self {
            quests,
            story,
            session,
            notices,
            quests_dirty: false,
            story_dirty: false,
        }
    }

    /// `(quests changed, narrative changed)`.
    pub(crate) fn dirty(&self) -> (bool, bool) {
        (self.quests_dirty, self.story_dirty)
    }

    pub(crate) fn track(&mut self, kind: EventKind, target: Option<&str>) -> TrackOutcome {
        let outcome = self.quests.track_event(&self.session, kind, target);
        self.quests_dirty |= outcome.changed();
        self.notices.extend(outcome.notices.iter().cloned());
        outcome
    }

    /// Discover a clue; a hit also counts as a `CLUE_FOUND` event.
    pub(crate) fn discover(
        &mut self,
        trigger: &str,
        source: ClueSource,
    ) -> Option<DiscoverOutcome> {
        let outcome = self.story.discover_clue(trigger, source)?;
        self.story_dirty = true;
        self.notices.extend(outcome.notices.iter().cloned());
        self.track(EventKind::ClueFound, Some(&outcome.clue_id));
        Some(outcome)
    }
}

impl ProgressSink for Progress<'_> {
    fn track_event(&mut self, kind: EventKind, target: Option<&str>) {
        self.track(kind, target);
    }

    fn discover_clue(&mut self, trigger: &str, source: ClueSource) {
        self.discover(trigger, source);
    }
}
