//! Clue discovery and chapter gating.

use hexdesk_types::notice::Notice;
use serde::{Deserialize, Serialize};

use crate::catalog::{Chapter, Clue, ClueSource, builtin_chapters, builtin_clues};

/// The persisted narrative aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeState {
    pub chapters: Vec<Chapter>,
    pub clues: Vec<Clue>,
}

impl Default for NarrativeState {
    fn default() -> Self {
        Self {
            chapters: builtin_chapters(),
            clues: builtin_clues(),
        }
    }
}

/// What a successful discovery changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverOutcome {
    pub clue_id: String,
    pub chapter: u32,
    /// Set when this clue finished its chapter.
    pub chapter_completed: bool,
    /// The chapter unlocked by completing this one, if any.
    pub unlocked: Option<u32>,
    pub campaign_complete: bool,
    pub notices: Vec<Notice>,
}

/// Discovered versus total clues for one chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterProgress {
    pub chapter: u32,
    pub discovered: usize,
    pub total: usize,
}

pub struct NarrativeEngine {
    state: NarrativeState,
    initial: NarrativeState,
}

impl NarrativeEngine {
    pub fn new(initial: NarrativeState) -> Self {
        Self {
            state: initial.clone(),
            initial,
        }
    }

    pub fn restore(&mut self, state: NarrativeState) {
        self.state = state;
    }

    pub fn state(&self) -> &NarrativeState {
        &self.state
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.state.chapters
    }

    pub fn clues(&self) -> &[Clue] {
        &self.state.clues
    }

    /// Lowest unlocked chapter not yet completed. Once the campaign is done
    /// this is one past the last chapter id.
    pub fn current_chapter(&self) -> u32 {
        self.state
            .chapters
            .iter()
            .filter(|c| c.is_unlocked && !c.is_completed)
            .map(|c| c.id)
            .min()
            .unwrap_or_else(|| self.state.chapters.iter().map(|c| c.id).max().unwrap_or(0) + 1)
    }

    pub fn is_campaign_complete(&self) -> bool {
        self.state.chapters.iter().all(|c| c.is_completed)
    }

    pub fn progress(&self) -> Vec<ChapterProgress> {
        self.state
            .chapters
            .iter()
            .map(|chapter| {
                let clues = self.state.clues.iter().filter(|c| c.chapter == chapter.id);
                let (discovered, total) =
                    clues.fold((0, 0), |(d, t), c| (d + usize::from(c.discovered), t + 1));
                ChapterProgress {
                    chapter: chapter.id,
                    discovered,
                    total,
                }
            })
            .collect()
    }

    /// Discover the first open clue matching `trigger` and `source`.
    ///
    /// Clues from chapters past the current one stay hidden, so `None` covers
    /// unknown triggers, repeats and locked chapters alike.
    pub fn discover_clue(&mut self, trigger: &str, source: ClueSource) -> Option<DiscoverOutcome> {
        let current = self.current_chapter();
        let clue = self.state.clues.iter_mut().find(|c| {
            !c.discovered && c.source == source && c.trigger == trigger && c.chapter <= current
        })?;
        clue.discovered = true;
        let chapter = clue.chapter;
        let mut outcome = DiscoverOutcome {
            clue_id: clue.id.clone(),
            chapter,
            chapter_completed: false,
            unlocked: None,
            campaign_complete: false,
            notices: vec![Notice::info(
                format!("Clue found: {}", clue.title),
                clue.narrative_text.clone(),
            )],
        };
        log::debug!("clue discovered: {} (chapter {chapter})", outcome.clue_id);

        let chapter_done = self
            .state
            .clues
            .iter()
            .filter(|c| c.chapter == chapter)
            .all(|c| c.discovered);
        if !chapter_done {
            return Some(outcome);
        }
        self.complete_chapter(chapter, &mut outcome);
        Some(outcome)
    }

    fn complete_chapter(&mut self, id: u32, outcome: &mut DiscoverOutcome) {
        let Some(done) = self.state.chapters.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if done.is_completed {
            return;
        }
        done.is_completed = true;
        let done_title = done.title.clone();
        outcome.chapter_completed = true;
        log::info!("chapter {id} complete: {done_title}");

        match self.state.chapters.iter_mut().find(|c| c.id == id + 1) {
            Some(next) => {
                next.is_unlocked = true;
                outcome.unlocked = Some(next.id);
                outcome.notices.push(Notice::success(
                    format!("Chapter {id} complete"),
                    format!("Next: {}", next.title),
                ));
            },
            None => {
                outcome.campaign_complete = true;
                outcome.notices.push(Notice::success(
                    "Campaign complete",
                    format!("{done_title} was the final chapter. The ghost is out of the machine."),
                ));
            },
        }
    }

    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        log::info!("narrative reset");
    }
}

impl Default for NarrativeEngine {
    fn default() -> Self {
        Self::new(NarrativeState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discover_all(engine: &mut NarrativeEngine, chapter: u32) -> Vec<DiscoverOutcome> {
        let pending: Vec<(String, ClueSource)> = engine
            .clues()
            .iter()
            .filter(|c| c.chapter == chapter && !c.discovered)
            .map(|c| (c.trigger.clone(), c.source))
            .collect();
        pending
            .into_iter()
            .filter_map(|(trigger, source)| engine.discover_clue(&trigger, source))
            .collect()
    }

    #[test]
    fn starts_in_chapter_one() {
        assert_eq!(NarrativeEngine::default().current_chapter(), 1);
    }

    #[test]
    fn future_chapter_clue_is_not_discoverable() {
        let mut engine = NarrativeEngine::default();
        assert!(engine.discover_clue("/opt/ghost/manifest.txt", ClueSource::Files).is_none());
        let manifest = engine.clues().iter().find(|c| c.id == "manifest").unwrap();
        assert!(!manifest.discovered);
    }

    #[test]
    fn wrong_source_does_not_match() {
        let mut engine = NarrativeEngine::default();
        assert!(engine.discover_clue("whoami", ClueSource::Logs).is_none());
        assert!(engine.discover_clue("whoami", ClueSource::Terminal).is_some());
    }

    #[test]
    fn repeat_discovery_is_a_noop() {
        let mut engine = NarrativeEngine::default();
        assert!(engine.discover_clue("whoami", ClueSource::Terminal).is_some());
        assert!(engine.discover_clue("whoami", ClueSource::Terminal).is_none());
    }

    #[test]
    fn last_clue_completes_chapter_and_unlocks_next() {
        let mut engine = NarrativeEngine::default();
        let first = engine.discover_clue("whoami", ClueSource::Terminal).unwrap();
        assert!(!first.chapter_completed);
        let last = engine.discover_clue("/etc/motd", ClueSource::Files).unwrap();
        assert!(last.chapter_completed);
        assert_eq!(last.unlocked, Some(2));
        assert_eq!(last.notices.len(), 2);
        let Notice::Toast { title, message, .. } = &last.notices[1] else {
            panic!("expected a toast, got {:?}", last.notices[1]);
        };
        assert_eq!(title, "Chapter 1 complete");
        assert!(message.contains("Footprints"));
        assert!(engine.chapters()[0].is_completed);
        assert!(engine.chapters()[1].is_unlocked);
        assert_eq!(engine.current_chapter(), 2);
    }

    #[test]
    fn finishing_every_chapter_reports_sentinel() {
        let mut engine = NarrativeEngine::default();
        let mut last = None;
        for chapter in 1..=4 {
            last = discover_all(&mut engine, chapter).pop();
        }
        let last = last.unwrap();
        assert!(last.campaign_complete);
        assert_eq!(last.unlocked, None);
        let Some(Notice::Toast { title, message, .. }) = last.notices.last() else {
            panic!("expected a closing toast, got {:?}", last.notices);
        };
        assert_eq!(title, "Campaign complete");
        assert!(message.contains("Ghost in the Machine"));
        assert!(engine.is_campaign_complete());
        assert_eq!(engine.current_chapter(), 5);
    }

    #[test]
    fn completing_a_chapter_opens_its_clues() {
        let mut engine = NarrativeEngine::default();
        assert!(engine.discover_clue("/var/log/auth.log", ClueSource::Logs).is_none());
        discover_all(&mut engine, 1);
        assert!(engine.discover_clue("/var/log/auth.log", ClueSource::Logs).is_some());
        assert_eq!(engine.current_chapter(), 2);
    }

    #[test]
    fn progress_counts_per_chapter() {
        let mut engine = NarrativeEngine::default();
        engine.discover_clue("whoami", ClueSource::Terminal);
        let progress = engine.progress();
        assert_eq!(
            progress[0],
            ChapterProgress {
                chapter: 1,
                discovered: 1,
                total: 2,
            }
        );
        assert_eq!(progress[1].discovered, 0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut engine = NarrativeEngine::default();
        discover_all(&mut engine, 1);
        engine.reset();
        assert_eq!(engine.state(), &NarrativeState::default());
        assert_eq!(engine.current_chapter(), 1);
    }

    #[test]
    fn state_roundtrips_through_json() {
        let mut engine = NarrativeEngine::default();
        engine.discover_clue("whoami", ClueSource::Terminal);
        let json = serde_json::to_string(engine.state()).unwrap();
        let back: NarrativeState = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, engine.state());
    }
}
