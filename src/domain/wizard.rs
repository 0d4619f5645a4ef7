use crate::domain::models::{
    category_exists, next_category_after, FeedbackDraft, FeedbackRecord, RatingLevel,
};
use crate::store::{FeedbackStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Linear guest flow. No branching, no skipping; the only way back to
/// `Welcome` is a reset (explicit or the thank-you timer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    Welcome,
    Overall,
    Categories,
    Comments,
    ThankYou,
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("current step is not complete")]
    Incomplete,
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// UI hints emitted by the wizard. These never gate a transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "categoryId")]
pub enum WizardEvent {
    FocusCategory(&'static str),
}

#[derive(Clone, Copy, Debug)]
pub struct WizardTimers {
    /// Dwell on the thank-you screen before the automatic return to welcome.
    pub thank_you_dwell: Duration,
    /// Delay before the next-category focus hint, leaving room for the
    /// rating's own visual feedback.
    pub focus_delay: Duration,
}

impl Default for WizardTimers {
    fn default() -> Self {
        Self {
            thank_you_dwell: Duration::from_secs(6),
            focus_delay: Duration::from_millis(150),
        }
    }
}

struct WizardInner {
    step: WizardStep,
    draft: FeedbackDraft,
    /// Bumped on every reset; scheduled timers capture the epoch they were
    /// born in and go inert when it no longer matches.
    epoch: u64,
    reset_task: Option<JoinHandle<()>>,
}

impl WizardInner {
    fn reset(&mut self) {
        self.epoch += 1;
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
        self.step = WizardStep::Welcome;
        self.draft = FeedbackDraft::default();
    }

    fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::Welcome => true,
            WizardStep::Overall => self.draft.overall_step_complete(),
            WizardStep::Categories => self.draft.categories_step_complete(),
            WizardStep::Comments => true,
            WizardStep::ThankYou => false,
        }
    }
}

/// Observable wizard state for the kiosk UI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub step: WizardStep,
    pub draft: FeedbackDraft,
    pub can_advance: bool,
}

/// The feedback-collection state machine. Accumulates one draft per guest
/// session and writes it to the store exactly once, at finalize.
pub struct Wizard {
    inner: Arc<Mutex<WizardInner>>,
    store: Arc<FeedbackStore>,
    events: broadcast::Sender<WizardEvent>,
    timers: WizardTimers,
}

impl Wizard {
    pub fn new(store: Arc<FeedbackStore>, timers: WizardTimers) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(Mutex::new(WizardInner {
                step: WizardStep::Welcome,
                draft: FeedbackDraft::default(),
                epoch: 0,
                reset_task: None,
            })),
            store,
            events,
            timers,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        let inner = self.inner.lock().await;
        WizardSnapshot {
            step: inner.step,
            draft: inner.draft.clone(),
            can_advance: inner.can_advance(),
        }
    }

    pub async fn step(&self) -> WizardStep {
        self.inner.lock().await.step
    }

    /// Explicit "start" action on the welcome screen.
    pub async fn start(&self) -> WizardStep {
        let mut inner = self.inner.lock().await;
        if inner.step == WizardStep::Welcome {
            inner.step = WizardStep::Overall;
        }
        inner.step
    }

    pub async fn set_apartment(&self, apartment_number: String) {
        self.inner.lock().await.draft.apartment_number = apartment_number;
    }

    pub async fn set_overall(&self, level: RatingLevel) {
        self.inner.lock().await.draft.overall = Some(level);
    }

    pub async fn set_comments(&self, comments: String) {
        self.inner.lock().await.draft.comments = comments;
    }

    /// Records a category rating immediately. When a later category exists
    /// in the fixed order, a focus hint for it is emitted after a short
    /// delay, unless the session has left the categories step by then.
    pub async fn rate_category(&self, id: &str, level: RatingLevel) -> Result<(), WizardError> {
        if !category_exists(id) {
            return Err(WizardError::UnknownCategory(id.to_string()));
        }

        let mut inner = self.inner.lock().await;
        inner.draft.categories.insert(id.to_string(), level);

        if let Some(next) = next_category_after(id) {
            let epoch = inner.epoch;
            let inner_ref = Arc::clone(&self.inner);
            let events = self.events.clone();
            let delay = self.timers.focus_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let inner = inner_ref.lock().await;
                if inner.epoch == epoch && inner.step == WizardStep::Categories {
                    let _ = events.send(WizardEvent::FocusCategory(next));
                }
            });
        }
        Ok(())
    }

    /// Moves to the next step if the current guard is satisfied. A blocked
    /// advance leaves everything unchanged. Advancing from the comments
    /// step finalizes the session: the record gets its timestamp and is
    /// appended to the store, then the thank-you auto-reset is scheduled.
    pub async fn advance(&self) -> Result<WizardStep, WizardError> {
        let mut inner = self.inner.lock().await;
        match inner.step {
            WizardStep::Welcome => {
                inner.step = WizardStep::Overall;
            }
            WizardStep::Overall => {
                if !inner.draft.overall_step_complete() {
                    return Err(WizardError::Incomplete);
                }
                inner.step = WizardStep::Categories;
            }
            WizardStep::Categories => {
                if !inner.draft.categories_step_complete() {
                    return Err(WizardError::Incomplete);
                }
                inner.step = WizardStep::Comments;
            }
            WizardStep::Comments => {
                let overall = inner.draft.overall.ok_or(WizardError::Incomplete)?;
                let record = FeedbackRecord {
                    overall,
                    categories: inner.draft.categories.clone(),
                    comments: inner.draft.comments.clone(),
                    apartment_number: inner.draft.apartment_number.clone(),
                    timestamp: chrono::Utc::now().timestamp_millis(),
                    guest_name: None,
                    guest_email: None,
                    guest_phone: None,
                };
                // The only write point; a store failure aborts the transition.
                self.store.append(record).await?;
                inner.step = WizardStep::ThankYou;
                self.schedule_auto_reset(&mut inner);
            }
            WizardStep::ThankYou => {}
        }
        Ok(inner.step)
    }

    /// Unconditional return to welcome, discarding the in-progress draft.
    /// Available from every state (the kiosk brand mark triggers it).
    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }

    fn schedule_auto_reset(&self, inner: &mut WizardInner) {
        let epoch = inner.epoch;
        let inner_ref = Arc::clone(&self.inner);
        let dwell = self.timers.thank_you_dwell;
        inner.reset_task = Some(tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            let mut inner = inner_ref.lock().await;
            if inner.epoch == epoch && inner.step == WizardStep::ThankYou {
                tracing::debug!("thank-you dwell elapsed, returning to welcome");
                inner.reset();
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CATEGORIES;
    use crate::store::Keyspace;

    fn fast_timers() -> WizardTimers {
        WizardTimers {
            thank_you_dwell: Duration::from_millis(40),
            focus_delay: Duration::from_millis(5),
        }
    }

    fn wizard_with_store() -> (tempfile::TempDir, Arc<FeedbackStore>, Wizard) {
        let dir = tempfile::tempdir().unwrap();
        let store =
            Arc::new(FeedbackStore::open(Keyspace::open(dir.path()).unwrap()).unwrap());
        let wizard = Wizard::new(Arc::clone(&store), fast_timers());
        (dir, store, wizard)
    }

    async fn complete_categories(wizard: &Wizard) {
        for cat in CATEGORIES.iter() {
            wizard.rate_category(cat.id, RatingLevel::Satisfied).await.unwrap();
        }
    }

    #[tokio::test]
    async fn overall_step_blocks_until_rating_and_apartment_are_set() {
        let (_dir, _store, wizard) = wizard_with_store();
        wizard.start().await;

        assert!(matches!(wizard.advance().await, Err(WizardError::Incomplete)));
        assert_eq!(wizard.step().await, WizardStep::Overall);

        wizard.set_overall(RatingLevel::Excellent).await;
        assert!(matches!(wizard.advance().await, Err(WizardError::Incomplete)));

        // Whitespace does not count as an apartment number.
        wizard.set_apartment("   ".to_string()).await;
        assert!(matches!(wizard.advance().await, Err(WizardError::Incomplete)));

        wizard.set_apartment("102".to_string()).await;
        assert_eq!(wizard.advance().await.unwrap(), WizardStep::Categories);
    }

    #[tokio::test]
    async fn categories_step_blocks_until_every_category_is_rated() {
        let (_dir, _store, wizard) = wizard_with_store();
        wizard.start().await;
        wizard.set_overall(RatingLevel::Satisfied).await;
        wizard.set_apartment("7".to_string()).await;
        wizard.advance().await.unwrap();

        // All but the last.
        for cat in CATEGORIES.iter().take(CATEGORIES.len() - 1) {
            wizard.rate_category(cat.id, RatingLevel::Neutral).await.unwrap();
        }
        assert!(matches!(wizard.advance().await, Err(WizardError::Incomplete)));
        assert!(!wizard.snapshot().await.can_advance);

        // Adding the final missing rating unblocks the transition.
        let last = CATEGORIES.last().unwrap();
        wizard.rate_category(last.id, RatingLevel::Neutral).await.unwrap();
        assert_eq!(wizard.advance().await.unwrap(), WizardStep::Comments);
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let (_dir, _store, wizard) = wizard_with_store();
        let err = wizard.rate_category("spa", RatingLevel::Excellent).await.unwrap_err();
        assert!(matches!(err, WizardError::UnknownCategory(_)));
    }

    #[tokio::test]
    async fn finalize_appends_exactly_one_timestamped_record() {
        let (_dir, store, wizard) = wizard_with_store();
        wizard.start().await;
        wizard.set_overall(RatingLevel::Excellent).await;
        wizard.set_apartment("305".to_string()).await;
        wizard.advance().await.unwrap();
        complete_categories(&wizard).await;
        wizard.advance().await.unwrap();
        wizard.set_comments("Estadia perfeita".to_string()).await;

        let before = chrono::Utc::now().timestamp_millis();
        assert_eq!(wizard.advance().await.unwrap(), WizardStep::ThankYou);
        let after = chrono::Utc::now().timestamp_millis();

        let all = store.load_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].apartment_number, "305");
        assert_eq!(all[0].comments, "Estadia perfeita");
        assert!(all[0].timestamp >= before && all[0].timestamp <= after);
        assert!(all[0].guest_name.is_none());
    }

    #[tokio::test]
    async fn reset_discards_the_draft_without_writing() {
        let (_dir, store, wizard) = wizard_with_store();
        wizard.start().await;
        wizard.set_overall(RatingLevel::Unsatisfied).await;
        wizard.set_apartment("11".to_string()).await;
        wizard.reset().await;

        let snapshot = wizard.snapshot().await;
        assert_eq!(snapshot.step, WizardStep::Welcome);
        assert!(snapshot.draft.overall.is_none());
        assert!(snapshot.draft.apartment_number.is_empty());
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn thank_you_auto_resets_after_the_dwell() {
        let (_dir, _store, wizard) = wizard_with_store();
        wizard.start().await;
        wizard.set_overall(RatingLevel::Satisfied).await;
        wizard.set_apartment("1".to_string()).await;
        wizard.advance().await.unwrap();
        complete_categories(&wizard).await;
        wizard.advance().await.unwrap();
        wizard.advance().await.unwrap();
        assert_eq!(wizard.step().await, WizardStep::ThankYou);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(wizard.step().await, WizardStep::Welcome);
    }

    #[tokio::test]
    async fn stale_auto_reset_never_touches_a_newer_session() {
        let (_dir, _store, wizard) = wizard_with_store();
        wizard.start().await;
        wizard.set_overall(RatingLevel::Satisfied).await;
        wizard.set_apartment("1".to_string()).await;
        wizard.advance().await.unwrap();
        complete_categories(&wizard).await;
        wizard.advance().await.unwrap();
        wizard.advance().await.unwrap();

        // Guest taps "new evaluation" before the dwell elapses and a new
        // session begins immediately.
        wizard.reset().await;
        wizard.start().await;
        assert_eq!(wizard.step().await, WizardStep::Overall);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(wizard.step().await, WizardStep::Overall);
    }

    #[tokio::test]
    async fn rating_emits_a_focus_hint_for_the_next_category() {
        let (_dir, _store, wizard) = wizard_with_store();
        let mut events = wizard.subscribe();
        wizard.start().await;
        wizard.set_overall(RatingLevel::Satisfied).await;
        wizard.set_apartment("1".to_string()).await;
        wizard.advance().await.unwrap();

        wizard.rate_category("apartment", RatingLevel::Excellent).await.unwrap();
        let event = tokio::time::timeout(Duration::from_millis(100), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, WizardEvent::FocusCategory("room_cleaning"));
    }

    #[tokio::test]
    async fn last_category_emits_no_focus_hint() {
        let (_dir, _store, wizard) = wizard_with_store();
        let mut events = wizard.subscribe();
        wizard.start().await;
        wizard.set_overall(RatingLevel::Satisfied).await;
        wizard.set_apartment("1".to_string()).await;
        wizard.advance().await.unwrap();

        wizard.rate_category("staff", RatingLevel::Excellent).await.unwrap();
        let outcome = tokio::time::timeout(Duration::from_millis(50), events.recv()).await;
        assert!(outcome.is_err(), "no hint expected after the final category");
    }

    #[tokio::test]
    async fn focus_hint_is_cancelled_when_the_session_resets_first() {
        let (_dir, _store, wizard) = wizard_with_store();
        let mut events = wizard.subscribe();
        wizard.start().await;
        wizard.set_overall(RatingLevel::Satisfied).await;
        wizard.set_apartment("1".to_string()).await;
        wizard.advance().await.unwrap();

        wizard.rate_category("apartment", RatingLevel::Excellent).await.unwrap();
        wizard.reset().await;

        let outcome = tokio::time::timeout(Duration::from_millis(50), events.recv()).await;
        assert!(outcome.is_err(), "hint must not fire after reset");
    }
}
