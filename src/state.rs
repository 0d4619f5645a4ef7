use crate::analytics::filter::FilterState;
use crate::domain::sync::SyncEngine;
use crate::domain::wizard::Wizard;
use crate::services::insight::InsightGenerator;
use crate::store::{AdminStore, BrandingStore, ConfigStore, FeedbackStore};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    pub feedback: Arc<FeedbackStore>,
    pub admins: AdminStore,
    pub config: ConfigStore,
    pub branding: BrandingStore,
    pub wizard: Wizard,
    pub sync: SyncEngine,
    pub insight: Arc<dyn InsightGenerator>,
    /// Dashboard date filter (pending vs applied bounds).
    pub filter: Mutex<FilterState>,
}

pub type SharedState = Arc<AppState>;
