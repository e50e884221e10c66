use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::study_tips::StudyTipsService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    tips: StudyTipsService,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, tips: StudyTipsService) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, tips }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn tips(&self) -> &StudyTipsService {
        &self.inner.tips
    }
}
