//! Application state: the question bank, config, and the in-memory session store.
//!
//! The bank is loaded once and shared read-only. Each session is only touched
//! under the store's write lock, so answers for one session are serialized.
//! A session leaves the store once its result is produced, or when it is older
//! than `session_ttl_secs` at the time another session starts.

use std::{collections::HashMap, sync::Arc};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::bank::QuestionBank;
use crate::classifier::Classifier;
use crate::config::QuizConfig;
use crate::domain::Dimension;
use crate::error::{ApiError, BankError, SessionError};
use crate::sampler::TypeRatios;
use crate::session::{GameSession, QuizResult};

#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<QuestionBank>,
    pub config: QuizConfig,
    pub ratios: TypeRatios,
    pub classifier: Classifier,
    pub sessions: Arc<RwLock<HashMap<String, GameSession>>>,
}

impl AppState {
    /// Build state from config. Fails if the bank cannot be loaded.
    #[instrument(level = "info", skip_all, fields(bank_path = %config.bank_path))]
    pub fn new(config: QuizConfig) -> Result<Self, BankError> {
        let bank = QuestionBank::load(&config.bank_path)?;
        Ok(Self::with_bank(bank, config))
    }

    pub fn with_bank(bank: QuestionBank, config: QuizConfig) -> Self {
        let inventory = bank.inventory();
        for (kind, count) in &inventory.by_type {
            info!(target: "quiz", %kind, count, "Startup question inventory");
        }
        for dimension in Dimension::ALL {
            let count = inventory.by_dimension.get(dimension.key()).copied().unwrap_or(0);
            let max_score = bank.dimension_max(dimension);
            info!(target: "quiz", dimension = dimension.key(), count, max_score, "Startup dimension inventory");
        }

        let ratios = config.type_ratios();
        Self {
            bank: Arc::new(bank),
            config,
            ratios,
            classifier: Classifier::standard(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a session with `count` questions (config default when absent).
    #[instrument(level = "info", skip(self))]
    pub async fn start_session(&self, count: Option<usize>) -> String {
        let count = count.unwrap_or(self.config.default_count);
        let session = {
            let mut rng = rand::thread_rng();
            GameSession::start(&self.bank, count, &self.ratios, &mut rng)
        };
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl_secs = self.config.session_ttl_secs;
        let now = Utc::now();
        sessions.retain(|_, s| {
            (now - s.started_at())
                .to_std()
                .map_or(true, |age| age.as_secs() < ttl_secs)
        });
        let expired = before - sessions.len();
        if expired > 0 {
            info!(target: "quiz", expired, "Dropped idle sessions");
        }
        sessions.insert(id.clone(), session);
        info!(target: "quiz", session_id = %id, count, live = sessions.len(), "Session registered");
        id
    }

    /// Produce the final result and drop the session from the store.
    /// An unfinished session stays in place.
    #[instrument(level = "info", skip(self))]
    pub async fn finish_session(&self, session_id: &str) -> Result<QuizResult, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| ApiError::UnknownSession(session_id.to_string()))?;
        let result = session.result(&self.bank, &self.classifier)?;
        sessions.remove(session_id);
        info!(target: "quiz", %session_id, live = sessions.len(), "Session closed");
        Ok(result)
    }

    /// Run `f` against one session under the write lock.
    pub async fn with_session<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut GameSession, &QuestionBank) -> Result<T, SessionError>,
    ) -> Result<T, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ApiError::UnknownSession(session_id.to_string()))?;
        Ok(f(session, &self.bank)?)
    }
}
