//! Game session: plays rounds, persists them, and keeps the history and
//! statistics shown to the player.
//!
//! History is held newest first. It is rebuilt from the sheet on [`load`]
//! and afterwards only grows by rounds whose append succeeded, so the local
//! statistics never include rows the sheet does not have.
//!
//! [`load`]: GameSession::load

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::{determine_result, HandPicker};
use crate::calculate::aggregate;
use crate::history::normalize;
use crate::models::{GameRecord, Hand, Statistics};
use crate::sheets::{SheetStore, SheetsError};

/// Errors surfaced to the player.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to load history: {0}")]
    Load(#[source] SheetsError),

    #[error("Failed to save game record: {0}")]
    Save(#[source] SheetsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No round on display, waiting for a hand.
    Idle,
    /// The last round is on display.
    Resolved,
}

/// What happened to a played round.
#[derive(Debug)]
pub enum PlayOutcome {
    /// Appended to the sheet and added to history.
    Saved(GameRecord),
    /// Shown to the player but not persisted; history is unchanged.
    Unsaved {
        record: GameRecord,
        error: SessionError,
    },
}

impl PlayOutcome {
    pub fn record(&self) -> &GameRecord {
        match self {
            PlayOutcome::Saved(record) => record,
            PlayOutcome::Unsaved { record, .. } => record,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, PlayOutcome::Saved(_))
    }
}

/// Ranges the session reads from and appends to.
#[derive(Debug, Clone)]
pub struct SessionRanges {
    pub history: String,
    pub append: String,
}

/// Serializable view of the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current: Option<GameRecord>,
    pub history: Vec<GameRecord>,
    pub statistics: Statistics,
    pub error: Option<String>,
}

pub struct GameSession {
    store: Arc<dyn SheetStore>,
    picker: Box<dyn HandPicker>,
    ranges: SessionRanges,
    current: Option<GameRecord>,
    history: Vec<GameRecord>,
    statistics: Statistics,
    error: Option<String>,
}

impl GameSession {
    pub fn new(
        store: Arc<dyn SheetStore>,
        picker: Box<dyn HandPicker>,
        ranges: SessionRanges,
    ) -> Self {
        Self {
            store,
            picker,
            ranges,
            current: None,
            history: Vec::new(),
            statistics: Statistics::default(),
            error: None,
        }
    }

    /// Replace history with what the sheet holds. On failure the current
    /// history and statistics are kept. Returns the number of records.
    pub async fn load(&mut self) -> Result<usize, SessionError> {
        let rows = match self.store.get(&self.ranges.history).await {
            Ok(rows) => rows,
            Err(e) => {
                let error = SessionError::Load(e);
                warn!("{}", error);
                self.error = Some(error.to_string());
                return Err(error);
            }
        };

        self.history = normalize(&rows);
        self.statistics = aggregate(&self.history);
        self.error = None;

        info!(
            "Loaded {} rounds from {} ({} rows)",
            self.history.len(),
            self.store.name(),
            rows.len()
        );
        Ok(self.history.len())
    }

    /// Play one round against the picker and append it to the sheet.
    pub async fn play(&mut self, hand: Hand) -> PlayOutcome {
        let computer = self.picker.pick();
        let result = determine_result(hand, computer);
        let record = GameRecord::new(Utc::now(), hand, computer, result);

        info!("Round: {} vs {} -> {}", hand, computer, result);
        self.current = Some(record.clone());
        self.error = None;

        match self
            .store
            .append(&self.ranges.append, vec![record.to_row()])
            .await
        {
            Ok(()) => {
                self.history.insert(0, record.clone());
                self.statistics = aggregate(&self.history);
                PlayOutcome::Saved(record)
            }
            Err(e) => {
                let error = SessionError::Save(e);
                warn!("{}", error);
                self.error = Some(error.to_string());
                PlayOutcome::Unsaved { record, error }
            }
        }
    }

    /// Clear the displayed round. History and statistics are kept.
    pub fn reset(&mut self) {
        self.current = None;
        self.error = None;
    }

    pub fn phase(&self) -> SessionPhase {
        if self.current.is_some() {
            SessionPhase::Resolved
        } else {
            SessionPhase::Idle
        }
    }

    pub fn current(&self) -> Option<&GameRecord> {
        self.current.as_ref()
    }

    /// Newest first.
    pub fn history(&self) -> &[GameRecord] {
        &self.history
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            current: self.current.clone(),
            history: self.history.clone(),
            statistics: self.statistics.clone(),
            error: self.error.clone(),
        }
    }
}
