use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    InProgress,
    Completed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::InProgress => write!(f, "in_progress"),
            SessionPhase::Completed => write!(f, "completed"),
        }
    }
}

/// Serializable per-user quiz progress, persisted in the session store.
///
/// The score is never stored; it is derived from `answers` against the quiz.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub quiz_id: Option<String>,
    pub position: usize,
    pub answers: BTreeMap<usize, String>,
    pub completed: bool,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match (&self.quiz_id, self.completed) {
            (None, _) => SessionPhase::Idle,
            (Some(_), false) => SessionPhase::InProgress,
            (Some(_), true) => SessionPhase::Completed,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.quiz_id.is_none()
    }
}
