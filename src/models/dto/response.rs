use serde::Serialize;

use crate::models::domain::{quiz_question::Question, session_state::SessionPhase};

#[derive(Debug, Clone, Serialize)]
pub struct QuizProgress {
    pub quiz_id: String,
    pub current_question: usize,
    pub total_questions: usize,
    pub answered: usize,
    pub score: usize,
    pub phase: SessionPhase,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    pub position: usize,
    pub question: Question,
    pub submitted: Option<String>,
    pub correct_label: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBand {
    Excellent,
    Great,
    Good,
    Fair,
    Review,
}

impl PerformanceBand {
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => PerformanceBand::Excellent,
            p if p >= 80.0 => PerformanceBand::Great,
            p if p >= 70.0 => PerformanceBand::Good,
            p if p >= 60.0 => PerformanceBand::Fair,
            _ => PerformanceBand::Review,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "Excellent! Outstanding performance!",
            PerformanceBand::Great => "Great job! Well done!",
            PerformanceBand::Good => "Good work! Keep it up!",
            PerformanceBand::Fair => "Not bad! Room for improvement.",
            PerformanceBand::Review => "Consider reviewing the material more.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizResults {
    pub quiz_id: String,
    pub title: String,
    pub entries: Vec<ResultEntry>,
    pub score: usize,
    pub total: usize,
    pub percentage: f64,
    pub band: PerformanceBand,
}
