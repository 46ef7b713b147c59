use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Question, Quiz, SessionPhase, SessionState},
        dto::response::{PerformanceBand, QuizProgress, QuizResults, ResultEntry},
    },
    repositories::{QuizRepository, SessionStore},
};

/// One user's play-through: the persisted [`SessionState`] plus the quiz it
/// references, reloaded from disk whenever the session is resumed.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    state: SessionState,
    quiz: Option<Quiz>,
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::InvalidTransition(message.into())
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a session from stored state, reloading its quiz.
    pub async fn resume(state: SessionState, repository: &dyn QuizRepository) -> AppResult<Self> {
        let quiz = match &state.quiz_id {
            Some(id) => Some(repository.load_quiz(id).await?),
            None => None,
        };

        if let Some(quiz) = &quiz {
            if state.position >= quiz.len() {
                return Err(AppError::MalformedQuiz(format!(
                    "quiz '{}' has {} questions but the session is at position {}",
                    quiz.id,
                    quiz.len(),
                    state.position
                )));
            }
        }

        Ok(Self { state, quiz })
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    /// Current zero-based position, `None` while idle.
    pub fn position(&self) -> Option<usize> {
        self.quiz.as_ref().map(|_| self.state.position)
    }

    pub fn answer_for(&self, position: usize) -> Option<&str> {
        self.state.answers.get(&position).map(String::as_str)
    }

    fn in_progress_quiz(&self, action: &str) -> AppResult<&Quiz> {
        match (self.phase(), &self.quiz) {
            (SessionPhase::InProgress, Some(quiz)) => Ok(quiz),
            (SessionPhase::Idle, _) => Err(invalid(format!("cannot {} without an active quiz", action))),
            (SessionPhase::Completed, _) => {
                Err(invalid(format!("cannot {} after the quiz is completed", action)))
            }
            (SessionPhase::InProgress, None) => Err(AppError::InternalError(
                "session refers to a quiz that was not loaded".to_string(),
            )),
        }
    }

    pub fn current_question(&self) -> AppResult<&Question> {
        let quiz = self.in_progress_quiz("show a question")?;
        quiz.question(self.state.position).ok_or_else(|| {
            AppError::InternalError(format!(
                "position {} is outside quiz '{}'",
                self.state.position, quiz.id
            ))
        })
    }

    /// Loads `quiz_id` and begins a fresh play-through. Any previous
    /// play-through is replaced; on failure the session is left untouched.
    pub async fn start(&mut self, quiz_id: &str, repository: &dyn QuizRepository) -> AppResult<()> {
        let quiz = repository.load_quiz(quiz_id).await?;
        self.begin(quiz);
        Ok(())
    }

    pub fn begin(&mut self, quiz: Quiz) {
        self.state = SessionState {
            quiz_id: Some(quiz.id.clone()),
            position: 0,
            answers: Default::default(),
            completed: false,
        };
        self.quiz = Some(quiz);
    }

    /// Records `choice` for the current position, overwriting an earlier answer.
    pub fn submit_answer(&mut self, position: usize, choice: &str) -> AppResult<()> {
        self.in_progress_quiz("submit an answer")?;

        if position != self.state.position {
            return Err(invalid(format!(
                "answer for question {} submitted while on question {}",
                position + 1,
                self.state.position + 1
            )));
        }

        let choice = choice.trim();
        if choice.is_empty() {
            return Err(AppError::ValidationError(
                "Choose an answer before submitting".to_string(),
            ));
        }

        self.state.answers.insert(position, choice.to_string());
        Ok(())
    }

    /// Moves forward; from the last question this completes the quiz.
    pub fn advance(&mut self) -> AppResult<SessionPhase> {
        let last = self.in_progress_quiz("advance")?.last_index();

        if self.state.position >= last {
            self.state.position = last;
            self.state.completed = true;
        } else {
            self.state.position += 1;
        }

        Ok(self.phase())
    }

    /// Moves back one question, keeping every recorded answer.
    pub fn retreat(&mut self) -> AppResult<()> {
        self.in_progress_quiz("go back")?;

        if self.state.position == 0 {
            return Err(invalid("already at the first question"));
        }

        self.state.position -= 1;
        Ok(())
    }

    pub fn finish(&mut self) -> AppResult<()> {
        self.in_progress_quiz("finish")?;
        self.state.completed = true;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.state = SessionState::default();
        self.quiz = None;
    }

    /// Correct answers, always recomputed from the recorded answers.
    pub fn score(&self) -> usize {
        let Some(quiz) = &self.quiz else {
            return 0;
        };

        self.state
            .answers
            .iter()
            .filter(|(position, choice)| {
                quiz.question(**position)
                    .is_some_and(|question| question.is_correct(choice))
            })
            .count()
    }

    pub fn progress(&self) -> AppResult<QuizProgress> {
        let quiz = self
            .quiz
            .as_ref()
            .ok_or_else(|| invalid("no active quiz"))?;

        Ok(QuizProgress {
            quiz_id: quiz.id.clone(),
            current_question: self.state.position,
            total_questions: quiz.len(),
            answered: self.state.answers.len(),
            score: self.score(),
            phase: self.phase(),
        })
    }

    pub fn results(&self) -> AppResult<QuizResults> {
        let quiz = match (self.phase(), &self.quiz) {
            (SessionPhase::Completed, Some(quiz)) => quiz,
            (phase, _) => {
                return Err(invalid(format!(
                    "results are only available once the quiz is completed (currently {})",
                    phase
                )))
            }
        };

        let entries: Vec<ResultEntry> = quiz
            .questions
            .iter()
            .enumerate()
            .map(|(position, question)| {
                let submitted = self.state.answers.get(&position).cloned();
                let is_correct = submitted
                    .as_deref()
                    .is_some_and(|choice| question.is_correct(choice));
                ResultEntry {
                    position,
                    question: question.clone(),
                    submitted,
                    correct_label: question.correct_label(),
                    is_correct,
                }
            })
            .collect();

        let score = entries.iter().filter(|e| e.is_correct).count();
        let total = quiz.len();
        let percentage = if total > 0 {
            score as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Ok(QuizResults {
            quiz_id: quiz.id.clone(),
            title: quiz.title(),
            entries,
            score,
            total,
            percentage,
            band: PerformanceBand::from_percentage(percentage),
        })
    }
}

/// Loads and persists [`QuizSession`]s for request handlers.
pub struct QuizSessionService {
    quiz_repository: Arc<dyn QuizRepository>,
    session_store: Arc<dyn SessionStore>,
}

impl QuizSessionService {
    pub fn new(quiz_repository: Arc<dyn QuizRepository>, session_store: Arc<dyn SessionStore>) -> Self {
        Self {
            quiz_repository,
            session_store,
        }
    }

    pub fn quiz_repository(&self) -> &dyn QuizRepository {
        self.quiz_repository.as_ref()
    }

    /// Returns the stored session, or an idle one on first contact. A session
    /// whose quiz can no longer be loaded is cleared and the error returned.
    pub async fn load(&self, session_id: &str) -> AppResult<QuizSession> {
        let state = self.session_store.get(session_id).await?.unwrap_or_default();

        match QuizSession::resume(state, self.quiz_repository.as_ref()).await {
            Ok(session) => Ok(session),
            Err(e) => {
                log::warn!("Resetting session {}: {}", session_id, e);
                self.session_store.clear(session_id).await?;
                Err(e)
            }
        }
    }

    pub async fn save(&self, session_id: &str, session: &QuizSession) -> AppResult<()> {
        if session.phase() == SessionPhase::Idle {
            return self.session_store.clear(session_id).await;
        }
        self.session_store
            .set(session_id, session.state().clone())
            .await
    }

    /// Applies `transition` to the stored session and persists the result.
    pub async fn update<T>(
        &self,
        session_id: &str,
        transition: impl FnOnce(&mut QuizSession) -> AppResult<T>,
    ) -> AppResult<(QuizSession, T)> {
        let mut session = self.load(session_id).await?;
        let outcome = transition(&mut session)?;
        self.save(session_id, &session).await?;
        Ok((session, outcome))
    }

    pub async fn start(&self, session_id: &str, quiz_id: &str) -> AppResult<QuizSession> {
        let mut session = match self.load(session_id).await {
            Ok(session) => session,
            Err(AppError::NotFound(_)) | Err(AppError::MalformedQuiz(_)) => QuizSession::new(),
            Err(e) => return Err(e),
        };

        session.start(quiz_id, self.quiz_repository.as_ref()).await?;
        self.save(session_id, &session).await?;
        log::info!("Session {} started quiz {}", session_id, quiz_id);
        Ok(session)
    }

    pub async fn reset(&self, session_id: &str) -> AppResult<()> {
        self.session_store.clear(session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixtures, InMemoryQuizRepository};

    fn started() -> QuizSession {
        let mut session = QuizSession::new();
        session.begin(fixtures::three_question_quiz());
        session
    }

    #[test]
    fn new_session_is_idle() {
        let session = QuizSession::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.position(), None);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn advancing_through_every_question_completes() {
        let mut session = started();
        let total = session.quiz().map(Quiz::len).unwrap_or_default();

        for _ in 0..total - 1 {
            assert_eq!(session.advance().expect("advance works"), SessionPhase::InProgress);
        }
        assert_eq!(session.position(), Some(total - 1));
        assert_eq!(session.phase(), SessionPhase::InProgress);

        assert_eq!(session.advance().expect("advance works"), SessionPhase::Completed);
        assert!(matches!(session.advance(), Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn retreat_then_advance_restores_position_and_answers() {
        let mut session = started();
        session.submit_answer(0, "A").expect("answer accepted");
        session.advance().expect("advance works");
        session.submit_answer(1, "X").expect("answer accepted");

        let answers_before = session.state().answers.clone();
        session.retreat().expect("retreat works");
        assert_eq!(session.position(), Some(0));
        session.advance().expect("advance works");

        assert_eq!(session.position(), Some(1));
        assert_eq!(session.state().answers, answers_before);
        assert_eq!(session.answer_for(0), Some("A"));
    }

    #[test]
    fn retreat_at_first_question_is_rejected() {
        let mut session = started();
        assert!(matches!(session.retreat(), Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn out_of_order_submission_is_rejected() {
        let mut session = started();

        assert!(matches!(
            session.submit_answer(2, "C"),
            Err(AppError::InvalidTransition(_))
        ));
        assert!(session.state().answers.is_empty());

        let mut idle = QuizSession::new();
        assert!(matches!(
            idle.submit_answer(0, "A"),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn overwritten_answers_keep_score_derived() {
        let mut session = started();
        session.submit_answer(0, "B").expect("answer accepted");
        assert_eq!(session.score(), 0);
        session.submit_answer(0, "A").expect("answer accepted");
        assert_eq!(session.score(), 1);
        session.submit_answer(0, "D").expect("answer accepted");
        session.submit_answer(0, "a").expect("answer accepted");
        assert_eq!(session.score(), 1);
        assert_eq!(session.state().answers.len(), 1);
    }

    #[test]
    fn scenario_two_of_three_correct() {
        let mut session = started();
        for (position, choice) in ["A", "X", "C"].iter().enumerate() {
            session.submit_answer(position, choice).expect("answer accepted");
            session.advance().expect("advance works");
        }

        let results = session.results().expect("quiz is completed");
        assert_eq!(results.score, 2);
        assert_eq!(results.total, 3);

        let summary: Vec<(Option<&str>, bool)> = results
            .entries
            .iter()
            .map(|e| (e.submitted.as_deref(), e.is_correct))
            .collect();
        assert_eq!(
            summary,
            vec![(Some("A"), true), (Some("X"), false), (Some("C"), true)]
        );
        assert_eq!(results.entries[1].correct_label, "B");
    }

    #[test]
    fn letter_valued_options_score_only_the_right_label() {
        let question = Question::new(
            "Which letter comes first?".to_string(),
            vec!["B".to_string(), "A".to_string(), "C".to_string(), "D".to_string()],
            1,
        )
        .expect("question is valid");
        let quiz = Quiz::new("mcqs_letters.json", Default::default(), vec![question])
            .expect("quiz is valid");

        let mut session = QuizSession::new();
        session.begin(quiz);
        session.submit_answer(0, "A").expect("answer accepted");
        assert_eq!(session.score(), 0);

        session.submit_answer(0, "B").expect("answer accepted");
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn results_before_completion_is_invalid_transition() {
        let idle = QuizSession::new();
        assert!(matches!(idle.results(), Err(AppError::InvalidTransition(_))));

        let session = started();
        assert!(matches!(session.results(), Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn finish_completes_with_unanswered_questions() {
        let mut session = started();
        session.submit_answer(0, "A").expect("answer accepted");
        session.finish().expect("finish works");

        let results = session.results().expect("quiz is completed");
        assert_eq!(results.score, 1);
        assert_eq!(results.entries[2].submitted, None);
        assert!(!results.entries[2].is_correct);
    }

    #[test]
    fn reset_from_any_phase_is_idle() {
        let mut idle = QuizSession::new();
        idle.reset();

        let mut in_progress = started();
        in_progress.submit_answer(0, "A").expect("answer accepted");
        in_progress.reset();

        let mut completed = started();
        completed.finish().expect("finish works");
        completed.reset();

        for session in [idle, in_progress, completed] {
            assert_eq!(session.phase(), SessionPhase::Idle);
            assert!(session.quiz().is_none());
            assert!(session.state().answers.is_empty());
        }
    }

    #[tokio::test]
    async fn start_with_missing_quiz_leaves_session_idle() {
        let repository = InMemoryQuizRepository::with_quizzes(vec![fixtures::three_question_quiz()]);
        let mut session = QuizSession::new();

        let err = session
            .start("mcqs_missing.json", &repository)
            .await
            .expect_err("quiz does not exist");
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn service_persists_transitions() {
        let quiz = fixtures::three_question_quiz();
        let quiz_id = quiz.id.clone();
        let repository = Arc::new(InMemoryQuizRepository::with_quizzes(vec![quiz]));
        let store = Arc::new(crate::repositories::InMemorySessionStore::new(30));
        let service = QuizSessionService::new(repository, store.clone());

        service.start("sid", &quiz_id).await.expect("start works");
        service
            .update("sid", |s| {
                s.submit_answer(0, "A")?;
                s.advance()
            })
            .await
            .expect("update works");

        let stored = store.get("sid").await.expect("get works").expect("state stored");
        assert_eq!(stored.position, 1);
        assert_eq!(stored.answers.get(&0).map(String::as_str), Some("A"));

        service.reset("sid").await.expect("reset works");
        let session = service.load("sid").await.expect("load works");
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn vanished_quiz_clears_session() {
        let repository = Arc::new(InMemoryQuizRepository::default());
        let store = Arc::new(crate::repositories::InMemorySessionStore::new(30));
        store
            .set(
                "sid",
                SessionState {
                    quiz_id: Some("mcqs_gone.json".to_string()),
                    ..SessionState::default()
                },
            )
            .await
            .expect("set works");
        let service = QuizSessionService::new(repository, store.clone());

        assert!(matches!(service.load("sid").await, Err(AppError::NotFound(_))));
        assert!(store.get("sid").await.expect("get works").is_none());
    }
}
