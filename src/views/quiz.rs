use maud::{html, Markup};

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Question, QuizSummary},
        dto::response::QuizResults,
    },
    services::quiz_session_service::QuizSession,
};

use super::layout;

pub fn index_page(quizzes: &[QuizSummary]) -> Markup {
    layout(
        "Available quizzes",
        html! {
            h1 { "Available quizzes" }
            @if quizzes.is_empty() {
                p { "No quizzes found. Generate one with " code { "generate-mcqs <topic>" } "." }
            } @else {
                form method="post" action="/start" {
                    ul.quizzes {
                        @for (i, quiz) in quizzes.iter().enumerate() {
                            li {
                                label {
                                    input type="radio" name="quiz" value=(quiz.id) required checked[i == 0];
                                    " " strong { (quiz.title) }
                                    " (" (quiz.total_questions) " questions"
                                    @if let Some(date) = quiz.display_date() {
                                        ", " (date)
                                    }
                                    ")"
                                }
                            }
                        }
                    }
                    button type="submit" { "Start quiz" }
                }
            }
        },
    )
}

/// Everything the question page needs, borrowed from an in-progress session.
#[derive(Debug)]
pub struct QuestionView<'a> {
    pub title: String,
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub question: &'a Question,
    pub selected: Option<&'a str>,
}

impl<'a> QuestionView<'a> {
    pub fn from_session(session: &'a QuizSession) -> AppResult<Self> {
        let question = session.current_question()?;
        let quiz = session
            .quiz()
            .ok_or_else(|| AppError::InternalError("in-progress session without a quiz".to_string()))?;
        let position = session.state().position;

        Ok(Self {
            title: quiz.title(),
            position,
            total: quiz.len(),
            answered: session.state().answers.len(),
            question,
            selected: session.answer_for(position),
        })
    }

    fn is_selected(&self, index: usize) -> bool {
        self.selected
            .and_then(|choice| self.question.choice_index(choice))
            == Some(index)
    }

    fn is_last(&self) -> bool {
        self.position + 1 >= self.total
    }
}

pub fn question_page(view: &QuestionView<'_>) -> Markup {
    layout(
        &view.title,
        html! {
            h1 { (view.title) }
            p.progress {
                "Question " (view.position + 1) " of " (view.total)
                " (" (view.answered) " answered)"
            }
            h2 { (view.question.prompt) }
            form method="post" action="/answer" {
                input type="hidden" name="position" value=(view.position);
                div.options {
                    @for (index, (label, text)) in view.question.labelled_options().enumerate() {
                        label {
                            input type="radio" name="choice" value=(label) required
                                checked[view.is_selected(index)];
                            " " (text)
                        }
                    }
                }
                button type="submit" {
                    @if view.is_last() { "Submit and finish" } @else { "Submit and continue" }
                }
            }
            div.nav {
                @if view.position > 0 {
                    form method="post" action="/previous" { button type="submit" { "Previous" } }
                }
                @if !view.is_last() {
                    form method="post" action="/next" { button type="submit" { "Skip" } }
                }
                form method="post" action="/finish" { button type="submit" { "Finish quiz" } }
                form method="post" action="/reset" { button type="submit" { "Quit" } }
            }
        },
    )
}

pub fn results_page(results: &QuizResults) -> Markup {
    layout(
        "Results",
        html! {
            h1 { "Results: " (results.title) }
            p.score {
                "You scored " (results.score) " out of " (results.total)
                " (" (format!("{:.1}", results.percentage)) "%)"
            }
            p.band { (results.band.message()) }
            ol.results {
                @for entry in &results.entries {
                    li class=(if entry.is_correct { "correct" } else { "incorrect" }) {
                        p { (entry.question.prompt) }
                        p {
                            "Your answer: "
                            @match &entry.submitted {
                                Some(choice) => { (choice) },
                                None => { em { "not answered" } },
                            }
                        }
                        @if !entry.is_correct {
                            p { "Correct answer: " (entry.question.correct_option()) }
                        }
                    }
                }
            }
            form method="post" action="/reset" { button type="submit" { "Take another quiz" } }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;

    #[test]
    fn index_lists_quizzes() {
        let summary = fixtures::three_question_quiz().summary();
        let page = index_page(&[summary]).into_string();

        assert!(page.contains("basics"));
        assert!(page.contains(fixtures::THREE_QUESTION_QUIZ_ID));
        assert!(page.contains("3 questions"));
    }

    #[test]
    fn index_explains_empty_catalog() {
        assert!(index_page(&[]).into_string().contains("No quizzes found"));
    }

    #[test]
    fn question_page_marks_previous_answer() {
        let mut session = QuizSession::new();
        session.begin(fixtures::three_question_quiz());
        session.submit_answer(0, "c").expect("answer accepted");

        let view = QuestionView::from_session(&session).expect("view builds");
        assert_eq!(view.selected, Some("c"));
        assert!(view.is_selected(2));
        assert!(!view.is_selected(0));

        let page = question_page(&view).into_string();
        assert!(page.contains("Question 1 of 3"));
        assert!(page.contains("name=\"position\" value=\"0\""));
        assert!(!page.contains("action=\"/previous\""));
    }

    #[test]
    fn letter_valued_options_select_by_label() {
        let question = Question::new(
            "Which letter comes first?".to_string(),
            vec!["B".to_string(), "A".to_string(), "C".to_string(), "D".to_string()],
            1,
        )
        .expect("question is valid");
        let view = QuestionView {
            title: "letters".to_string(),
            position: 0,
            total: 1,
            answered: 1,
            question: &question,
            selected: Some("A"),
        };

        assert!(view.is_selected(0));
        assert!(!view.is_selected(1));

        let page = question_page(&view).into_string();
        assert_eq!(page.matches("checked").count(), 1);
    }

    #[test]
    fn question_view_needs_active_quiz() {
        assert!(QuestionView::from_session(&QuizSession::new()).is_err());
    }

    #[test]
    fn results_page_shows_score_and_band() {
        let mut session = QuizSession::new();
        session.begin(fixtures::three_question_quiz());
        session.submit_answer(0, "A").expect("answer accepted");
        session.finish().expect("finish works");

        let results = session.results().expect("results available");
        let page = results_page(&results).into_string();

        assert!(page.contains("You scored 1 out of 3"));
        assert!(page.contains("33.3%"));
        assert!(page.contains(results.band.message()));
        assert!(page.contains("not answered"));
    }
}
