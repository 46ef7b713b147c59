use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartQuizForm {
    #[validate(length(min = 1, max = 255))]
    pub quiz: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerForm {
    pub position: usize,

    #[validate(length(min = 1, max = 500, message = "Choose an answer before submitting"))]
    pub choice: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_form_requires_a_choice() {
        let form = AnswerForm {
            position: 0,
            choice: String::new(),
        };
        assert!(form.validate().is_err());

        let form = AnswerForm {
            position: 0,
            choice: "B".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn start_form_requires_quiz_id() {
        let form = StartQuizForm {
            quiz: String::new(),
        };
        assert!(form.validate().is_err());
    }
}
