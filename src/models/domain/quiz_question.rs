use serde::Serialize;

use crate::errors::{AppError, AppResult};

/// One multiple-choice item. Immutable once built; `correct_index` always
/// points into `options`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

/// Display label for an option position: `A`, `B`, ... then the number.
pub fn option_label(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        (index + 1).to_string()
    }
}

/// Inverse of [`option_label`] for single-letter labels.
pub fn label_index(label: &str) -> Option<usize> {
    let mut chars = label.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

impl Question {
    pub fn new(prompt: String, options: Vec<String>, correct_index: usize) -> AppResult<Self> {
        if prompt.trim().is_empty() {
            return Err(AppError::MalformedQuiz(
                "question text cannot be empty".to_string(),
            ));
        }

        if options.len() < 2 {
            return Err(AppError::MalformedQuiz(format!(
                "question '{}' needs at least two options, found {}",
                prompt,
                options.len()
            )));
        }

        if options.iter().any(|o| o.trim().is_empty()) {
            return Err(AppError::MalformedQuiz(format!(
                "question '{}' has an empty option",
                prompt
            )));
        }

        if correct_index >= options.len() {
            return Err(AppError::MalformedQuiz(format!(
                "question '{}' marks option {} as correct but only has {} options",
                prompt,
                option_label(correct_index),
                options.len()
            )));
        }

        Ok(Self {
            prompt,
            options,
            correct_index,
        })
    }

    pub fn correct_label(&self) -> String {
        option_label(self.correct_index)
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    /// Labelled options in display order.
    pub fn labelled_options(&self) -> impl Iterator<Item = (String, &str)> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, text)| (option_label(i), text.as_str()))
    }

    /// Position of the option a choice refers to. A valid label always wins,
    /// so letter-valued options cannot be confused with their neighbours.
    pub fn choice_index(&self, choice: &str) -> Option<usize> {
        let choice = choice.trim();
        label_index(choice)
            .filter(|index| *index < self.options.len())
            .or_else(|| self.options.iter().position(|o| o.trim() == choice))
    }

    pub fn is_correct(&self, choice: &str) -> bool {
        self.choice_index(choice) == Some(self.correct_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new(
            "Which gas do plants absorb?".to_string(),
            vec![
                "A) Oxygen".to_string(),
                "B) Carbon dioxide".to_string(),
                "C) Nitrogen".to_string(),
                "D) Helium".to_string(),
            ],
            1,
        )
        .expect("sample question is valid")
    }

    #[test]
    fn labels_follow_option_positions() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(3), "D");
        assert_eq!(option_label(26), "27");
        assert_eq!(label_index("c"), Some(2));
        assert_eq!(label_index("AB"), None);
        assert_eq!(label_index("7"), None);
    }

    #[test]
    fn is_correct_matches_label_or_text() {
        let question = sample();

        assert!(question.is_correct("B"));
        assert!(question.is_correct(" b "));
        assert!(question.is_correct("B) Carbon dioxide"));
        assert!(!question.is_correct("A"));
        assert!(!question.is_correct("X"));
    }

    #[test]
    fn letter_valued_options_are_judged_by_label() {
        let question = Question::new(
            "Which letter comes first?".to_string(),
            vec!["B".to_string(), "A".to_string(), "C".to_string(), "D".to_string()],
            1,
        )
        .expect("question is valid");

        assert_eq!(question.choice_index("A"), Some(0));
        assert!(!question.is_correct("A"));
        assert!(question.is_correct("B"));
        assert!(question.is_correct("b"));
        assert!(!question.is_correct("E"));
    }

    #[test]
    fn rejects_correct_marker_outside_options() {
        let result = Question::new(
            "Pick one".to_string(),
            vec!["yes".to_string(), "no".to_string()],
            2,
        );

        assert!(matches!(result, Err(AppError::MalformedQuiz(_))));
    }

    #[test]
    fn rejects_blank_prompt_and_single_option() {
        assert!(Question::new("  ".to_string(), vec!["a".into(), "b".into()], 0).is_err());
        assert!(Question::new("Q".to_string(), vec!["a".into()], 0).is_err());
        assert!(Question::new("Q".to_string(), vec!["a".into(), " ".into()], 0).is_err());
    }
}
