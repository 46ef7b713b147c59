use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::dto::quiz_file::{CorrectAnswer, QuizQuestionFileDto};

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("THINK_BLOCK is a valid regex"));

static OPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-D]\)").expect("OPTION_LINE is a valid regex"));

static ANSWER_LETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)answer\W*([A-D])\b").expect("ANSWER_LETTER is a valid regex")
});

const OPTIONS_PER_QUESTION: usize = 4;
const MIN_LINES_PER_QUESTION: usize = 6;

/// Extracts well-formed questions from model output laid out as
/// `Question N: ...`, four `A)`..`D)` lines and a `Correct Answer: X` line.
/// Blocks that do not fit the layout are dropped.
pub fn parse_mcqs(response_text: &str) -> Vec<QuizQuestionFileDto> {
    let text = THINK_BLOCK.replace_all(response_text, "");

    text.trim()
        .split("Question ")
        .skip(1)
        .filter_map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> Option<QuizQuestionFileDto> {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < MIN_LINES_PER_QUESTION {
        return None;
    }

    let question = format!("Question {}", lines[0].trim_end_matches(':'));

    let mut options = Vec::new();
    let mut answer_line = None;
    for line in &lines[1..] {
        if OPTION_LINE.is_match(line) {
            options.push(line.to_string());
        } else if line.contains("Answer:") || line.contains("Answer**:") {
            answer_line = Some(line.to_string());
            break;
        }
    }

    let answer_line = answer_line?;
    if options.len() != OPTIONS_PER_QUESTION {
        return None;
    }

    let letter = ANSWER_LETTER
        .captures(&answer_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())?;

    Some(QuizQuestionFileDto {
        question,
        options,
        correct_answer: CorrectAnswer::Text(letter),
        raw_answer_line: Some(answer_line),
    })
}
