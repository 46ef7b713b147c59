pub const CONNECTION_CHECK_PROMPT: &str = "What is 2+2?";

/// Instruction prompt for multiple-choice generation. `{num_questions}` and
/// `{context}` are substituted by [`build_mcq_prompt`].
pub const MCQ_PROMPT_TEMPLATE: &str = "Generate {num_questions} multiple choice questions from this study material.

Study Material:
{context}

For each question:
- Create exactly 4 answer choices (A, B, C, D)
- Make one choice correct and three plausible but incorrect
- Prefer conceptual/testing-of-understanding style questions

Format each question exactly like this:
Question 1: [question text]
A) [option A]
B) [option B]
C) [option C]
D) [option D]
Correct Answer: [A/B/C/D]

Generate all {num_questions} questions now:";

pub fn build_mcq_prompt(context: &str, num_questions: usize) -> String {
    MCQ_PROMPT_TEMPLATE
        .replace("{num_questions}", &num_questions.to_string())
        .replace("{context}", context)
}
