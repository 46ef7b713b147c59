use std::io::{BufRead, Write};

use crate::{
    errors::AppResult,
    models::{
        domain::{
            quiz_question::{label_index, option_label},
            Quiz, SessionPhase,
        },
        dto::response::QuizResults,
    },
    services::quiz_session_service::QuizSession,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Answer(String),
    Skip,
    Quit,
}

fn parse_command(line: &str, option_count: usize) -> Option<Command> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("skip") {
        return Some(Command::Skip);
    }
    if line.eq_ignore_ascii_case("quit") {
        return Some(Command::Quit);
    }
    label_index(line)
        .filter(|index| *index < option_count)
        .map(|index| Command::Answer(option_label(index)))
}

/// Prompts until the line is a usable command. End of input counts as `quit`.
fn read_command<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    option_count: usize,
) -> AppResult<Command> {
    let labels: Vec<String> = (0..option_count).map(option_label).collect();

    loop {
        write!(output, "\nYour answer ({}): ", labels.join("/"))?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Command::Quit);
        }

        match parse_command(&line, option_count) {
            Some(command) => return Ok(command),
            None => writeln!(
                output,
                "Invalid input. Enter {}, 'skip' or 'quit'.",
                labels.join(", ")
            )?,
        }
    }
}

/// Plays `quiz` on a terminal through the same [`QuizSession`] state machine
/// the web handlers use. Skipped questions stay unanswered; `quit` finishes early.
pub fn run_terminal_quiz<R: BufRead, W: Write>(
    quiz: Quiz,
    mut input: R,
    mut output: W,
) -> AppResult<QuizResults> {
    let total = quiz.len();
    writeln!(output, "{}", "=".repeat(60))?;
    writeln!(output, "{} ({} questions)", quiz.title(), total)?;
    writeln!(output, "Type a letter to answer, 'skip' to skip a question or 'quit' to stop.")?;
    writeln!(output, "{}", "=".repeat(60))?;

    let mut session = QuizSession::new();
    session.begin(quiz);

    while session.phase() == SessionPhase::InProgress {
        let position = session.state().position;
        let question = session.current_question()?.clone();

        writeln!(output, "\nQuestion {}/{}:", position + 1, total)?;
        writeln!(output, "   {}", question.prompt)?;
        for option in &question.options {
            writeln!(output, "   {}", option)?;
        }

        match read_command(&mut input, &mut output, question.options.len())? {
            Command::Answer(label) => {
                session.submit_answer(position, &label)?;
                if question.is_correct(&label) {
                    writeln!(output, "Correct!")?;
                } else {
                    writeln!(output, "Incorrect. The correct answer is {}", question.correct_label())?;
                }
                session.advance()?;
            }
            Command::Skip => {
                writeln!(output, "Question skipped.")?;
                session.advance()?;
            }
            Command::Quit => {
                writeln!(output, "Exiting quiz...")?;
                session.finish()?;
            }
        }

        if session.phase() == SessionPhase::InProgress {
            writeln!(
                output,
                "Progress: {}/{} | Score: {}/{}",
                position + 1,
                total,
                session.score(),
                session.state().answers.len()
            )?;
        }
    }

    let results = session.results()?;
    let answered = session.state().answers.len();
    print_results(&results, answered, &mut output)?;
    Ok(results)
}

fn print_results<W: Write>(results: &QuizResults, answered: usize, output: &mut W) -> AppResult<()> {
    writeln!(output, "\n{}", "=".repeat(60))?;
    writeln!(output, "Quiz completed: {}", results.title)?;
    writeln!(output, "   Correct answers: {}", results.score)?;
    writeln!(output, "   Wrong answers: {}", answered - results.score)?;
    writeln!(output, "   Skipped: {}", results.total - answered)?;
    writeln!(output, "   Total questions: {}", results.total)?;
    writeln!(
        output,
        "   Score: {}/{} ({:.1}%)",
        results.score, results.total, results.percentage
    )?;
    writeln!(output, "{}", results.band.message())?;
    writeln!(output, "{}", "-".repeat(60))?;
    Ok(())
}
