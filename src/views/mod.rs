use maud::{html, Markup, DOCTYPE};

pub mod quiz;

pub use quiz::{index_page, question_page, results_page, QuestionView};

const STYLESHEET: &str = "
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
.options label { display: block; margin: 0.4rem 0; }
.nav form { display: inline-block; margin-right: 0.5rem; }
.correct { color: #1a7f37; }
.incorrect { color: #cf222e; }
";

/// Wraps `content` in the shared page chrome.
pub fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | Quiz" }
                style { (STYLESHEET) }
            }
            body {
                header { a href="/" { "Quizzes" } }
                main { (content) }
            }
        }
    }
}

pub fn error_page(status: u16, message: &str) -> Markup {
    layout(
        "Error",
        html! {
            h1 { "Something went wrong (" (status) ")" }
            p.error { (message) }
            p { a href="/" { "Back to the quiz list" } }
        },
    )
}
