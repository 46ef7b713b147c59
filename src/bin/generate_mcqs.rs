use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;
use quiz_smith::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::Quiz,
    repositories::{FsQuizRepository, QuizRepository},
    services::{
        generation_service::{GenerationRequest, GenerationService},
        model_service::{check_connection, OpenAiCompletionModel},
        retrieval_service::{ContentRetriever, HttpRetriever, StaticRetriever},
        terminal_quiz::run_terminal_quiz,
    },
};

/// Generate a multiple-choice quiz file from indexed study material, or take
/// one in the terminal.
#[derive(Debug, Parser)]
#[command(name = "generate-mcqs", version)]
struct Cli {
    /// Topic used to query the study material
    #[arg(required_unless_present_any = ["check", "take"])]
    topic: Option<String>,

    /// Number of questions to request from the model
    #[arg(short = 'n', long)]
    num_questions: Option<usize>,

    /// Number of chunks to retrieve from the vector store
    #[arg(short = 'k', long)]
    num_chunks: Option<usize>,

    /// Read study material from a file instead of the retrieval service
    #[arg(long, value_name = "PATH")]
    context_file: Option<PathBuf>,

    /// Only test the inference API connection
    #[arg(long)]
    check: bool,

    /// Print the parsed questions without writing a quiz file
    #[arg(long)]
    dry_run: bool,

    /// Take an existing quiz file from the quiz directory in the terminal
    #[arg(long, value_name = "QUIZ_ID", conflicts_with_all = ["topic", "check", "play"])]
    take: Option<String>,

    /// Take the generated quiz in the terminal right away
    #[arg(long, conflicts_with = "check")]
    play: bool,
}

fn print_quiz(quiz: &Quiz) {
    println!("{}", "=".repeat(60));
    println!("{} ({} questions)", quiz.title(), quiz.len());
    println!("{}", "=".repeat(60));
    for question in &quiz.questions {
        println!("\n{}", question.prompt);
        for option in &question.options {
            println!("   {}", option);
        }
        println!("   Correct Answer: {}", question.correct_label());
        println!("{}", "-".repeat(40));
    }
}

async fn retriever_for(cli: &Cli, config: &Config) -> AppResult<Arc<dyn ContentRetriever>> {
    match &cli.context_file {
        Some(path) => {
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                AppError::NotFound(format!("Cannot read {}: {}", path.display(), e))
            })?;
            log::info!("Using study material from {}", path.display());
            Ok(Arc::new(StaticRetriever::from_text(
                content,
                Some(path.display().to_string()),
            )))
        }
        None => Ok(Arc::new(HttpRetriever::new(config))),
    }
}

async fn take_quiz(quiz: Quiz) -> AppResult<()> {
    tokio::task::spawn_blocking(move || {
        run_terminal_quiz(quiz, std::io::stdin().lock(), std::io::stdout().lock())
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Quiz task failed: {}", e)))??;
    Ok(())
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = Config::from_env();

    if let Some(quiz_id) = &cli.take {
        let quiz = FsQuizRepository::new(config.quiz_dir.clone())
            .load_quiz(quiz_id)
            .await?;
        return take_quiz(quiz).await;
    }

    config.validate_for_generation()?;

    let model = Arc::new(OpenAiCompletionModel::new(&config));

    if cli.check {
        check_connection(model.as_ref()).await?;
        println!("Inference API is working (model {})", config.llm_model);
        return Ok(());
    }

    let topic = cli
        .topic
        .clone()
        .ok_or_else(|| AppError::ValidationError("A topic is required".to_string()))?;

    let mut request = GenerationRequest::new(topic, &config);
    if let Some(n) = cli.num_questions {
        request.num_questions = n;
    }
    if let Some(k) = cli.num_chunks {
        request.num_chunks = k;
    }

    let service = GenerationService::new(
        retriever_for(&cli, &config).await?,
        model,
        Arc::new(FsQuizRepository::new(config.quiz_dir.clone())),
        &config,
    );

    let quiz = if cli.dry_run {
        service
            .generate(&request, chrono::Local::now().naive_local())
            .await?
    } else {
        service.generate_and_save(&request).await?
    };

    if !cli.dry_run {
        println!("Saved to {}", config.quiz_dir.join(&quiz.id).display());
    }
    if cli.play {
        return take_quiz(quiz).await;
    }

    print_quiz(&quiz);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
