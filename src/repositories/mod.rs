pub mod quiz_repository;
pub mod session_repository;

pub use quiz_repository::{FsQuizRepository, QuizRepository};
pub use session_repository::{InMemorySessionStore, SessionStore};
