pub mod completion_repository;
pub mod habit_repository;
pub mod score_repository;
pub mod user_repository;
