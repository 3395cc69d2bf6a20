pub mod completion;
pub mod habit;
pub mod leaderboard;
pub mod score;
pub mod stats;
pub mod user;
