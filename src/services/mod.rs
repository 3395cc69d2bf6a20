pub mod leaderboard_service;
pub mod score_service;
pub mod stats_service;
