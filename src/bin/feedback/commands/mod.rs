pub mod config;
pub mod departments;
pub mod leaderboard;
pub mod levels;
