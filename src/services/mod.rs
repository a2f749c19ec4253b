pub mod comment_service;
pub mod moderation_service;
pub mod user_service;
pub mod vote_aggregator;
