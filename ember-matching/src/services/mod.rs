pub mod like_service;
pub mod match_service;

pub use like_service::LikeService;
pub use match_service::MatchService;
