mod player;

pub mod api;

pub use api::*;
pub use player::UserInfo;
