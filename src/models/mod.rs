pub mod catalog;
pub mod favorite;
pub mod progress;
pub mod user;

pub use catalog::{Episode, Season, TitleCard, TitleDetail, TitleKind};
pub use favorite::FavoriteItem;
pub use progress::{
    ContinueEntry, ProgressMap, ProgressRecord, RemoteProgress, SaveProgressRequest, WatchTarget,
};
pub use user::{AuthUser, LoginResponse};
