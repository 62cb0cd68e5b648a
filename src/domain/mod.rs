pub mod favorite;
pub mod query;
pub mod song;

pub use favorite::{FavoriteRecord, FavoriteSummary};
pub use query::ResolutionQuery;
pub use song::Song;
