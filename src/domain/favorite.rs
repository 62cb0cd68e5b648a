use serde::{Deserialize, Serialize};

/// A persisted, user-owned favorites row. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub artist: String,
    pub lyrics: String,
}

/// Listing projection of a favorites row (no lyrics body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSummary {
    pub id: i64,
    pub title: String,
    pub artist: String,
}

impl FavoriteSummary {
    /// `id: Title — Artist`
    pub fn display_line(&self) -> String {
        format!("{}: {} — {}", self.id, self.title, self.artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_line() {
        let summary = FavoriteSummary {
            id: 7,
            title: "Hello".into(),
            artist: "Adele".into(),
        };
        assert_eq!(summary.display_line(), "7: Hello — Adele");
    }
}
