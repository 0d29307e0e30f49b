use serde::{Deserialize, Serialize};

use super::catalog::TitleKind;

/// A user's saved title, denormalized for list rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    /// Identifier of the favorite record itself, used for removal
    pub id: i64,
    pub title_id: i64,
    pub name: String,
    pub kind: TitleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}
