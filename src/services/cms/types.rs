//! Content API Wire Types
//!
//! Response and payload shapes for the Strapi-style content service. Every
//! response wraps entities in `{ "data": ... }` envelopes and every entity is
//! an `{ "id", "attributes" }` pair; relations nest the same shape again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::TitleKind;

/// Envelope around every response body
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Identifier plus scalar fields of one record
#[derive(Debug, Deserialize)]
pub struct Entity<T> {
    pub id: i64,
    pub attributes: T,
}

/// Single relation: `{ "data": entity | null }`, possibly absent entirely
#[derive(Debug, Deserialize)]
pub struct Relation<T> {
    pub data: Option<Entity<T>>,
}

impl<T> Default for Relation<T> {
    fn default() -> Self {
        Self { data: None }
    }
}

/// List relation: `{ "data": [entity, ...] }`; an absent or `null` list
/// reads as empty
#[derive(Debug, Deserialize)]
pub struct RelationList<T> {
    #[serde(
        default = "Vec::new",
        deserialize_with = "null_as_empty_list",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub data: Vec<Entity<T>>,
}

impl<T> Default for RelationList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

fn null_as_empty_list<'de, D, T>(deserializer: D) -> Result<Vec<Entity<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Attribute shapes
// ============================================================================

/// Uploaded media file
#[derive(Debug, Deserialize)]
pub struct MediaAttributes {
    pub url: String,
}

/// Records that only contribute a display name (genres, cast members)
#[derive(Debug, Deserialize)]
pub struct NamedAttributes {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleAttributes {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub kind: TitleKind,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub age_rating: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub poster: Relation<MediaAttributes>,
    #[serde(default)]
    pub backdrop: Relation<MediaAttributes>,
    #[serde(default)]
    pub video: Relation<MediaAttributes>,
    #[serde(default)]
    pub genres: RelationList<NamedAttributes>,
    #[serde(default)]
    pub cast: RelationList<NamedAttributes>,
    #[serde(default)]
    pub seasons: RelationList<SeasonAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonAttributes {
    pub name: String,
    pub number: i64,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub episodes: RelationList<EpisodeAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeAttributes {
    pub name: String,
    pub number: i64,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub video: Relation<MediaAttributes>,
}

/// Title fields carried on denormalizing relations (favorites, progress)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleLiteAttributes {
    pub name: String,
    pub kind: TitleKind,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteAttributes {
    #[serde(default)]
    pub title: Relation<TitleLiteAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressAttributes {
    #[serde(default)]
    pub progress_seconds: f64,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub last_watched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub title: Relation<TitleLiteAttributes>,
    #[serde(default)]
    pub episode: Relation<ProgressEpisodeAttributes>,
}

/// Episode relation on a progress record, populated down to the parent title
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEpisodeAttributes {
    pub name: String,
    pub number: i64,
    #[serde(default)]
    pub season: Relation<ProgressSeasonAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSeasonAttributes {
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub title: Relation<NamedAttributes>,
}

// ============================================================================
// Request payloads
// ============================================================================

/// Mutation envelope: the service expects `{ "data": ... }` around every
/// create/update body
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// Credential payload for `api/auth/local`, sent bare (not data-enveloped)
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct FavoritePayload {
    pub title: i64,
    pub user: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    pub progress_seconds: f64,
    pub duration_seconds: f64,
    pub completed: bool,
    pub last_watched_at: DateTime<Utc>,
    pub user: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_title_list_envelope() {
        let body = r#"{
            "data": [
                {
                    "id": 7,
                    "attributes": {
                        "name": "Nuit Blanche",
                        "slug": "nuit-blanche",
                        "kind": "movie",
                        "year": 2021,
                        "rating": 4.2,
                        "isFeatured": true,
                        "poster": { "data": { "id": 3, "attributes": { "url": "/uploads/poster.jpg" } } }
                    }
                }
            ],
            "meta": { "pagination": { "page": 1 } }
        }"#;

        let envelope: Envelope<Vec<Entity<TitleAttributes>>> = serde_json::from_str(body).unwrap();
        let entity = &envelope.data[0];

        assert_eq!(entity.id, 7);
        assert_eq!(entity.attributes.name, "Nuit Blanche");
        assert_eq!(entity.attributes.kind, TitleKind::Movie);
        assert!(entity.attributes.is_featured);
        assert_eq!(
            entity.attributes.poster.data.as_ref().unwrap().attributes.url,
            "/uploads/poster.jpg"
        );
        // relations the query did not populate fall back to empty
        assert!(entity.attributes.genres.data.is_empty());
        assert!(entity.attributes.backdrop.data.is_none());
    }

    #[test]
    fn test_parses_null_relation() {
        let body = r#"{
            "data": {
                "id": 12,
                "attributes": { "title": { "data": null } }
            }
        }"#;

        let envelope: Envelope<Entity<FavoriteAttributes>> = serde_json::from_str(body).unwrap();
        assert!(envelope.data.attributes.title.data.is_none());
    }

    #[test]
    fn test_parses_null_list_relation_as_empty() {
        let body = r#"{
            "data": {
                "id": 3,
                "attributes": {
                    "name": "Emberline",
                    "kind": "movie",
                    "genres": { "data": null }
                }
            }
        }"#;

        let envelope: Envelope<Entity<TitleAttributes>> = serde_json::from_str(body).unwrap();
        assert!(envelope.data.attributes.genres.data.is_empty());
    }

    #[test]
    fn test_parses_progress_with_nested_episode_relation() {
        let body = r#"{
            "data": {
                "id": 9,
                "attributes": {
                    "progressSeconds": 150,
                    "durationSeconds": 200,
                    "completed": false,
                    "lastWatchedAt": "2024-03-01T20:15:00.000Z",
                    "episode": {
                        "data": {
                            "id": 31,
                            "attributes": {
                                "name": "Pilote",
                                "number": 1,
                                "season": {
                                    "data": {
                                        "id": 4,
                                        "attributes": {
                                            "number": 1,
                                            "title": { "data": { "id": 2, "attributes": { "name": "Horizons" } } }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }"#;

        let envelope: Envelope<Entity<ProgressAttributes>> = serde_json::from_str(body).unwrap();
        let attrs = &envelope.data.attributes;

        assert_eq!(attrs.progress_seconds, 150.0);
        assert_eq!(attrs.duration_seconds, 200.0);
        assert!(attrs.last_watched_at.is_some());

        let episode = attrs.episode.data.as_ref().unwrap();
        let season = episode.attributes.season.data.as_ref().unwrap();
        assert_eq!(season.attributes.number, Some(1));
        assert_eq!(
            season.attributes.title.data.as_ref().unwrap().attributes.name,
            "Horizons"
        );
    }

    #[test]
    fn test_progress_payload_omits_absent_target() {
        let payload = ProgressPayload {
            progress_seconds: 90.0,
            duration_seconds: 1800.0,
            completed: false,
            last_watched_at: Utc::now(),
            user: 5,
            title: Some(7),
            episode: None,
        };

        let json = serde_json::to_value(Data { data: payload }).unwrap();
        assert_eq!(json["data"]["title"], 7);
        assert_eq!(json["data"]["user"], 5);
        assert!(json["data"].get("episode").is_none());
        assert!(json["data"]["lastWatchedAt"].is_string());
    }
}
