//! Envelope Normalization
//!
//! Pure functions flattening the content service's nested entity/attribute
//! envelopes into the view models pages render. Absent relations degrade to
//! empty lists or `None`, never to an error.

use url::Url;

use super::types::{
    Entity, FavoriteAttributes, MediaAttributes, ProgressAttributes, Relation, SeasonAttributes,
    TitleAttributes,
};
use crate::models::{
    ContinueEntry, Episode, FavoriteItem, RemoteProgress, Season, TitleCard, TitleDetail,
    TitleKind,
};

/// Display name used when a progress record resolves no title at all
const FALLBACK_TITLE: &str = "Lecture";

/// Resolve an uploaded media reference to an absolute URL.
///
/// Absolute URLs pass through untouched; relative ones are prefixed with the
/// configured base address.
pub fn resolve_media_url(base_url: &Url, media: &Relation<MediaAttributes>) -> Option<String> {
    let url = &media.data.as_ref()?.attributes.url;
    if url.starts_with("http") {
        return Some(url.clone());
    }
    Some(format!("{}{}", base_url.as_str().trim_end_matches('/'), url))
}

/// Flatten a title entity to its catalog-card shape
pub fn map_title_card(base_url: &Url, entity: &Entity<TitleAttributes>) -> TitleCard {
    let attrs = &entity.attributes;
    TitleCard {
        id: entity.id,
        name: attrs.name.clone(),
        kind: attrs.kind,
        year: attrs.year,
        rating: attrs.rating,
        poster_url: resolve_media_url(base_url, &attrs.poster),
        backdrop_url: resolve_media_url(base_url, &attrs.backdrop),
        is_featured: attrs.is_featured,
        progress: None,
    }
}

/// Flatten a fully populated title entity, including genre and cast names
/// and the season/episode tree
pub fn map_title_detail(base_url: &Url, entity: &Entity<TitleAttributes>) -> TitleDetail {
    let card = map_title_card(base_url, entity);
    let attrs = &entity.attributes;
    TitleDetail {
        id: card.id,
        name: card.name,
        kind: card.kind,
        year: card.year,
        rating: card.rating,
        poster_url: card.poster_url,
        backdrop_url: card.backdrop_url,
        is_featured: card.is_featured,
        synopsis: attrs.synopsis.clone(),
        age_rating: attrs.age_rating.clone(),
        video_url: resolve_media_url(base_url, &attrs.video),
        genres: attrs
            .genres
            .data
            .iter()
            .map(|genre| genre.attributes.name.clone())
            .collect(),
        cast: attrs
            .cast
            .data
            .iter()
            .map(|member| member.attributes.name.clone())
            .collect(),
        seasons: attrs
            .seasons
            .data
            .iter()
            .map(|season| map_season(base_url, season))
            .collect(),
    }
}

fn map_season(base_url: &Url, entity: &Entity<SeasonAttributes>) -> Season {
    Season {
        id: entity.id,
        name: entity.attributes.name.clone(),
        number: entity.attributes.number,
        synopsis: entity.attributes.synopsis.clone(),
        episodes: entity
            .attributes
            .episodes
            .data
            .iter()
            .map(|episode| Episode {
                id: episode.id,
                name: episode.attributes.name.clone(),
                number: episode.attributes.number,
                duration: episode.attributes.duration,
                video_url: resolve_media_url(base_url, &episode.attributes.video),
            })
            .collect(),
    }
}

/// Flatten a favorite entity, or `None` when its title relation is gone.
///
/// A favorite without a title is a dangling record the caller filters out.
pub fn map_favorite(entity: &Entity<FavoriteAttributes>) -> Option<FavoriteItem> {
    let title = entity.attributes.title.data.as_ref()?;
    Some(FavoriteItem {
        id: entity.id,
        title_id: title.id,
        name: title.attributes.name.clone(),
        kind: title.attributes.kind,
        year: title.attributes.year,
    })
}

/// Carry a server-side progress record forward so a later save updates it in
/// place instead of creating a duplicate
pub fn map_remote_progress(entity: &Entity<ProgressAttributes>) -> RemoteProgress {
    RemoteProgress {
        id: entity.id,
        progress_seconds: entity.attributes.progress_seconds,
        duration_seconds: entity.attributes.duration_seconds,
        completed: entity.attributes.completed,
        last_watched_at: entity.attributes.last_watched_at,
    }
}

/// Build a continue-watching row from a progress entity.
///
/// Returns `None` when the record links neither an episode nor a title:
/// there is nothing left to resume.
pub fn map_continue_entry(entity: &Entity<ProgressAttributes>) -> Option<ContinueEntry> {
    let attrs = &entity.attributes;
    let title = attrs.title.data.as_ref();
    let episode = attrs.episode.data.as_ref();
    let season = episode.and_then(|episode| episode.attributes.season.data.as_ref());

    let watch_id = episode.map(|episode| episode.id).or_else(|| title.map(|title| title.id))?;

    // Fallback chain: the episode's series name, then the directly linked
    // title, then the episode's own name
    let title_name = non_empty(
        season
            .and_then(|season| season.attributes.title.data.as_ref())
            .map(|title| title.attributes.name.clone()),
    )
    .or_else(|| non_empty(title.map(|title| title.attributes.name.clone())))
    .or_else(|| non_empty(episode.map(|episode| episode.attributes.name.clone())))
    .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let subtitle = match episode {
        Some(episode) => {
            let season_number = season
                .and_then(|season| season.attributes.number)
                .map(|number| number.to_string())
                .unwrap_or_else(|| "?".to_string());
            Some(format!("S{} · Épisode {}", season_number, episode.attributes.number))
        }
        None => title.map(|title| match title.attributes.kind {
            TitleKind::Movie => "Film".to_string(),
            TitleKind::Series => "Série".to_string(),
        }),
    };

    let remaining = if attrs.duration_seconds > attrs.progress_seconds {
        Some(format_remaining(attrs.duration_seconds - attrs.progress_seconds))
    } else {
        None
    };

    Some(ContinueEntry {
        id: entity.id,
        watch_id,
        title_name,
        subtitle,
        progress_percent: progress_percent(attrs.progress_seconds, attrs.duration_seconds),
        remaining,
    })
}

fn non_empty(name: Option<String>) -> Option<String> {
    name.filter(|name| !name.is_empty())
}

/// Whole percent watched, capped at 100. A zero or negative duration yields
/// 0 rather than a division error.
fn progress_percent(progress_seconds: f64, duration_seconds: f64) -> u8 {
    if duration_seconds <= 0.0 {
        return 0;
    }
    (progress_seconds / duration_seconds * 100.0).round().min(100.0) as u8
}

fn format_remaining(seconds: f64) -> String {
    let minutes = ((seconds / 60.0).round() as i64).max(1);
    format!("{} min restantes", minutes)
}
