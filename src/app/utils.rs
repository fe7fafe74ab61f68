// src/app/utils.rs
use chrono::NaiveDate;

use crate::app::types::Tile;

/// "2019-11-12" → "Nov 12, 2019". Anything unparseable is shown as-is.
pub(crate) fn format_release_date(raw: &str) -> String {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// One-line summary of the focused tile: name, rating and release date when known.
pub(crate) fn tile_caption(tile: &Tile) -> String {
    let mut parts = vec![tile.name.trim().to_string()];
    if let Some(rating) = tile.rating.as_deref().filter(|r| !r.trim().is_empty()) {
        parts.push(rating.trim().to_string());
    }
    if let Some(date) = tile.release_date.as_deref().filter(|d| !d.trim().is_empty()) {
        parts.push(format_release_date(date));
    }
    parts.retain(|p| !p.is_empty());
    parts.join("  •  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_dates_are_humanised() {
        assert_eq!(format_release_date("2019-11-12"), "Nov 12, 2019");
        assert_eq!(format_release_date(" 2021-03-05 "), "Mar 5, 2021");
        assert_eq!(format_release_date("1990"), "1990");
    }

    #[test]
    fn caption_skips_missing_fields() {
        let mut tile = Tile {
            name: "Loki".into(),
            rating: Some("TV-14".into()),
            release_date: Some("2021-06-09".into()),
            ..Tile::default()
        };
        assert_eq!(tile_caption(&tile), "Loki  •  TV-14  •  Jun 9, 2021");

        tile.rating = None;
        tile.release_date = Some(String::new());
        assert_eq!(tile_caption(&tile), "Loki");
    }
}
