// src/app/catalog.rs
// Catalog document → rows of tiles.
//
// The home document lists containers; each container's `set` is either a full
// row or a `SetRef` that needs a second fetch to resolve into the same shape.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app::error::CatalogError;
use crate::app::fetch::Fetcher;
use crate::app::types::{Catalog, Tile, TileSet};
use crate::config::AppConfig;

/// Fetch and parse the whole catalog. Blocks until every referenced row is resolved.
pub fn load_catalog(fetcher: &dyn Fetcher, cfg: &AppConfig) -> Result<Catalog, CatalogError> {
    info!("Fetching catalog {}", cfg.home_url);
    let body = fetcher.fetch(&cfg.home_url)?;
    let home: Value = serde_json::from_slice(&body)?;

    let containers = home
        .pointer("/data/StandardCollection/containers")
        .and_then(Value::as_array)
        .ok_or(CatalogError::Missing("data.StandardCollection.containers"))?;

    let mut rows = Vec::with_capacity(containers.len());
    for (idx, container) in containers.iter().enumerate() {
        let Some(set) = container.get("set") else {
            warn!("container {idx} has no set; skipping");
            continue;
        };

        let row = if set.get("type").and_then(Value::as_str) == Some("SetRef") {
            resolve_set_ref(fetcher, cfg, set)
        } else {
            parse_set(set)
        };

        match row {
            Some(row) if !row.tiles.is_empty() => rows.push(row),
            Some(row) => debug!("row `{}` has no usable tiles; skipping", row.name),
            None => warn!("container {idx} could not be resolved; skipping"),
        }
    }

    if rows.is_empty() {
        return Err(CatalogError::Empty);
    }

    let catalog = Catalog::new(rows);
    info!(
        "Catalog ready: {} rows, {} tiles",
        catalog.row_count(),
        catalog.tile_count()
    );
    Ok(catalog)
}

fn resolve_set_ref(fetcher: &dyn Fetcher, cfg: &AppConfig, set: &Value) -> Option<TileSet> {
    let ref_id = set.get("refId").and_then(Value::as_str)?;
    let url = cfg.set_ref_url_for(ref_id);

    let body = match fetcher.fetch(&url) {
        Ok(b) => b,
        Err(e) => {
            warn!("set ref {ref_id}: {e}");
            return None;
        }
    };
    let doc: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!("set ref {ref_id}: bad json: {e}");
            return None;
        }
    };

    // `data` holds exactly one set keyed by its kind (CuratedSet, TrendingSet, ...)
    let inner = doc.get("data").and_then(first_value)?;
    parse_set(inner)
}

/// Parse one set object (not its parent) into a row.
pub fn parse_set(set: &Value) -> Option<TileSet> {
    let name = set
        .pointer("/text/title/full/set/default/content")
        .and_then(Value::as_str)?
        .to_string();

    let tiles = set
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_item).collect())
        .unwrap_or_default();

    Some(TileSet { name, tiles })
}

fn parse_item(item: &Value) -> Option<Tile> {
    let artwork_url = item
        .pointer("/image/tile/1.78")
        .and_then(first_value)
        .and_then(|v| v.pointer("/default/url"))
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())?
        .to_string();

    let name = item
        .pointer("/text/title/full")
        .and_then(first_value)
        .and_then(|v| v.pointer("/default/content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(Tile {
        name,
        rating: string_at(item, "/ratings/0/value"),
        release_date: string_at(item, "/releases/0/releaseDate"),
        artwork_url,
        video_url: string_at(item, "/videoArt/0/mediaMetadata/urls/0/url"),
    })
}

fn string_at(v: &Value, pointer: &str) -> Option<String> {
    v.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_value(v: &Value) -> Option<&Value> {
    match v {
        Value::Object(map) => map.values().next(),
        Value::Array(arr) => arr.first(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::FetchError;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<String, Vec<u8>>);

    impl Fetcher for MapFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.0.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn item(title: &str, art: &str, video: Option<&str>) -> Value {
        let mut v = json!({
            "text": { "title": { "full": { "program": { "default": { "content": title } } } } },
            "ratings": [ { "value": "TV-PG" } ],
            "releases": [ { "releaseDate": "2019-11-12" } ],
            "image": { "tile": { "1.78": { "program": { "default": { "url": art } } } } },
            "videoArt": []
        });
        if let Some(url) = video {
            v["videoArt"] = json!([ { "mediaMetadata": { "urls": [ { "url": url } ] } } ]);
        }
        v
    }

    fn set(name: &str, items: Vec<Value>) -> Value {
        json!({
            "type": "CuratedSet",
            "text": { "title": { "full": { "set": { "default": { "content": name } } } } },
            "items": items
        })
    }

    fn cfg() -> AppConfig {
        AppConfig {
            home_url: "mem://home".into(),
            set_ref_url: "mem://sets/{ref_id}".into(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn parses_inline_and_referenced_rows() {
        let home = json!({ "data": { "StandardCollection": { "containers": [
            { "set": set("New", vec![item("Loki", "http://a/1", Some("http://v/1")), item("Soul", "http://a/2", None)]) },
            { "set": { "type": "SetRef", "refId": "abc" } },
        ] } } });
        let referenced = json!({ "data": { "TrendingSet": set("Trending", vec![item("Up", "http://a/3", None)]) } });

        let fetcher = MapFetcher(HashMap::from([
            ("mem://home".to_string(), home.to_string().into_bytes()),
            ("mem://sets/abc".to_string(), referenced.to_string().into_bytes()),
        ]));

        let catalog = load_catalog(&fetcher, &cfg()).unwrap();
        assert_eq!(catalog.row_count(), 2);
        assert_eq!(catalog.rows[0].name, "New");
        assert_eq!(catalog.rows[1].name, "Trending");

        let loki = &catalog.rows[0].tiles[0];
        assert_eq!(loki.name, "Loki");
        assert_eq!(loki.rating.as_deref(), Some("TV-PG"));
        assert_eq!(loki.release_date.as_deref(), Some("2019-11-12"));
        assert_eq!(loki.artwork_url, "http://a/1");
        assert_eq!(loki.video(), Some("http://v/1"));
        assert_eq!(catalog.rows[0].tiles[1].video(), None);
    }

    #[test]
    fn unresolvable_ref_is_skipped_not_fatal() {
        let home = json!({ "data": { "StandardCollection": { "containers": [
            { "set": { "type": "SetRef", "refId": "missing" } },
            { "set": set("Kept", vec![item("A", "http://a/1", None)]) },
        ] } } });
        let fetcher = MapFetcher(HashMap::from([(
            "mem://home".to_string(),
            home.to_string().into_bytes(),
        )]));

        let catalog = load_catalog(&fetcher, &cfg()).unwrap();
        assert_eq!(catalog.row_count(), 1);
        assert_eq!(catalog.rows[0].name, "Kept");
    }

    #[test]
    fn items_without_artwork_are_dropped() {
        let mut broken = item("NoArt", "", None);
        broken["image"] = json!({});
        let row = parse_set(&set("Row", vec![broken, item("Ok", "http://a/9", None)])).unwrap();
        assert_eq!(row.tiles.len(), 1);
        assert_eq!(row.tiles[0].name, "Ok");
    }

    #[test]
    fn empty_catalog_is_fatal() {
        let home = json!({ "data": { "StandardCollection": { "containers": [
            { "set": set("Empty", vec![]) },
        ] } } });
        let fetcher = MapFetcher(HashMap::from([(
            "mem://home".to_string(),
            home.to_string().into_bytes(),
        )]));
        assert!(matches!(
            load_catalog(&fetcher, &cfg()),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn fetch_and_shape_failures_are_fatal() {
        let nothing = MapFetcher(HashMap::new());
        assert!(matches!(
            load_catalog(&nothing, &cfg()),
            Err(CatalogError::Fetch(_))
        ));

        let wrong = MapFetcher(HashMap::from([(
            "mem://home".to_string(),
            br#"{"data":{}}"#.to_vec(),
        )]));
        assert!(matches!(
            load_catalog(&wrong, &cfg()),
            Err(CatalogError::Missing(_))
        ));
    }
}
