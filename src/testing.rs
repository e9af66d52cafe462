use std::sync::Once;

use crate::config::{FieldList, ReplaceMap, ReplacementGroupConfig};
use crate::fields::{AlbumInfo, TrackInfo};

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trace")),
            )
            .with_test_writer()
            .try_init();
    });
}

// Builds a replacement group the way a user would write one. Empty field lists and empty
// mappings are left out of the group entirely.
pub fn group(item_fields: &[&str], album_fields: &[&str], replace: &[(&str, &str)]) -> ReplacementGroupConfig {
    ReplacementGroupConfig {
        item_fields: (!item_fields.is_empty()).then(|| item_fields.iter().copied().collect::<FieldList>()),
        album_fields: (!album_fields.is_empty()).then(|| album_fields.iter().copied().collect::<FieldList>()),
        replace: (!replace.is_empty()).then(|| replace.iter().copied().collect::<ReplaceMap>()),
    }
}

pub fn track(title: Option<&str>, artist: Option<&str>) -> TrackInfo {
    TrackInfo {
        title: title.map(str::to_string),
        artist: artist.map(str::to_string),
        ..Default::default()
    }
}

pub fn album(album: Option<&str>, artist: Option<&str>, tracks: Vec<TrackInfo>) -> AlbumInfo {
    AlbumInfo {
        album: album.map(str::to_string),
        artist: artist.map(str::to_string),
        tracks,
        ..Default::default()
    }
}

pub fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}
