//! Name-keyed field access over the host's track and album metadata.
//!
//! The rewriter only ever talks to [`FieldAccess`] and [`AlbumView`]. [`TrackInfo`] and
//! [`AlbumInfo`] are the concrete shapes delivered by the host's autotagger during import.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// A textual field value: a single string, or an ordered list of strings for multi-valued tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// An empty string or an empty list. Empty values are never rewritten.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Single(s) => s.is_empty(),
            FieldValue::Multi(xs) => xs.is_empty(),
        }
    }

    fn from_json(value: &serde_json::Value) -> Option<FieldValue> {
        match value {
            serde_json::Value::String(s) => Some(FieldValue::Single(s.clone())),
            serde_json::Value::Array(xs) => xs
                .iter()
                .map(|x| x.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::Multi),
            _ => None,
        }
    }

    fn into_json(self) -> serde_json::Value {
        match self {
            FieldValue::Single(s) => serde_json::Value::String(s),
            FieldValue::Multi(xs) => serde_json::Value::Array(xs.into_iter().map(serde_json::Value::String).collect()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Single(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Single(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(xs: Vec<String>) -> Self {
        FieldValue::Multi(xs)
    }
}

pub trait FieldAccess {
    /// The textual value of `name`, or `None` if the entity has no such field, the field is unset,
    /// or the field is not textual.
    fn get_field(&self, name: &str) -> Option<FieldValue>;

    fn set_field(&mut self, name: &str, value: FieldValue);
}

pub trait AlbumView: FieldAccess {
    type Track: FieldAccess;

    fn tracks_mut(&mut self) -> &mut [Self::Track];
}

// Generates the name-keyed accessors for a metadata struct. `single` fields are `Option<String>`,
// `multi` fields are `Option<Vec<String>>`, `other` fields are non-textual and never exposed, and
// any remaining name is looked up in the `flex` map.
macro_rules! impl_field_access {
    ($ty:ty, single: [$($s:ident),* $(,)?], multi: [$($m:ident),* $(,)?], other: [$($o:ident),* $(,)?]) => {
        impl FieldAccess for $ty {
            fn get_field(&self, name: &str) -> Option<FieldValue> {
                match name {
                    $(stringify!($s) => self.$s.clone().map(FieldValue::Single),)*
                    $(stringify!($m) => self.$m.clone().map(FieldValue::Multi),)*
                    $(stringify!($o) => None,)*
                    _ => self.flex.get(name).and_then(FieldValue::from_json),
                }
            }

            fn set_field(&mut self, name: &str, value: FieldValue) {
                const DECLARED: &[&str] = &[$(stringify!($s),)* $(stringify!($m),)* $(stringify!($o),)*];
                match (name, value) {
                    $((stringify!($s), FieldValue::Single(v)) => self.$s = Some(v),)*
                    $((stringify!($m), FieldValue::Multi(v)) => self.$m = Some(v),)*
                    (_, _) if DECLARED.contains(&name) => {
                        trace!("Ignoring value of the wrong kind for field {name}");
                    }
                    (_, value) => {
                        self.flex.insert(name.to_string(), value.into_json());
                    }
                }
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub title: Option<String>,
    pub track_id: Option<String>,
    pub release_track_id: Option<String>,
    pub artist: Option<String>,
    pub artist_id: Option<String>,
    pub artists: Option<Vec<String>>,
    pub artists_ids: Option<Vec<String>>,
    pub artist_sort: Option<String>,
    pub artists_sort: Option<Vec<String>>,
    pub artist_credit: Option<String>,
    pub artists_credit: Option<Vec<String>>,
    pub album: Option<String>,
    pub disctitle: Option<String>,
    pub media: Option<String>,
    pub lyricist: Option<String>,
    pub composer: Option<String>,
    pub composer_sort: Option<String>,
    pub arranger: Option<String>,
    pub track_alt: Option<String>,
    pub work: Option<String>,
    pub work_disambig: Option<String>,
    pub genre: Option<String>,
    pub data_source: Option<String>,
    pub data_url: Option<String>,

    pub index: Option<u32>,
    pub medium: Option<u32>,
    pub medium_index: Option<u32>,
    pub medium_total: Option<u32>,
    pub length: Option<f64>,
    pub bpm: Option<u32>,

    /// Attributes the host attached that are not modelled above.
    #[serde(flatten)]
    pub flex: BTreeMap<String, serde_json::Value>,
}

impl_field_access!(
    TrackInfo,
    single: [
        title, track_id, release_track_id, artist, artist_id, artist_sort, artist_credit, album,
        disctitle, media, lyricist, composer, composer_sort, arranger, track_alt, work,
        work_disambig, genre, data_source, data_url,
    ],
    multi: [artists, artists_ids, artists_sort, artists_credit],
    other: [index, medium, medium_index, medium_total, length, bpm]
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumInfo {
    #[serde(default)]
    pub tracks: Vec<TrackInfo>,
    pub album: Option<String>,
    pub album_id: Option<String>,
    pub artist: Option<String>,
    pub artist_id: Option<String>,
    pub artists: Option<Vec<String>>,
    pub artists_ids: Option<Vec<String>>,
    pub artist_sort: Option<String>,
    pub artists_sort: Option<Vec<String>>,
    pub artist_credit: Option<String>,
    pub artists_credit: Option<Vec<String>>,
    pub asin: Option<String>,
    pub albumtype: Option<String>,
    pub albumtypes: Option<Vec<String>>,
    pub label: Option<String>,
    pub barcode: Option<String>,
    pub releasegroup_id: Option<String>,
    pub release_group_title: Option<String>,
    pub catalognum: Option<String>,
    pub script: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub style: Option<String>,
    pub genre: Option<String>,
    pub albumstatus: Option<String>,
    pub albumdisambig: Option<String>,
    pub releasegroupdisambig: Option<String>,
    pub media: Option<String>,
    pub data_source: Option<String>,
    pub data_url: Option<String>,

    pub va: Option<bool>,
    pub year: Option<u32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub mediums: Option<u32>,
    pub original_year: Option<u32>,
    pub original_month: Option<u32>,
    pub original_day: Option<u32>,

    #[serde(flatten)]
    pub flex: BTreeMap<String, serde_json::Value>,
}

impl_field_access!(
    AlbumInfo,
    single: [
        album, album_id, artist, artist_id, artist_sort, artist_credit, asin, albumtype, label,
        barcode, releasegroup_id, release_group_title, catalognum, script, language, country,
        style, genre, albumstatus, albumdisambig, releasegroupdisambig, media, data_source,
        data_url,
    ],
    multi: [artists, artists_ids, artists_sort, artists_credit, albumtypes],
    other: [tracks, va, year, month, day, mediums, original_year, original_month, original_day]
);

impl AlbumView for AlbumInfo {
    type Track = TrackInfo;

    fn tracks_mut(&mut self) -> &mut [TrackInfo] {
        &mut self.tracks
    }
}
