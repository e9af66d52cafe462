//! The import plugin: compiles the configured replacements once and rewrites metadata as the host
//! delivers it.

use std::fmt;

use tracing::{debug, info};

use crate::config::{Config, ReplacementGroupConfig};
use crate::error::Result;
use crate::fields::{AlbumView, FieldAccess};
use crate::rule_parser::{compile, FieldRuleTable};
use crate::rules::{apply_to_album, apply_to_track};

/// Host events the plugin listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportEvent {
    TrackInfoReceived,
    AlbumInfoReceived,
}

impl ImportEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportEvent::TrackInfoReceived => "trackinfo_received",
            ImportEvent::AlbumInfoReceived => "albuminfo_received",
        }
    }
}

impl fmt::Display for ImportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const LISTENERS: [ImportEvent; 2] = [ImportEvent::TrackInfoReceived, ImportEvent::AlbumInfoReceived];

#[derive(Debug, Clone, Default)]
pub struct ImportReplace {
    item_replacements: FieldRuleTable,
    album_replacements: FieldRuleTable,
}

impl ImportReplace {
    pub fn new(config: &Config) -> Result<Self> {
        Self::from_groups(&config.replacements)
    }

    /// Builds fresh rule tables from `groups`. Each plugin instance owns its own tables, so
    /// constructing the plugin twice never doubles up rules.
    pub fn from_groups(groups: &[ReplacementGroupConfig]) -> Result<Self> {
        let (item_replacements, album_replacements) = compile(groups)?;
        info!(
            "Loaded {} replacement groups: {} item fields, {} album fields",
            groups.len(),
            item_replacements.len(),
            album_replacements.len()
        );
        debug!(
            "Item replacements: {}",
            serde_json::to_string(&item_replacements).unwrap_or_default()
        );
        debug!(
            "Album replacements: {}",
            serde_json::to_string(&album_replacements).unwrap_or_default()
        );
        Ok(ImportReplace {
            item_replacements,
            album_replacements,
        })
    }

    /// The events a host must route to this plugin.
    pub fn listeners() -> &'static [ImportEvent] {
        &LISTENERS
    }

    pub fn item_replacements(&self) -> &FieldRuleTable {
        &self.item_replacements
    }

    pub fn album_replacements(&self) -> &FieldRuleTable {
        &self.album_replacements
    }

    /// Handler for `trackinfo_received`.
    pub fn trackinfo_received<T: FieldAccess + ?Sized>(&self, info: &mut T) {
        apply_to_track(info, &self.item_replacements);
    }

    /// Handler for `albuminfo_received`. Also rewrites every track on the album.
    pub fn albuminfo_received<A: AlbumView + ?Sized>(&self, info: &mut A) {
        apply_to_album(info, &self.album_replacements, &self.item_replacements);
    }
}
