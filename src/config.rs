//! The config module provides the configuration shape and its parsing logic.
//!
//! Configuration is read once at plugin startup. Invalid values produce a detailed error naming
//! the offending key, and unrecognized keys produce warnings rather than failures.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{ImportReplaceError, ImportReplaceExpectedError, Result};

/// Name of the host configuration section that owns this plugin's settings.
pub const PLUGIN_SECTION: &str = "importreplace";

/// A list of field names. Accepts either a list of strings or a single whitespace-separated
/// string, so `item_fields = "title artist"` and `item_fields = ["title", "artist"]` are the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFieldList", into = "Vec<String>")]
pub struct FieldList(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldList {
    One(String),
    Many(Vec<String>),
}

impl From<RawFieldList> for FieldList {
    fn from(raw: RawFieldList) -> Self {
        match raw {
            RawFieldList::One(s) => FieldList(s.split_whitespace().map(str::to_string).collect()),
            RawFieldList::Many(xs) => FieldList(xs),
        }
    }
}

impl From<FieldList> for Vec<String> {
    fn from(fields: FieldList) -> Self {
        fields.0
    }
}

impl FieldList {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FieldList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FieldList(iter.into_iter().map(Into::into).collect())
    }
}

/// The `replace` mapping of a group: pattern to replacement template, in the order the user wrote
/// them. Pattern order is significant, so this is kept as a list rather than a hash map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceMap(pub Vec<(String, String)>);

impl ReplaceMap {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, r)| (p.as_str(), r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<String>, R: Into<String>> FromIterator<(P, R)> for ReplaceMap {
    fn from_iter<I: IntoIterator<Item = (P, R)>>(iter: I) -> Self {
        ReplaceMap(iter.into_iter().map(|(p, r)| (p.into(), r.into())).collect())
    }
}

impl Serialize for ReplaceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (pattern, replacement) in &self.0 {
            map.serialize_entry(pattern, replacement)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ReplaceMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ReplaceMapVisitor;

        impl<'de> Visitor<'de> for ReplaceMapVisitor {
            type Value = ReplaceMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table mapping regex patterns to replacement strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ReplaceMap, A::Error> {
                let mut pairs: Vec<(String, String)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((pattern, replacement)) = access.next_entry::<String, String>()? {
                    if let Some(existing) = pairs.iter_mut().find(|entry| entry.0 == pattern) {
                        // Later keys win, matching how a map would behave.
                        existing.1 = replacement;
                    } else {
                        pairs.push((pattern, replacement));
                    }
                }
                Ok(ReplaceMap(pairs))
            }
        }

        deserializer.deserialize_map(ReplaceMapVisitor)
    }
}

/// One entry of the `replacements` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementGroupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_fields: Option<FieldList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_fields: Option<FieldList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<ReplaceMap>,
}

const GROUP_KEYS: [&str; 3] = ["item_fields", "album_fields", "replace"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub replacements: Vec<ReplacementGroupConfig>,
}

impl Config {
    /// Default location of the configuration file: `<user config dir>/importreplace/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", PLUGIN_SECTION)
            .ok_or_else(|| ImportReplaceError::Generic("Failed to get project directories".to_string()))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn parse(config_path_override: Option<&Path>) -> Result<Config> {
        let cfgpath = match config_path_override {
            Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()),
            None => Self::default_path()?,
        };
        debug!("Reading configuration from {}", cfgpath.display());

        let cfgtext = fs::read_to_string(&cfgpath).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ImportReplaceError::Expected(ImportReplaceExpectedError::ConfigNotFound { path: cfgpath.clone() })
            }
            _ => ImportReplaceError::Io(e),
        })?;
        Self::from_toml_str(&cfgtext)
    }

    pub fn from_toml_str(cfgtext: &str) -> Result<Config> {
        let data: toml::Value = toml::from_str(cfgtext)
            .map_err(|e| ImportReplaceExpectedError::ConfigDecode { message: e.to_string() })?;
        Self::from_value(data)
    }

    /// Builds the configuration from an already-parsed tree. The tree may be the plugin section
    /// itself, or a host document that nests the plugin section under `importreplace`.
    pub fn from_value(data: toml::Value) -> Result<Config> {
        let toml::Value::Table(mut root) = data else {
            return Err(invalid("configuration", "must be a table").into());
        };

        let (mut section, prefix) = match root.remove(PLUGIN_SECTION) {
            Some(toml::Value::Table(section)) => (section, format!("{PLUGIN_SECTION}.")),
            Some(_) => return Err(invalid(PLUGIN_SECTION, "must be a table").into()),
            None => (root, String::new()),
        };
        let unrecognized = unrecognized_keys(&section, !prefix.is_empty());

        let replacements = match section.remove("replacements") {
            None => Vec::new(),
            Some(toml::Value::Array(entries)) => entries
                .into_iter()
                .enumerate()
                .map(|(i, entry)| parse_group(&format!("{prefix}replacements[{i}]"), entry))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(invalid(
                    &format!("{prefix}replacements"),
                    "must be a list of { item_fields, album_fields, replace } records",
                )
                .into())
            }
        };

        for key in unrecognized {
            warn!("Unrecognized configuration key {prefix}{key}");
        }

        Ok(Config { replacements })
    }
}

/// Keys of the plugin section that this plugin does not read. A root document without an
/// `[importreplace]` table is only checked when it holds `replacements`, since otherwise it is the
/// host's own configuration.
pub(crate) fn unrecognized_keys(section: &toml::Table, explicit: bool) -> Vec<String> {
    if !explicit && !section.contains_key("replacements") {
        return Vec::new();
    }
    section.keys().filter(|k| k.as_str() != "replacements").cloned().collect()
}

fn parse_group(key: &str, entry: toml::Value) -> Result<ReplacementGroupConfig> {
    let toml::Value::Table(table) = entry else {
        return Err(invalid(key, "must be a { item_fields, album_fields, replace } record").into());
    };

    let mut group = ReplacementGroupConfig::default();
    for (k, v) in table {
        let subkey = format!("{key}.{k}");
        match k.as_str() {
            "item_fields" => group.item_fields = Some(parse_field_list(&subkey, v)?),
            "album_fields" => group.album_fields = Some(parse_field_list(&subkey, v)?),
            "replace" => {
                group.replace = Some(
                    v.try_into::<ReplaceMap>()
                        .map_err(|_| invalid(&subkey, "must be a table of pattern = replacement strings"))?,
                )
            }
            _ => warn!("Unrecognized configuration key {subkey}: expected one of {}", GROUP_KEYS.join(", ")),
        }
    }
    Ok(group)
}

fn parse_field_list(key: &str, value: toml::Value) -> Result<FieldList> {
    value
        .try_into::<FieldList>()
        .map_err(|_| invalid(key, "must be a string or a list of strings").into())
}

fn invalid(key: &str, message: &str) -> ImportReplaceExpectedError {
    ImportReplaceExpectedError::InvalidConfigValue { key: key.to_string(), message: message.to_string() }
}
