pub mod common;
pub mod config;
pub mod error;
pub mod fields;
pub mod plugin;
pub mod rule_parser;
pub mod rules;

pub use config::{Config, ReplacementGroupConfig};
pub use error::{ImportReplaceError, ImportReplaceExpectedError, Result};
pub use fields::{AlbumInfo, AlbumView, FieldAccess, FieldValue, TrackInfo};
pub use plugin::{ImportEvent, ImportReplace};
pub use rule_parser::{FieldRuleTable, ReplacementRule};

#[cfg(test)]
mod testing;

#[cfg(test)]
mod config_test;
