// The rules module applies compiled rule tables to metadata objects.
//
// Every step here is total: a field that is absent, empty, or not textual is skipped, and a rule
// that does not match leaves the text alone. Nothing in this module can fail an import.

use crate::fields::{AlbumView, FieldAccess, FieldValue};
use crate::rule_parser::{FieldRuleTable, ReplacementRule};
use tracing::{debug, trace};

/// Rewrites every configured field of `track` in place.
pub fn apply_to_track<T: FieldAccess + ?Sized>(track: &mut T, track_table: &FieldRuleTable) {
    apply_table(track, track_table, "track");
}

/// Rewrites the album's own fields, then every track the album contains.
pub fn apply_to_album<A: AlbumView + ?Sized>(album: &mut A, album_table: &FieldRuleTable, track_table: &FieldRuleTable) {
    apply_table(album, album_table, "album");
    for track in album.tracks_mut() {
        apply_to_track(track, track_table);
    }
}

fn apply_table<T: FieldAccess + ?Sized>(entity: &mut T, table: &FieldRuleTable, kind: &str) {
    for (field, rules) in table.iter() {
        let Some(value) = entity.get_field(field) else {
            trace!("Skipping {kind} field {field}: not present");
            continue;
        };
        if value.is_empty() {
            trace!("Skipping {kind} field {field}: empty");
            continue;
        }
        let replaced = rewrite_value(&value, rules);
        if replaced != value {
            debug!("Rewrote {kind} field {field}: {value:?} -> {replaced:?}");
            entity.set_field(field, replaced);
        }
    }
}

/// Applies `rules` to a single or multi-valued field. List elements are rewritten independently and
/// keep their order.
pub fn rewrite_value(value: &FieldValue, rules: &[ReplacementRule]) -> FieldValue {
    match value {
        FieldValue::Single(text) => FieldValue::Single(rewrite_text(text, rules)),
        FieldValue::Multi(items) => FieldValue::Multi(items.iter().map(|item| rewrite_text(item, rules)).collect()),
    }
}

/// Folds `rules` over `text`: each rule runs on the output of the rule before it.
pub fn rewrite_text(text: &str, rules: &[ReplacementRule]) -> String {
    rules.iter().fold(text.to_string(), |acc, rule| rule.apply(&acc))
}
