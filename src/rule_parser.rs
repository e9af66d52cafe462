//! The rule_parser module compiles the `replacements` configuration into field-indexed rule
//! tables.
//!
//! Replacement templates are written in the host's substitution syntax (`\1`, `\g<1>`,
//! `\g<name>`), and are translated once here into the regex crate's `${1}` expansion syntax so
//! that applying a rule is a plain `replace_all`.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::common::uniq;
use crate::config::ReplacementGroupConfig;
use crate::error::{ImportReplaceExpectedError, Result};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidRuleError(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct ReplacementRule {
    #[serde(serialize_with = "serde_regex::serialize")]
    pub pattern: Regex,
    /// The template as written in the configuration.
    pub replacement: String,
    #[serde(skip)]
    expansion: String,
}

impl ReplacementRule {
    pub fn new(pattern: &str, replacement: &str) -> std::result::Result<Self, InvalidRuleError> {
        let pattern = Regex::new(pattern).map_err(|e| InvalidRuleError(format!("invalid regex: {e}")))?;
        let expansion = translate_template(&pattern, replacement)?;
        Ok(ReplacementRule {
            pattern,
            replacement: replacement.to_string(),
            expansion,
        })
    }

    /// Replaces every non-overlapping match in `text`.
    pub fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.expansion.as_str()).into_owned()
    }
}

impl PartialEq for ReplacementRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str() && self.replacement == other.replacement
    }
}

impl Eq for ReplacementRule {}

impl fmt::Display for ReplacementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.pattern.as_str(), self.replacement)
    }
}

/// Field name to the ordered rules that run against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldRuleTable {
    rules: BTreeMap<String, Vec<ReplacementRule>>,
}

impl FieldRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&[ReplacementRule]> {
        self.rules.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ReplacementRule])> {
        self.rules.iter().map(|(f, rs)| (f.as_str(), rs.as_slice()))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Appends `rules` after whatever already runs against `field`.
    pub fn append(&mut self, field: &str, rules: &[ReplacementRule]) {
        self.rules.entry(field.to_string()).or_default().extend_from_slice(rules);
    }
}

/// Compiles the configured groups into `(item_table, album_table)`.
///
/// Groups are processed in order and a field's rules are concatenated across groups, so group 1's
/// rules always run before group 2's. An invalid pattern anywhere fails the whole compilation.
pub fn compile(groups: &[ReplacementGroupConfig]) -> Result<(FieldRuleTable, FieldRuleTable)> {
    let mut item_table = FieldRuleTable::new();
    let mut album_table = FieldRuleTable::new();

    for (i, group) in groups.iter().enumerate() {
        let rules = compile_group(i, group)?;
        if rules.is_empty() {
            debug!("Skipping replacement group {i}: no replace patterns");
            continue;
        }

        if group.item_fields.is_none() && group.album_fields.is_none() {
            debug!("Replacement group {i} has no item_fields or album_fields, its patterns apply nowhere");
        }
        if let Some(fields) = &group.item_fields {
            for field in uniq(fields.0.clone()) {
                item_table.append(&field, &rules);
            }
        }
        if let Some(fields) = &group.album_fields {
            for field in uniq(fields.0.clone()) {
                album_table.append(&field, &rules);
            }
        }
    }

    Ok((item_table, album_table))
}

fn compile_group(index: usize, group: &ReplacementGroupConfig) -> Result<Vec<ReplacementRule>> {
    let Some(replace) = &group.replace else {
        return Ok(Vec::new());
    };
    let mut rules = Vec::with_capacity(replace.len());
    for (pattern, replacement) in replace.iter() {
        let rule = ReplacementRule::new(pattern, replacement).map_err(|e| ImportReplaceExpectedError::InvalidPattern {
            group: index,
            pattern: pattern.to_string(),
            message: e.0,
        })?;
        rules.push(rule);
    }
    Ok(rules)
}

/// Translates a host-syntax replacement template into regex crate expansion syntax.
///
/// Supported: `\1`..`\99` and `\g<n>`/`\g<name>` group references, octal escapes (`\0`, `\012`,
/// `\141`), the single-character escapes `\a \b \f \n \r \t \v \\`. Any other escaped
/// punctuation is kept literally with its backslash. Escaped ASCII letters are errors, as are
/// references to groups the pattern does not define. Literal `$` is escaped as `$$`.
pub fn translate_template(pattern: &Regex, template: &str) -> std::result::Result<String, InvalidRuleError> {
    let chars: Vec<char> = template.chars().collect();
    let group_count = pattern.captures_len() - 1;
    let mut out = String::with_capacity(template.len());
    let mut idx = 0;

    let group_ref = |out: &mut String, n: usize| -> std::result::Result<(), InvalidRuleError> {
        if n > group_count {
            return Err(InvalidRuleError(format!("invalid group reference {n} in replacement {template:?}")));
        }
        out.push_str(&format!("${{{n}}}"));
        Ok(())
    };

    while idx < chars.len() {
        let c = chars[idx];
        if c == '$' {
            out.push_str("$$");
            idx += 1;
            continue;
        }
        if c != '\\' {
            out.push(c);
            idx += 1;
            continue;
        }

        idx += 1;
        let Some(&next) = chars.get(idx) else {
            return Err(InvalidRuleError(format!("bad escape (end of replacement {template:?})")));
        };
        match next {
            'g' => {
                idx += 1;
                if chars.get(idx) != Some(&'<') {
                    return Err(InvalidRuleError(format!("missing < after \\g in replacement {template:?}")));
                }
                idx += 1;
                let start = idx;
                while idx < chars.len() && chars[idx] != '>' {
                    idx += 1;
                }
                if idx >= chars.len() {
                    return Err(InvalidRuleError(format!("missing >, unterminated name in replacement {template:?}")));
                }
                let name: String = chars[start..idx].iter().collect();
                idx += 1;
                if name.is_empty() {
                    return Err(InvalidRuleError(format!("missing group name in replacement {template:?}")));
                }
                if name.chars().all(|c| c.is_ascii_digit()) {
                    let n = name
                        .parse::<usize>()
                        .map_err(|_| InvalidRuleError(format!("invalid group reference {name} in replacement {template:?}")))?;
                    group_ref(&mut out, n)?;
                } else if pattern.capture_names().flatten().any(|n| n == name) {
                    out.push_str(&format!("${{{name}}}"));
                } else {
                    return Err(InvalidRuleError(format!("unknown group name {name:?} in replacement {template:?}")));
                }
            }
            '0' => {
                idx += 1;
                let mut value = 0u32;
                let mut digits = 0;
                while digits < 2 && chars.get(idx).is_some_and(|c| c.is_digit(8)) {
                    value = value * 8 + chars[idx].to_digit(8).unwrap_or(0);
                    idx += 1;
                    digits += 1;
                }
                push_literal(&mut out, char::from_u32(value).unwrap_or('\0'));
            }
            '1'..='9' => {
                let first = next;
                idx += 1;
                let second = chars.get(idx).copied().filter(char::is_ascii_digit);
                let third = chars.get(idx + 1).copied();
                match (second, third) {
                    (Some(s), Some(t)) if first.is_digit(8) && s.is_digit(8) && t.is_digit(8) => {
                        let value = [first, s, t].iter().fold(0u32, |acc, c| acc * 8 + c.to_digit(8).unwrap_or(0));
                        if value > 0o377 {
                            return Err(InvalidRuleError(format!("octal escape value \\{first}{s}{t} outside of range 0-0o377")));
                        }
                        idx += 2;
                        push_literal(&mut out, char::from_u32(value).unwrap_or('\0'));
                    }
                    (Some(s), _) => {
                        idx += 1;
                        let n = (first.to_digit(10).unwrap_or(0) * 10 + s.to_digit(10).unwrap_or(0)) as usize;
                        group_ref(&mut out, n)?;
                    }
                    (None, _) => group_ref(&mut out, first.to_digit(10).unwrap_or(0) as usize)?,
                }
            }
            'a' => simple_escape(&mut out, &mut idx, '\x07'),
            'b' => simple_escape(&mut out, &mut idx, '\x08'),
            'f' => simple_escape(&mut out, &mut idx, '\x0c'),
            'n' => simple_escape(&mut out, &mut idx, '\n'),
            'r' => simple_escape(&mut out, &mut idx, '\r'),
            't' => simple_escape(&mut out, &mut idx, '\t'),
            'v' => simple_escape(&mut out, &mut idx, '\x0b'),
            '\\' => simple_escape(&mut out, &mut idx, '\\'),
            c if c.is_ascii_alphabetic() => {
                return Err(InvalidRuleError(format!("bad escape \\{c} in replacement {template:?}")));
            }
            c => {
                out.push('\\');
                push_literal(&mut out, c);
                idx += 1;
            }
        }
    }

    Ok(out)
}

fn simple_escape(out: &mut String, idx: &mut usize, c: char) {
    out.push(c);
    *idx += 1;
}

fn push_literal(out: &mut String, c: char) {
    if c == '$' {
        out.push_str("$$");
    } else {
        out.push(c);
    }
}
