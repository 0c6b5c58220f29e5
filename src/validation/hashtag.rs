//! Hashtag filters.
//!
//! Hashtags are lower-cased at validation time and matched exactly against
//! the stored (lower-case) `changesets.hashtags` array, so `#MissingMaps`
//! and `missingmaps` are the same tag and count as duplicates.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{Violation, ViolationKind};

static SPECIAL_CHARACTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[@!#$%^&*() <>?/\\|}{~:,"]"#).unwrap());

/// How the tags of a filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Any tag matches (OR).
    Any,
    /// Every tag matches (AND).
    All,
    /// Exactly one tag.
    Single,
}

impl std::str::FromStr for MatchMode {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" | "or" => Ok(MatchMode::Any),
            "all" | "and" => Ok(MatchMode::All),
            "single" => Ok(MatchMode::Single),
            other => Err(Violation::new(
                ViolationKind::InvalidValue,
                format!("unknown match mode '{}', expected any, all or single", other),
            )),
        }
    }
}

/// A non-empty, duplicate-free list of normalized hashtags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashtagFilter {
    tags: Vec<String>,
    mode: MatchMode,
}

impl HashtagFilter {
    /// Validate raw tags. `mode` defaults to `Single` for one tag and `Any` otherwise.
    pub fn new(raw: &[String], mode: Option<MatchMode>) -> Result<Self, Violation> {
        if raw.is_empty() {
            return Err(Violation::new(
                ViolationKind::Empty,
                "at least one hashtag is required",
            ));
        }

        let mut tags = Vec::with_capacity(raw.len());
        let mut seen = HashSet::new();
        for original in raw {
            let tag = normalize(original)?;
            if !seen.insert(tag.clone()) {
                return Err(Violation::new(
                    ViolationKind::Duplicate,
                    format!("hashtag '{}' appears more than once", original.trim()),
                ));
            }
            tags.push(tag);
        }

        let mode = match mode {
            Some(MatchMode::Single) if tags.len() > 1 => {
                return Err(Violation::new(
                    ViolationKind::Conflict,
                    format!("match mode single given with {} hashtags", tags.len()),
                ))
            }
            Some(mode) => mode,
            None if tags.len() == 1 => MatchMode::Single,
            None => MatchMode::Any,
        };

        Ok(Self { tags, mode })
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Tasking-manager project ids named by `hotosm-project-<id>` tags.
    pub fn project_ids(&self) -> Vec<i64> {
        self.tags
            .iter()
            .filter_map(|t| t.strip_prefix("hotosm-project-"))
            .filter_map(|id| id.parse::<i64>().ok())
            .filter(|id| *id > 0)
            .collect()
    }
}

/// Trim, drop one leading `#`, lower-case, then check length and characters.
fn normalize(raw: &str) -> Result<String, Violation> {
    let trimmed = raw.trim();
    let tag = trimmed.strip_prefix('#').unwrap_or(trimmed).to_lowercase();

    if tag.chars().count() < 2 {
        return Err(Violation::new(
            ViolationKind::InvalidValue,
            format!("hashtag '{}' is too short", trimmed),
        ));
    }
    if SPECIAL_CHARACTER.is_match(&tag) {
        return Err(Violation::new(
            ViolationKind::InvalidValue,
            format!("hashtag '{}' contains a special character or space", trimmed),
        ));
    }
    Ok(tag)
}
