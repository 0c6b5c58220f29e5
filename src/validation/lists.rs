//! List-valued filters. Duplicates fail validation instead of being dropped.

use std::collections::HashSet;
use std::hash::Hash;

use serde::Serialize;

use super::enums::TopicType;
use super::{Violation, ViolationKind};

fn first_duplicate<T: Eq + Hash + Clone>(items: &[T]) -> Option<T> {
    let mut seen = HashSet::new();
    items.iter().find(|item| !seen.insert(*item)).cloned()
}

fn non_empty<T>(items: &[T], what: &str) -> Result<(), Violation> {
    if items.is_empty() {
        return Err(Violation::new(
            ViolationKind::Empty,
            format!("at least one {} is required", what),
        ));
    }
    Ok(())
}

/// Positive, unique tasking-manager project ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProjectIds(Vec<i64>);

impl ProjectIds {
    pub fn new(ids: Vec<i64>) -> Result<Self, Violation> {
        non_empty(&ids, "project id")?;
        if let Some(bad) = ids.iter().find(|id| **id <= 0) {
            return Err(Violation::new(
                ViolationKind::InvalidValue,
                format!("project id {} must be positive", bad),
            ));
        }
        if let Some(dup) = first_duplicate(&ids) {
            return Err(Violation::new(
                ViolationKind::Duplicate,
                format!("project id {} appears more than once", dup),
            ));
        }
        Ok(Self(ids))
    }

    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    /// Add ids not already present, keeping first-seen order.
    pub fn merged(&self, extra: &[i64]) -> Self {
        let mut ids = self.0.clone();
        for id in extra {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        Self(ids)
    }

    /// Ids from hashtags only, when the request gave no explicit list.
    pub fn from_hashtag_ids(ids: Vec<i64>) -> Option<Self> {
        let mut unique = Vec::new();
        for id in ids {
            if id > 0 && !unique.contains(&id) {
                unique.push(id);
            }
        }
        (!unique.is_empty()).then_some(Self(unique))
    }
}

/// OSM user names. OSM names are case-sensitive, so are duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserNames(Vec<String>);

impl UserNames {
    pub fn new(raw: Vec<String>) -> Result<Self, Violation> {
        non_empty(&raw, "user name")?;
        let names: Vec<String> = raw.iter().map(|n| n.trim().to_string()).collect();
        if names.iter().any(|n| n.is_empty()) {
            return Err(Violation::new(ViolationKind::Empty, "user names must not be blank"));
        }
        if let Some(dup) = first_duplicate(&names) {
            return Err(Violation::new(
                ViolationKind::Duplicate,
                format!("user name '{}' appears more than once", dup),
            ));
        }
        Ok(Self(names))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// A data-quality issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    BadGeom,
    BadValue,
    Incomplete,
    NoTags,
    Complete,
    Orphan,
    Overlaping,
    Duplicate,
}

impl IssueType {
    pub const ALL: [IssueType; 8] = [
        IssueType::BadGeom,
        IssueType::BadValue,
        IssueType::Incomplete,
        IssueType::NoTags,
        IssueType::Complete,
        IssueType::Orphan,
        IssueType::Overlaping,
        IssueType::Duplicate,
    ];

    /// Value stored in `validation.status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::BadGeom => "badgeom",
            IssueType::BadValue => "badvalue",
            IssueType::Incomplete => "incomplete",
            IssueType::NoTags => "notags",
            IssueType::Complete => "complete",
            IssueType::Orphan => "orphan",
            IssueType::Overlaping => "overlaping",
            IssueType::Duplicate => "duplicate",
        }
    }
}

impl std::str::FromStr for IssueType {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                Violation::new(
                    ViolationKind::InvalidValue,
                    format!("unknown issue type '{}'", s),
                )
            })
    }
}

/// Requested issue categories; `all` expands to every category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IssueTypes(Vec<IssueType>);

impl IssueTypes {
    pub fn new(raw: &[String]) -> Result<Self, Violation> {
        non_empty(raw, "issue type")?;
        if raw.iter().any(|t| t == "all") {
            if raw.len() > 1 {
                return Err(Violation::new(
                    ViolationKind::Conflict,
                    "'all' cannot be combined with other issue types",
                ));
            }
            return Ok(Self(IssueType::ALL.to_vec()));
        }
        let types = raw
            .iter()
            .map(|t| t.parse::<IssueType>())
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(dup) = first_duplicate(&types) {
            return Err(Violation::new(
                ViolationKind::Duplicate,
                format!("issue type '{}' appears more than once", dup.as_str()),
            ));
        }
        Ok(Self(types))
    }

    pub fn types(&self) -> &[IssueType] {
        &self.0
    }

    /// Stored names, in request order.
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|t| t.as_str().to_string()).collect()
    }
}

/// Training topic types, unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopicTypes(Vec<TopicType>);

impl TopicTypes {
    pub fn new(raw: &[String]) -> Result<Self, Violation> {
        non_empty(raw, "topic type")?;
        let types = raw
            .iter()
            .map(|t| t.parse::<TopicType>())
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(dup) = first_duplicate(&types) {
            return Err(Violation::new(
                ViolationKind::Duplicate,
                format!("topic type '{}' appears more than once", dup.as_str()),
            ));
        }
        Ok(Self(types))
    }

    pub fn types(&self) -> &[TopicType] {
        &self.0
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|t| t.as_str().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_project_ids() {
        assert!(ProjectIds::new(vec![1, 2]).is_ok());
        assert_eq!(
            ProjectIds::new(vec![1, 1]).unwrap_err().kind,
            ViolationKind::Duplicate
        );
        assert_eq!(
            ProjectIds::new(vec![0]).unwrap_err().kind,
            ViolationKind::InvalidValue
        );
        assert_eq!(ProjectIds::new(vec![]).unwrap_err().kind, ViolationKind::Empty);
    }

    #[test]
    fn test_project_ids_merge() {
        let ids = ProjectIds::new(vec![3, 1]).unwrap().merged(&[1, 7]);
        assert_eq!(ids.ids(), &[3, 1, 7]);
        assert!(ProjectIds::from_hashtag_ids(vec![]).is_none());
    }

    #[test]
    fn test_user_names_case_sensitive() {
        assert!(UserNames::new(strings(&["Kshitij", "kshitij"])).is_ok());
        assert_eq!(
            UserNames::new(strings(&["mapper", " mapper "])).unwrap_err().kind,
            ViolationKind::Duplicate
        );
    }

    #[test]
    fn test_issue_types_all() {
        let all = IssueTypes::new(&strings(&["all"])).unwrap();
        assert_eq!(all.types().len(), 8);
        assert_eq!(
            IssueTypes::new(&strings(&["all", "badgeom"])).unwrap_err().kind,
            ViolationKind::Conflict
        );
        assert_eq!(
            IssueTypes::new(&strings(&["badgeom", "badgeom"])).unwrap_err().kind,
            ViolationKind::Duplicate
        );
        assert_eq!(
            IssueTypes::new(&strings(&["broken"])).unwrap_err().kind,
            ViolationKind::InvalidValue
        );
    }
}
