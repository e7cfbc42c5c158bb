// Field access for the list engine

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{Project, ProjectPriority, ProjectStatus, Task, TaskPriority, TaskStatus};

/// A precomputed sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortValue {
    Int(i64),
    Text(String),
}

impl SortValue {
    /// Compare two keys. Text uses [`locale_compare`].
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => locale_compare(a, b),
            (SortValue::Int(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Int(_)) => Ordering::Greater,
        }
    }
}

/// Collation-style text order
///
/// Base letters compare first with accents and case ignored ("Éclair" sorts
/// between "alpha" and "Zebra"). Ties are broken by accents (unaccented
/// first), then by case (lowercase first), then by the raw string.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| case_marks(a).cmp(case_marks(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase)
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn case_marks(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.nfd().filter(|c| !is_combining_mark(*c)).map(char::is_uppercase)
}

/// Something the list engine can filter, sort and facet
pub trait Listable {
    /// Fields accepted as filter keys
    const FILTER_FIELDS: &'static [&'static str];
    /// Fields accepted as sort keys
    const SORT_FIELDS: &'static [&'static str];

    /// Text searched by the search term (name/title, description)
    fn search_fields(&self) -> [&str; 2];

    fn tags(&self) -> &[String];

    /// Status label used for the status facet
    fn status_label(&self) -> &'static str;

    /// Whether the item satisfies `field = value`. Only called for a field in
    /// `FILTER_FIELDS` with a constraining value.
    fn matches_filter(&self, field: &str, value: &str) -> bool;

    /// Sort key for a field in `SORT_FIELDS`; `None` sorts after every value
    fn sort_value(&self, field: &str) -> Option<SortValue>;
}

impl Listable for Project {
    const FILTER_FIELDS: &'static [&'static str] = &["status", "tag", "priority"];
    const SORT_FIELDS: &'static [&'static str] = &["name", "status", "completion", "priority"];

    fn search_fields(&self) -> [&str; 2] {
        [&self.name, &self.description]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn matches_filter(&self, field: &str, value: &str) -> bool {
        match field {
            "status" => ProjectStatus::from_str(value) == Some(self.status),
            "priority" => ProjectPriority::from_str(value) == Some(self.priority),
            "tag" => self.has_tag(value),
            _ => true,
        }
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::Text(self.name.clone())),
            "status" => Some(SortValue::Text(self.status.as_str().to_string())),
            "completion" => Some(SortValue::Int(self.completion as i64)),
            "priority" => Some(SortValue::Int(self.priority.rank())),
            _ => None,
        }
    }
}

impl Listable for Task {
    const FILTER_FIELDS: &'static [&'static str] = &["status", "priority", "project", "assignee", "tag"];
    const SORT_FIELDS: &'static [&'static str] = &["title", "status", "priority", "due"];

    fn search_fields(&self) -> [&str; 2] {
        [&self.title, &self.description]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn matches_filter(&self, field: &str, value: &str) -> bool {
        match field {
            "status" => TaskStatus::from_str(value) == Some(self.status),
            "priority" => TaskPriority::from_str(value) == Some(self.priority),
            "project" => value.trim().parse::<i64>().ok() == Some(self.project_id),
            "assignee" => self.assigned_to.as_deref()
                .is_some_and(|who| who.eq_ignore_ascii_case(value.trim())),
            "tag" => self.tags.iter().any(|t| t == value),
            _ => true,
        }
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "title" => Some(SortValue::Text(self.title.clone())),
            "status" => Some(SortValue::Int(self.status.rank())),
            "priority" => Some(SortValue::Int(self.priority.rank())),
            "due" => self.due_ts.map(SortValue::Int),
            _ => None,
        }
    }
}
