use std::cmp::Ordering;

use serde::Serialize;

use super::{Criteria, Listable, SortDirection, SortSpec, SortValue};

/// One visible page plus pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct ListView<'a, T> {
    pub items: Vec<&'a T>,
    /// Page actually shown (1-indexed)
    pub page: usize,
    pub page_size: usize,
    /// 0 when nothing matched
    pub total_pages: usize,
    /// Matching items across all pages
    pub total_count: usize,
}

impl<T> ListView<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Filter, sort and paginate `items`
pub fn apply<'a, T: Listable>(items: &'a [T], criteria: &Criteria) -> ListView<'a, T> {
    let mut visible = filter(items, criteria);
    if let Some(spec) = &criteria.sort {
        sort(&mut visible, spec);
    }

    let page_size = criteria.effective_page_size();
    let total_count = visible.len();
    let total_pages = total_pages(total_count, page_size);
    let page = clamp_page(criteria.page, total_pages);

    let items = visible
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    ListView { items, page, page_size, total_pages, total_count }
}

/// Keep items matching the search term and every constraining filter
///
/// Filter keys the item type does not know are ignored.
pub fn filter<'a, T: Listable + 'a>(
    items: impl IntoIterator<Item = &'a T>,
    criteria: &Criteria,
) -> Vec<&'a T> {
    let needle = criteria.search.to_lowercase();
    let filters: Vec<(&str, &str)> = criteria
        .active_filters()
        .filter(|(field, _)| {
            let known = T::FILTER_FIELDS.iter().any(|f| f == field);
            if !known {
                log::debug!("Ignoring unknown filter field '{}'", field);
            }
            known
        })
        .collect();

    items
        .into_iter()
        .filter(|item| matches_search(*item, &needle))
        .filter(|item| filters.iter().all(|(field, value)| item.matches_filter(field, value)))
        .collect()
}

fn matches_search<T: Listable>(item: &T, needle: &str) -> bool {
    needle.is_empty()
        || item.search_fields().iter().any(|text| text.to_lowercase().contains(needle))
}

/// Stable sort by an allow-listed field; unknown fields leave the order alone
pub fn sort<'a, T: Listable>(items: &mut Vec<&'a T>, spec: &SortSpec) {
    if !T::SORT_FIELDS.iter().any(|f| *f == spec.field) {
        log::debug!("Ignoring unknown sort field '{}'", spec.field);
        return;
    }

    let mut keyed: Vec<(Option<SortValue>, &'a T)> = items
        .drain(..)
        .map(|item| (item.sort_value(&spec.field), item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref(), spec.direction));
    items.extend(keyed.into_iter().map(|(_, item)| item));
}

/// Missing keys sort last in either direction
fn compare_keys(a: Option<&SortValue>, b: Option<&SortValue>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.compare(b),
            SortDirection::Descending => b.compare(a),
        },
    }
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// A page outside `1..=total_pages` falls back to the first page
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    if (1..=total_pages).contains(&page) { page } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, ProjectPriority, ProjectStatus, Task};

    fn project(id: i64, name: &str, status: ProjectStatus, completion: u8, tags: &[&str]) -> Project {
        let mut p = Project::new(name);
        p.id = Some(id);
        p.status = status;
        p.completion = completion;
        p.tags = tags.iter().map(|t| t.to_string()).collect();
        p
    }

    fn ids<T>(items: &[&T], id: impl Fn(&T) -> Option<i64>) -> Vec<i64> {
        items.iter().filter_map(|item| id(*item)).collect()
    }

    fn sample() -> Vec<Project> {
        vec![
            project(1, "Redesign Site", ProjectStatus::Planning, 10, &["React"]),
            project(2, "API Gateway", ProjectStatus::InProgress, 55, &["Go"]),
            project(3, "billing", ProjectStatus::Planning, 55, &["PHP"]),
            project(4, "Analytics", ProjectStatus::Completed, 100, &["React", "Go"]),
            project(5, "Mobile App", ProjectStatus::OnHold, 55, &[]),
            project(6, "Docs site", ProjectStatus::Planning, 0, &["Hugo"]),
        ]
    }

    fn many(n: i64) -> Vec<Project> {
        (1..=n)
            .map(|i| {
                let status = if i % 3 == 0 { ProjectStatus::Completed } else { ProjectStatus::Planning };
                project(i, &format!("Project {:02}", i), status, (i % 4 * 25) as u8, &[])
            })
            .collect()
    }

    #[test]
    fn test_search_matches_name_or_description() {
        let mut items = vec![Project::new("Redesign Site"), Project::new("API Gateway")];
        items[0].description = "Marketing".to_string();
        items[1].description = "Backend".to_string();

        let view = apply(&items, &Criteria::default().with_search("site"));
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].name, "Redesign Site");

        let view = apply(&items, &Criteria::default().with_search("BACKEND"));
        assert_eq!(view.items[0].name, "API Gateway");
    }

    #[test]
    fn test_search_keeps_surrounding_whitespace() {
        let items = vec![Project::new("Site map"), Project::new("Sitemap"), Project::new("Docs")];

        let view = apply(&items, &Criteria::default().with_search("site "));
        let names: Vec<&str> = view.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Site map"]);

        // A lone space is a real term, not an empty search
        let view = apply(&items, &Criteria::default().with_search(" "));
        assert_eq!(view.items.len(), 1);

        let view = apply(&items, &Criteria::default().with_search(""));
        assert_eq!(view.items.len(), 3);
    }

    #[test]
    fn test_tag_filter() {
        let items = vec![
            project(1, "One", ProjectStatus::Planning, 0, &["React"]),
            project(2, "Two", ProjectStatus::Planning, 0, &["PHP"]),
        ];
        let view = apply(&items, &Criteria::default().with_filter("tag", "React"));
        assert_eq!(ids(&view.items, |p| p.id), vec![1]);

        // A tag nobody has matches nothing
        let view = apply(&items, &Criteria::default().with_filter("tag", "Elm"));
        assert!(view.is_empty());
        assert_eq!(view.total_pages, 0);
    }

    #[test]
    fn test_all_and_unknown_filters_do_not_constrain() {
        let items = sample();
        let criteria = Criteria::default()
            .with_filter("status", "All")
            .with_filter("tag", "")
            .with_filter("colour", "blue");
        assert_eq!(apply(&items, &criteria).total_count, items.len());
    }

    #[test]
    fn test_combined_filters() {
        let items = sample();
        let criteria = Criteria::default()
            .with_filter("status", "Planning")
            .with_search("site");
        let view = apply(&items, &criteria);
        assert_eq!(ids(&view.items, |p| p.id), vec![1, 6]);
    }

    #[test]
    fn test_priority_filter() {
        let mut items = sample();
        items[2].priority = ProjectPriority::Critical;
        let view = apply(&items, &Criteria::default().with_filter("priority", "critical"));
        assert_eq!(ids(&view.items, |p| p.id), vec![3]);
    }

    #[test]
    fn test_filter_idempotent() {
        let items = sample();
        let criteria = Criteria::default()
            .with_filter("tag", "React")
            .with_search("a");
        let once = filter(&items, &criteria);
        let twice = filter(once.iter().copied(), &criteria);
        assert_eq!(ids(&once, |p| p.id), ids(&twice, |p| p.id));
    }

    #[test]
    fn test_sort_by_name_is_case_insensitive() {
        let items = sample();
        let view = apply(&items, &Criteria::default().with_sort(SortSpec::asc("name")));
        let names: Vec<&str> = view.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Analytics", "API Gateway", "billing", "Docs site", "Mobile App", "Redesign Site"]
        );
    }

    #[test]
    fn test_sort_stable_both_directions() {
        let items = sample();
        // Projects 2, 3 and 5 share completion 55
        let asc = apply(&items, &Criteria::default().with_sort(SortSpec::asc("completion")));
        assert_eq!(ids(&asc.items, |p| p.id), vec![6, 1, 2, 3, 5, 4]);

        let desc = apply(&items, &Criteria::default().with_sort(SortSpec::desc("completion")));
        assert_eq!(ids(&desc.items, |p| p.id), vec![4, 2, 3, 5, 1, 6]);

        // Planning ties keep their filtered order
        let by_status = apply(&items, &Criteria::default().with_sort(SortSpec::desc("status")));
        assert_eq!(ids(&by_status.items, |p| p.id), vec![1, 3, 6, 5, 2, 4]);
    }

    #[test]
    fn test_unknown_sort_keeps_insertion_order() {
        let items = sample();
        let view = apply(&items, &Criteria::default().with_sort(SortSpec::desc("budget")));
        assert_eq!(ids(&view.items, |p| p.id), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_task_sort_due_missing_last() {
        let mut tasks: Vec<Task> = (1..=4).map(|i| {
            let mut t = Task::new(1, format!("t{}", i));
            t.id = Some(i);
            t
        }).collect();
        tasks[0].due_ts = Some(300);
        tasks[2].due_ts = Some(100);

        let asc = apply(&tasks, &Criteria::default().with_sort(SortSpec::asc("due")));
        assert_eq!(ids(&asc.items, |t| t.id), vec![3, 1, 2, 4]);
        let desc = apply(&tasks, &Criteria::default().with_sort(SortSpec::desc("due")));
        assert_eq!(ids(&desc.items, |t| t.id), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_pagination_completeness() {
        let items = many(23);
        for page_size in [1, 3, 5, 10, 23, 50] {
            let base = Criteria::default()
                .with_sort(SortSpec::desc("completion"))
                .with_page_size(page_size);
            let first = apply(&items, &base);
            assert_eq!(first.total_pages, 23usize.div_ceil(page_size));

            let mut seen = Vec::new();
            for page in 1..=first.total_pages {
                let view = apply(&items, &base.clone().with_page(page));
                assert_eq!(view.page, page);
                assert!(view.items.len() <= page_size);
                seen.extend(ids(&view.items, |p| p.id));
            }

            let mut expected = filter(&items, &base);
            sort(&mut expected, &SortSpec::desc("completion"));
            assert_eq!(seen, ids(&expected, |p| p.id));
        }
    }

    #[test]
    fn test_out_of_range_page_resets_to_first() {
        let items = many(25);
        let view = apply(&items, &Criteria::default().with_page(3));
        assert_eq!(view.page, 3);
        assert_eq!(view.total_pages, 3);

        // Narrowing the filter leaves page 3 out of range
        let narrowed = Criteria::default().with_page(3).with_filter("status", "Completed");
        let view = apply(&items, &narrowed);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.page, 1);
        assert_eq!(view.items.len(), 8);

        let view = apply(&items, &Criteria::default().with_page(0));
        assert_eq!(view.page, 1);
    }

    #[test]
    fn test_empty_store() {
        let items: Vec<Project> = Vec::new();
        let criteria = Criteria::default().with_filter("status", "Planning").with_page(4);
        let view = apply(&items, &criteria);
        assert_eq!(view.total_pages, 0);
        assert_eq!(view.page, 1);
        assert!(view.items.is_empty());
        assert!(!view.has_next());
        assert!(!view.has_previous());
    }

    #[test]
    fn test_zero_page_size_uses_default() {
        let items = many(12);
        let view = apply(&items, &Criteria::default().with_page_size(0));
        assert_eq!(view.page_size, 10);
        assert_eq!(view.total_pages, 2);
        assert!(view.has_next());
    }
}
