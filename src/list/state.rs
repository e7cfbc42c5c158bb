use super::{apply, Criteria, ListView, Listable, SortSpec};

/// Caller-owned criteria for one list
///
/// Every change to search, filters or sort sends the list back to page 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    criteria: Criteria,
}

impl ListState {
    pub fn new(page_size: usize) -> Self {
        Self { criteria: Criteria::default().with_page_size(page_size) }
    }

    pub fn from_criteria(criteria: Criteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn page(&self) -> usize {
        self.criteria.page
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
        self.criteria.page = 1;
    }

    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.criteria.filters.insert(field.into().to_lowercase(), value.into());
        self.criteria.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.criteria.sort = sort;
        self.criteria.page = 1;
    }

    /// Same field flips the direction; a new field starts ascending
    pub fn toggle_sort(&mut self, field: &str) {
        let field = field.trim().to_lowercase();
        let next = match self.criteria.sort.take() {
            Some(current) if current.field == field => SortSpec {
                direction: current.direction.flip(),
                ..current
            },
            _ => SortSpec::asc(field),
        };
        self.set_sort(Some(next));
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.criteria.page_size = page_size;
        self.criteria.page = 1;
    }

    /// Reset search and filters, keeping sort and page size
    pub fn clear_filters(&mut self) {
        self.criteria.search.clear();
        self.criteria.filters.clear();
        self.criteria.page = 1;
    }

    /// Move to `page` if it lies within `1..=total_pages`. Returns whether the
    /// page changed.
    pub fn change_page(&mut self, page: usize, total_pages: usize) -> bool {
        if page < 1 || page > total_pages || page == self.criteria.page {
            return false;
        }
        self.criteria.page = page;
        true
    }

    pub fn apply<'a, T: Listable>(&self, items: &'a [T]) -> ListView<'a, T> {
        apply(items, &self.criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::SortDirection;
    use crate::models::{Project, ProjectStatus};

    fn projects(n: usize) -> Vec<Project> {
        (0..n)
            .map(|i| {
                let mut p = Project::new(format!("Project {}", i));
                if i % 5 == 0 {
                    p.status = ProjectStatus::Completed;
                }
                p
            })
            .collect()
    }

    #[test]
    fn test_toggle_sort() {
        let mut state = ListState::default();
        state.toggle_sort("name");
        assert_eq!(state.criteria().sort, Some(SortSpec::asc("name")));
        state.toggle_sort("name");
        assert_eq!(state.criteria().sort.as_ref().map(|s| s.direction), Some(SortDirection::Descending));
        state.toggle_sort("completion");
        assert_eq!(state.criteria().sort, Some(SortSpec::asc("completion")));
    }

    #[test]
    fn test_change_page_ignores_out_of_range() {
        let mut state = ListState::new(10);
        assert!(state.change_page(3, 3));
        assert_eq!(state.page(), 3);
        assert!(!state.change_page(4, 3));
        assert!(!state.change_page(0, 3));
        assert_eq!(state.page(), 3);
    }

    #[test]
    fn test_criteria_changes_reset_page() {
        let items = projects(30);
        let mut state = ListState::new(10);
        let total = state.apply(&items).total_pages;
        assert!(state.change_page(3, total));

        state.set_filter("status", "Completed");
        assert_eq!(state.page(), 1);
        let view = state.apply(&items);
        assert_eq!(view.total_count, 6);
        assert_eq!(view.page, 1);

        assert!(!state.change_page(2, view.total_pages));
        state.set_search("project");
        assert_eq!(state.page(), 1);

        state.toggle_sort("name");
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_page_size_change_returns_to_first_page() {
        let items = projects(25);
        let mut state = ListState::from_criteria(Criteria::default().with_page(3));
        assert_eq!(state.apply(&items).page, 3);

        state.set_page_size(20);
        let view = state.apply(&items);
        assert_eq!((view.page, view.total_pages, view.items.len()), (1, 2, 20));
    }

    #[test]
    fn test_clear_filters() {
        let mut state = ListState::new(5);
        state.set_search("api");
        state.set_filter("tag", "Go");
        state.toggle_sort("name");
        state.clear_filters();

        assert!(state.criteria().search.is_empty());
        assert!(state.criteria().filters.is_empty());
        assert_eq!(state.criteria().sort, Some(SortSpec::asc("name")));
        assert_eq!(state.criteria().page_size, 5);
    }
}
