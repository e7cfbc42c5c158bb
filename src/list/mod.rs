//! In-memory list engine
//!
//! Turns a slice of projects or tasks plus a [`Criteria`] into one visible
//! page, pagination metadata and facets for filter dropdowns.
//!
//! # Pipeline
//!
//! 1. Filter: search term (name/title or description) and per-field filters
//! 2. Sort: stable, by an allow-listed field, ascending or descending
//! 3. Paginate: 1-indexed pages; an out-of-range page falls back to page 1
//!
//! Facets are computed over the unfiltered items. Nothing here fails:
//! unknown filter or sort fields are ignored and bad pages are reset.
//!
//! # Example
//!
//! ```
//! use taskdeck::list::{self, Criteria, SortSpec};
//! use taskdeck::models::Project;
//!
//! let projects = vec![Project::new("Redesign Site"), Project::new("API Gateway")];
//! let criteria = Criteria::default()
//!     .with_search("site")
//!     .with_sort(SortSpec::parse("name"));
//! let view = list::apply(&projects, &criteria);
//! assert_eq!(view.items.len(), 1);
//! assert_eq!(view.total_pages, 1);
//! ```

pub mod criteria;
pub mod engine;
pub mod facets;
pub mod listable;
pub mod state;

pub use criteria::*;
pub use engine::*;
pub use facets::*;
pub use listable::*;
pub use state::*;

/// Rows per page when none (or zero) is requested
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Filter value meaning "no constraint"
pub const ALL: &str = "All";
