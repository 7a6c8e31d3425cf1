//! Include-directive grammar and placeholder binding for bdd-include.
//!
//! The crate holds the pure text layer of scenario inclusion: parsing an
//! `@include(...)` tag into an [`IncludeDirective`], splitting tag lines, and
//! binding `<placeholder>` tokens to the values a directive supplies. It does
//! no I/O so hosts and tooling can share the grammar without pulling in the
//! expansion engine.

mod binder;
mod directive;
mod errors;
mod tags;

pub use binder::{Binding, Bindings, count_matches, row_cell_count, substitute};
pub use directive::{IncludeDirective, is_include_tag, parse_include_directive};
pub use errors::DirectiveError;
pub use tags::{is_tag_line, split_tags, tag_name};
