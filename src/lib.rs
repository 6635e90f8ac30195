//! # Sift
//!
//! Filtering, sorting and paging of your own types, driven by a compact
//! micro-syntax that is safe to accept from query strings.
//!
//! Sift provides:
//! - Value filters such as `~joe`, `>=18`, `ISNULL` or `2024-03`
//! - Entity filters that combine them and descend into related entities
//! - Sorts such as `lastname,-firstname`
//! - Pages that resolve to skip/take
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::OnceLock;
//! use sift::prelude::*;
//!
//! struct Book {
//!     title: &'static str,
//!     pages: i64,
//! }
//!
//! impl Entity for Book {
//!     fn model() -> &'static Model {
//!         static MODEL: OnceLock<Model> = OnceLock::new();
//!         MODEL.get_or_init(|| {
//!             Model::builder("Book")
//!                 .field("Title", FieldKind::String)
//!                 .field("Pages", FieldKind::Int)
//!                 .build()
//!         })
//!     }
//!
//!     fn get(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "Title" => self.title.into(),
//!             "Pages" => self.pages.into(),
//!             _ => Value::Null,
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), SiftError> {
//!     let mut books = vec![
//!         Book { title: "Dune", pages: 412 },
//!         Book { title: "Emma", pages: 474 },
//!         Book { title: "Dracula", pages: 418 },
//!     ];
//!
//!     let mut sort = EntitySort::<Book>::new();
//!     sort.add_syntax("-pages")?;
//!     sort.compile()?.sort(&mut books)?;
//!
//!     let mut filter = EntityFilter::<Book>::new();
//!     filter.add_syntax("title", "^d");
//!     let matching = filter.compile()?.filter(&books)?;
//!
//!     let titles: Vec<_> = matching.iter().map(|b| b.title).collect();
//!     assert_eq!(titles, ["Dracula", "Dune"]);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use sift_query::*;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sift_query::prelude::*;
    pub use sift_query::{CompiledFilter, CompiledSort, PageBounds, SiftConfig};
}
