//! `includepy_core` replaces directive blocks in markdown documents with the
//! source code of python functions and classes. Documentation keeps showing
//! the real code instead of a copy that drifts out of date.
//!
//! ## Directives
//!
//! A block starts with the python file and names the object to include:
//!
//! ```text
//! -->includepy<-- tests/fixtures/sample.py
//! -->pyobject<-- Counter.increment
//! -->lines_before<-- 1
//! -->extra_indent<-- 4
//! ```
//!
//! Options: `pyobject` (required, dotted for nested definitions),
//! `lines_before`, `lines_after`, `extra_indent`, and `only_lines` (for
//! example `1,3-5,8-`). A block ends at the first line that is not an active
//! directive. Prefixing a directive with `;` prints it with one `;` removed
//! instead of running it.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document lines
//!   → Directive parser (Echo / Collecting state machine)
//!   → Extractor (reads the python file, parses it with tree-sitter)
//!   → Symbol locator (dotted name → line span)
//!   → Window, dedent, only_lines, re-indent
//!   → Output lines
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use includepy_core::Extractor;
//! use includepy_core::IncludePy;
//!
//! let includepy = IncludePy::new(Extractor::new("."));
//! let lines = ["```python", "-->includepy<-- tests/fixtures/sample.py", "-->pyobject<-- fibonacci", "```"];
//! let output = includepy.run(&lines).unwrap();
//! println!("{}", output.join("\n"));
//! ```

pub use config::*;
pub use error::*;
pub use extract::*;
pub use line_range::*;
pub use marker::*;
pub use options::*;
pub use pipeline::*;
pub use processor::*;
pub use symbol::*;

pub mod config;
#[allow(unused_assignments)]
mod error;
mod extract;
mod line_range;
mod marker;
mod options;
mod pipeline;
mod processor;
pub mod project;
pub mod python;
mod symbol;
