//! Cleaning terminal text for plain consumers.
//!
//! # Example
//!
//! ```
//! use shell_mirror::output::{OutputSanitizer, StripMode};
//!
//! let raw = b"\x1b[31mRed text\x1b[0m";
//! assert_eq!(OutputSanitizer::strip_ansi(raw), "Red text");
//!
//! let line = "open file:///tmp/report.txt now";
//! assert_eq!(OutputSanitizer::strip(line, StripMode::Plain), "open  now");
//! ```

mod sanitizer;

pub use sanitizer::{OutputSanitizer, StripMode};
