//! Local file naming from asset URLs.
//!
//! An image is stored under the final path segment of its URL, so the same
//! URL always maps to the same file inside the data directory.

mod path;

pub use path::basename;
