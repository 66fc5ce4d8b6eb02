//! Disk side of a fetch: `.part` temp file, preallocation, atomic finalize.
//!
//! Bodies are streamed into `<destination>.part` and renamed onto the
//! destination only once complete, so the destination path never holds a
//! truncated image. A `PartFile` that is dropped without being finalized
//! removes its temp file.

mod writer;

pub use writer::PartFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `rhcos.iso` → `rhcos.iso.part`).
pub fn part_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}
