//! Archive extraction
//!
//! Picks the record document out of the downloaded archive. Only the first
//! entry (in the archive's own order) whose name ends with the requested
//! suffix is written out; further matches are counted but ignored.

mod zip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use zip::ZipExtractor;

use crate::error::Result;
use crate::types::EntrySelection;
use std::path::Path;

/// Extract the first entry of `archive_path` ending in `suffix` into `target_dir`
///
/// # Returns
/// * `Ok(EntrySelection { extracted: Some(path), .. })` - entry written under its original relative name
/// * `Ok(EntrySelection { extracted: None, .. })` - no entry matched
/// * `Err(Error::Archive(..))` - unreadable or empty archive
///
/// # Example
/// ```no_run
/// use dltins_etl::extraction::extract_document;
/// use std::path::Path;
///
/// # fn example() -> dltins_etl::error::Result<()> {
/// let selection = extract_document(Path::new("data/dltins.zip"), Path::new("data"), ".xml")?;
/// if let Some(path) = selection.extracted {
///     println!("record document at {}", path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn extract_document(
    archive_path: &Path,
    target_dir: &Path,
    suffix: &str,
) -> Result<EntrySelection> {
    ZipExtractor::extract_first_matching(archive_path, target_dir, suffix)
}
