use crate::error::{ArchiveError, Error, Result};
use crate::types::EntrySelection;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Archive extractor for ZIP files
pub struct ZipExtractor;

impl ZipExtractor {
    /// Open a ZIP archive, mapping failures to [`ArchiveError::Unreadable`]
    fn open(archive_path: &Path) -> Result<zip::ZipArchive<File>> {
        let file = File::open(archive_path)?;
        zip::ZipArchive::new(file).map_err(|e| unreadable(archive_path, e))
    }

    /// Indices of file entries whose name ends with `suffix`, in archive order
    ///
    /// Uses raw access so entry headers are read without decompressing.
    pub fn matching_entries(
        archive: &mut zip::ZipArchive<File>,
        archive_path: &Path,
        suffix: &str,
    ) -> Result<Vec<(usize, String)>> {
        let mut matches = Vec::new();
        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .map_err(|e| unreadable(archive_path, e))?;
            if !entry.is_dir() && entry.name().ends_with(suffix) {
                matches.push((i, entry.name().to_string()));
            }
        }
        Ok(matches)
    }

    /// Write the entry at `index` below `target_dir`, keeping its relative name
    fn write_entry(
        archive: &mut zip::ZipArchive<File>,
        archive_path: &Path,
        index: usize,
        target_dir: &Path,
    ) -> Result<PathBuf> {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| unreadable(archive_path, e))?;

        let relative = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| ArchiveError::UnsafeEntryPath {
                archive: archive_path.to_path_buf(),
                entry: entry.name().to_string(),
            })?;
        let out_path = target_dir.join(relative);

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let copied = {
            let mut out = File::create(&out_path)?;
            std::io::copy(&mut entry, &mut out)
        };
        match copied {
            Ok(bytes) => {
                debug!(?out_path, bytes, "entry written");
                Ok(out_path)
            }
            Err(e) => {
                // Don't leave a truncated document behind
                let _ = std::fs::remove_file(&out_path);
                Err(Error::Io(e))
            }
        }
    }

    /// Extract the first entry ending in `suffix`
    ///
    /// An archive with zero entries is an error; an archive whose entries
    /// simply don't match is not.
    pub fn extract_first_matching(
        archive_path: &Path,
        target_dir: &Path,
        suffix: &str,
    ) -> Result<EntrySelection> {
        debug!(?archive_path, ?target_dir, suffix, "selecting archive entry");

        let mut archive = Self::open(archive_path)?;
        if archive.is_empty() {
            return Err(ArchiveError::Empty {
                archive: archive_path.to_path_buf(),
            }
            .into());
        }

        let matches = Self::matching_entries(&mut archive, archive_path, suffix)?;
        let match_count = matches.len();

        let Some((index, name)) = matches.into_iter().next() else {
            warn!(
                ?archive_path,
                suffix,
                entries = archive.len(),
                "no entry with expected suffix"
            );
            return Ok(EntrySelection {
                extracted: None,
                match_count: 0,
            });
        };

        if match_count > 1 {
            warn!(?archive_path, match_count, "multiple matching entries, using {}", name);
        }

        std::fs::create_dir_all(target_dir)?;
        let path = Self::write_entry(&mut archive, archive_path, index, target_dir)?;

        info!(?archive_path, ?path, match_count, "ZIP entry extracted");

        Ok(EntrySelection {
            extracted: Some(path),
            match_count,
        })
    }
}

fn unreadable(archive_path: &Path, cause: zip::result::ZipError) -> Error {
    ArchiveError::Unreadable {
        archive: archive_path.to_path_buf(),
        cause,
    }
    .into()
}
