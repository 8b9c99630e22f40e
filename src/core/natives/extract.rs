use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{ExtractRule, ResolvedVersion};

/// Unpack one native archive into `target_dir`, skipping directories and any
/// entry whose name starts with an excluded prefix.
///
/// Returns the number of files written.
pub fn extract_native(
    archive_path: &Path,
    target_dir: &Path,
    rule: Option<&ExtractRule>,
) -> LauncherResult<usize> {
    let file = std::fs::File::open(archive_path)
        .map_err(|e| LauncherError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;
    let excluded = rule.map(|r| r.exclude.as_slice()).unwrap_or_default();

    let mut extracted = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if excluded.iter().any(|prefix| name.starts_with(prefix.as_str())) {
            continue;
        }

        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping unsafe entry {:?} in {:?}", name, archive_path);
            continue;
        };

        let out_path = target_dir.join(relative);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }

        let mut out = std::fs::File::create(&out_path)
            .map_err(|e| LauncherError::io(&out_path, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| LauncherError::io(&out_path, e))?;
        extracted += 1;
    }

    debug!("Extracted {} files from {:?}", extracted, archive_path);
    Ok(extracted)
}

/// Extract every native archive of `version` into a fresh `natives_dir`.
///
/// Archives missing from `libraries_dir` are skipped with a warning.
pub async fn extract_natives(
    version: &ResolvedVersion,
    libraries_dir: &Path,
    natives_dir: &Path,
) -> LauncherResult<PathBuf> {
    if natives_dir.exists() {
        tokio::fs::remove_dir_all(natives_dir)
            .await
            .map_err(|e| LauncherError::io(natives_dir, e))?;
    }
    tokio::fs::create_dir_all(natives_dir)
        .await
        .map_err(|e| LauncherError::io(natives_dir, e))?;

    let mut total = 0;
    for native in &version.natives {
        let archive_path = native.file.local_path(libraries_dir);
        if !archive_path.exists() {
            warn!("Native archive missing: {:?}", archive_path);
            continue;
        }

        let target = natives_dir.to_path_buf();
        let rule = native.extract.clone();
        total += tokio::task::spawn_blocking(move || {
            extract_native(&archive_path, &target, rule.as_ref())
        })
        .await
        .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))??;
    }

    info!(
        "Extracted {} native files for {} into {:?}",
        total, version.id, natives_dir
    );
    Ok(natives_dir.to_path_buf())
}
