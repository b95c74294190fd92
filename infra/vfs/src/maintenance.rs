use fhub_domain::constants::SCRATCH_DIR;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info};
use walkdir::{DirEntry, WalkDir};

/// Removes abandoned upload chunks older than `threshold` and any scratch
/// directories they leave empty. Also removes stray temp files from
/// interrupted atomic writes.
pub(crate) async fn sweep_scratch(root: &Path, threshold: Duration) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, threshold)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Swept stale upload scratch files");
        },
        Err(e) => {
            error!(error = %e, "Scratch sweep task panicked");
        },
        _ => {},
    }
}

fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .flatten()
        .filter(|e| e.path() != root)
        .for_each(|entry| {
            let path = entry.path();

            if entry.file_type().is_file() {
                if is_sweepable(&entry) && is_stale(&entry, now, threshold) {
                    match std::fs::remove_file(path) {
                        Ok(()) => removed += 1,
                        Err(e) => {
                            tracing::warn!(p = %path.display(), err = %e, "IO fail");
                            failed += 1;
                        },
                    }
                }
            } else if entry.file_type().is_dir() && is_scratch_dir(&entry) {
                // Succeeds only when the sweep (or a finished upload) left it empty.
                let _ = std::fs::remove_dir(path);
            }
        });

    (removed, failed)
}

fn is_scratch_dir(entry: &DirEntry) -> bool {
    entry.file_name().to_str() == Some(SCRATCH_DIR)
}

/// Chunk files live under `.upload-temp`; interrupted atomic writes leave
/// `.<name>.fhubtmp.<n>` siblings anywhere.
fn is_sweepable(entry: &DirEntry) -> bool {
    let in_scratch = entry
        .path()
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == SCRATCH_DIR);

    in_scratch
        || entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.contains(".fhubtmp."))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    std::fs::metadata(entry.path())
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}
