//! Cleanup for images the database does not end up referencing.

use crate::cloudinary::public_id_from_url;
use crate::state::AppState;

/// Best-effort removal of an uploaded image. Failures are only logged.
pub(crate) async fn discard_upload(state: &AppState, url: Option<&str>) {
    let Some(public_id) = url.and_then(public_id_from_url) else {
        return;
    };
    if let Err(err) = state.cloudinary().destroy(&public_id).await {
        tracing::warn!(error = %err, public_id = %public_id, "Failed to remove orphaned upload");
    }
}

/// The side of an image swap that no row points at once the write is done.
///
/// A failed write leaves the fresh uploads unreferenced. A successful one
/// leaves the assets it replaced.
pub(crate) fn unreferenced<'a>(
    write_succeeded: bool,
    uploaded: &'a [String],
    replaced: &'a [String],
) -> &'a [String] {
    if write_succeeded { replaced } else { uploaded }
}

/// Remove the [`unreferenced`] images after a write that stored `uploaded`
/// in place of `replaced`.
pub(crate) async fn settle_uploads(
    state: &AppState,
    write_succeeded: bool,
    uploaded: &[String],
    replaced: &[String],
) {
    for url in unreferenced(write_succeeded, uploaded, replaced) {
        discard_upload(state, Some(url)).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn urls(names: &[&str]) -> Vec<String> {
        names
            .iter()
            .map(|n| format!("https://res.cloudinary.com/demo/image/upload/v1/user-images/{n}.jpg"))
            .collect()
    }

    #[test]
    fn test_failed_write_drops_new_uploads() {
        let uploaded = urls(&["new"]);
        let replaced = urls(&["old"]);
        assert_eq!(unreferenced(false, &uploaded, &replaced), uploaded.as_slice());
    }

    #[test]
    fn test_successful_write_drops_replaced_assets() {
        let uploaded = urls(&["new-1", "new-2"]);
        let replaced = urls(&["old-1", "old-2", "old-3"]);
        assert_eq!(unreferenced(true, &uploaded, &replaced), replaced.as_slice());
    }

    #[test]
    fn test_nothing_replaced_keeps_everything() {
        let uploaded = urls(&["new"]);
        assert!(unreferenced(true, &uploaded, &[]).is_empty());
        assert!(unreferenced(false, &[], &urls(&["old"])).is_empty());
    }
}
