use crate::commands::context::with_wardrobe;
use crate::commands::CommandResult;

const COMMAND: &str = "sweep";

/// Removes uploaded blobs that no item record references.
pub fn run() -> CommandResult {
    with_wardrobe(COMMAND, |wardrobe| async move {
        match wardrobe.lifecycle.sweep_orphan_blobs().await {
            Ok(report) if report.failed.is_empty() => CommandResult::success_with_items(
                COMMAND,
                format!("removed {} of {} stored blob(s)", report.removed.len(), report.scanned),
                &report.removed,
            ),
            Ok(report) => CommandResult::failure(
                COMMAND,
                "store_failure",
                format!(
                    "removed {} blob(s); could not remove: {}",
                    report.removed.len(),
                    report.failed.join(", ")
                ),
                7,
            ),
            Err(error) => CommandResult::from_lifecycle(COMMAND, error),
        }
    })
}
