use std::io::{self, BufRead, Write};

use wardrobe_core::domain::item::ItemId;
use wardrobe_core::filter::ItemFilter;
use wardrobe_core::lifecycle::DeleteOutcome;

use crate::commands::context::with_wardrobe;
use crate::commands::CommandResult;

const COMMAND: &str = "delete";

/// Deletes an item after confirmation. `--yes` skips the interactive prompt.
pub fn run(id: &str, assume_yes: bool) -> CommandResult {
    if assume_yes {
        run_with_confirmation(id, |_| true)
    } else {
        run_with_confirmation(id, confirm_on_stdin)
    }
}

pub fn run_with_confirmation<F>(id: &str, confirm: F) -> CommandResult
where
    F: FnOnce(&str) -> bool,
{
    let id = ItemId(id.trim().to_string());

    with_wardrobe(COMMAND, |wardrobe| async move {
        let mut view = match wardrobe.load_view(COMMAND, ItemFilter::default()).await {
            Ok(view) => view,
            Err(result) => return result,
        };

        let Some(storage_path) = view.find(&id).map(|item| item.storage_path.clone()) else {
            return CommandResult::failure(
                COMMAND,
                "bad_request",
                format!("no clothing item with id `{id}`"),
                6,
            );
        };

        match wardrobe.lifecycle.delete_item(&mut view, &id, &storage_path, confirm).await {
            DeleteOutcome::Declined => CommandResult::success(COMMAND, "delete cancelled"),
            DeleteOutcome::Deleted { item_id } => {
                CommandResult::success(COMMAND, format!("deleted item `{item_id}`"))
            }
            DeleteOutcome::Failed { phase, error, notice, reconciled } => {
                let reconciled = if reconciled { "list reloaded" } else { "reload also failed" };
                CommandResult::failure(
                    COMMAND,
                    "store_failure",
                    format!("{} ({phase:?}: {error}; {reconciled})", notice.message),
                    7,
                )
            }
        }
    })
}

fn confirm_on_stdin(prompt: &str) -> bool {
    let mut stderr = io::stderr();
    if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
