use wardrobe_core::domain::item::ItemId;
use wardrobe_core::filter::ItemFilter;

use crate::commands::context::with_wardrobe;
use crate::commands::CommandResult;

const COMMAND: &str = "wear";

pub fn run(id: &str) -> CommandResult {
    let id = ItemId(id.trim().to_string());

    with_wardrobe(COMMAND, |wardrobe| async move {
        let mut view = match wardrobe.load_view(COMMAND, ItemFilter::default()).await {
            Ok(view) => view,
            Err(result) => return result,
        };

        match wardrobe.lifecycle.mark_worn(&mut view, &id).await {
            Ok(increment) => {
                let worn: Vec<_> = view.find(&id).into_iter().cloned().collect();
                CommandResult::success_with_items(
                    COMMAND,
                    format!("wear count {} -> {}", increment.from, increment.to),
                    &worn,
                )
            }
            Err(error) => CommandResult::from_lifecycle(COMMAND, error),
        }
    })
}
