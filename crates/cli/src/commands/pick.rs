use crate::commands::context::{parse_filter, with_wardrobe};
use crate::commands::CommandResult;

const COMMAND: &str = "pick";

/// Picks a random item from the filtered set and records one wear for it.
pub fn run(type_label: Option<&str>, occasion_label: Option<&str>) -> CommandResult {
    let filter = match parse_filter(COMMAND, type_label, occasion_label) {
        Ok(filter) => filter,
        Err(result) => return result,
    };

    with_wardrobe(COMMAND, |wardrobe| async move {
        let mut view = match wardrobe.load_view(COMMAND, filter).await {
            Ok(view) => view,
            Err(result) => return result,
        };

        let mut rng = rand::thread_rng();
        match wardrobe.lifecycle.pick_random(&mut view, &mut rng).await {
            Ok(Some(pick)) => {
                let worn: Vec<_> = view.find(&pick.item.id).into_iter().cloned().collect();
                CommandResult::success_with_items(COMMAND, pick.message(), &worn)
            }
            Ok(None) => CommandResult::success(COMMAND, "nothing to pick from"),
            Err(error) => CommandResult::from_lifecycle(COMMAND, error),
        }
    })
}
