use crate::commands::context::{parse_filter, with_wardrobe};
use crate::commands::CommandResult;

const COMMAND: &str = "list";

pub fn run(type_label: Option<&str>, occasion_label: Option<&str>) -> CommandResult {
    let filter = match parse_filter(COMMAND, type_label, occasion_label) {
        Ok(filter) => filter,
        Err(result) => return result,
    };

    with_wardrobe(COMMAND, |wardrobe| async move {
        let view = match wardrobe.load_view(COMMAND, filter).await {
            Ok(view) => view,
            Err(result) => return result,
        };
        let layout = view.display();
        CommandResult::success_with_items(
            COMMAND,
            format!("{} item(s)", layout.items().len()),
            layout.items(),
        )
    })
}
