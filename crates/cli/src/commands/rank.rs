use wardrobe_core::view::Layout;

use crate::commands::context::{parse_filter, with_wardrobe};
use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankOrder {
    LeastWorn,
    MostPopular,
}

impl RankOrder {
    fn command(self) -> &'static str {
        match self {
            Self::LeastWorn => "least-worn",
            Self::MostPopular => "most-popular",
        }
    }
}

pub fn run(
    order: RankOrder,
    type_label: Option<&str>,
    occasion_label: Option<&str>,
) -> CommandResult {
    let command = order.command();
    let filter = match parse_filter(command, type_label, occasion_label) {
        Ok(filter) => filter,
        Err(result) => return result,
    };

    with_wardrobe(command, |wardrobe| async move {
        let mut view = match wardrobe.load_view(command, filter).await {
            Ok(view) => view,
            Err(result) => return result,
        };

        match order {
            RankOrder::LeastWorn => view.show_least_worn(),
            RankOrder::MostPopular => view.show_most_popular(),
        };

        match view.display() {
            Layout::Ranked { title, items } => {
                CommandResult::success_with_items(command, title, items)
            }
            Layout::Grid { items } => {
                CommandResult::success_with_items(command, "no items to rank", items)
            }
        }
    })
}
