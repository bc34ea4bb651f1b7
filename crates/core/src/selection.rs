use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::domain::item::{ClothingItem, WearIncrement};
use crate::errors::SelectionError;

/// A random pick together with the wear increment it implies.
///
/// Selection and mutation are returned side by side so callers can inspect the
/// distribution of picks without applying the increment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RandomPick {
    pub item: ClothingItem,
    pub increment: WearIncrement,
}

impl RandomPick {
    pub fn message(&self) -> String {
        format!("Today's pick: {} ({})", self.item.item_type, self.item.occasion)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionEngine;

impl SelectionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn pick_random<R>(
        &self,
        items: &[ClothingItem],
        rng: &mut R,
    ) -> Result<RandomPick, SelectionError>
    where
        R: Rng + ?Sized,
    {
        let item = items.choose(rng).ok_or(SelectionError::EmptySet)?;
        Ok(RandomPick { increment: self.mark_worn(item), item: item.clone() })
    }

    /// Ascending by wear count. `sort_by_key` is stable, so equal counts keep load order.
    pub fn rank_least_worn(&self, items: &[ClothingItem]) -> Vec<ClothingItem> {
        let mut ranked = items.to_vec();
        ranked.sort_by_key(|item| item.wear_count);
        ranked
    }

    pub fn rank_most_popular(&self, items: &[ClothingItem]) -> Vec<ClothingItem> {
        let mut ranked = items.to_vec();
        ranked.sort_by_key(|item| std::cmp::Reverse(item.wear_count));
        ranked
    }

    pub fn mark_worn(&self, item: &ClothingItem) -> WearIncrement {
        WearIncrement::for_item(item)
    }
}
