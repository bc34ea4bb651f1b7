use serde::Serialize;

use crate::domain::item::{ClothingItem, ItemId};
use crate::filter::{ItemFilter, Predicate};
use crate::selection::SelectionEngine;

pub const LEAST_WORN_TITLE: &str = "Least Worn → Most Worn";
pub const MOST_POPULAR_TITLE: &str = "Most Worn → Least Worn";

/// At most one ranked view is active at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RankedView {
    #[default]
    None,
    LeastWorn(Vec<ClothingItem>),
    MostPopular(Vec<ClothingItem>),
}

impl RankedView {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Layout<'a> {
    Grid { items: &'a [ClothingItem] },
    Ranked { title: &'static str, items: &'a [ClothingItem] },
}

impl Layout<'_> {
    pub fn items(&self) -> &[ClothingItem] {
        match self {
            Self::Grid { items } | Self::Ranked { items, .. } => items,
        }
    }
}

/// Locally displayed wardrobe state.
///
/// Nothing here reloads on its own: after changing the filter or mutating the
/// store the caller issues an explicit reload through the lifecycle manager.
#[derive(Clone, Debug, Default)]
pub struct WardrobeView {
    items: Vec<ClothingItem>,
    filter: ItemFilter,
    ranked: RankedView,
    engine: SelectionEngine,
}

impl WardrobeView {
    pub fn new(filter: ItemFilter) -> Self {
        Self { filter, ..Self::default() }
    }

    pub fn items(&self) -> &[ClothingItem] {
        &self.items
    }

    pub fn filter(&self) -> ItemFilter {
        self.filter
    }

    pub fn predicate(&self) -> Predicate {
        self.filter.predicate()
    }

    pub fn ranked(&self) -> &RankedView {
        &self.ranked
    }

    pub fn find(&self, id: &ItemId) -> Option<&ClothingItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Stores a new filter and drops any ranked view. The caller must reload.
    pub fn set_filter(&mut self, filter: ItemFilter) {
        self.filter = filter;
        self.ranked = RankedView::None;
    }

    pub fn show_least_worn(&mut self) -> &[ClothingItem] {
        self.ranked = RankedView::LeastWorn(self.engine.rank_least_worn(&self.items));
        self.ranked_items()
    }

    pub fn show_most_popular(&mut self) -> &[ClothingItem] {
        self.ranked = RankedView::MostPopular(self.engine.rank_most_popular(&self.items));
        self.ranked_items()
    }

    fn ranked_items(&self) -> &[ClothingItem] {
        match &self.ranked {
            RankedView::None => &[],
            RankedView::LeastWorn(items) | RankedView::MostPopular(items) => items.as_slice(),
        }
    }

    pub fn replace_items(&mut self, items: Vec<ClothingItem>) {
        self.items = items;
    }

    /// Optimistic removal. Returns the removed item, if it was displayed.
    pub fn remove_local(&mut self, id: &ItemId) -> Option<ClothingItem> {
        let position = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(position))
    }

    /// An empty ranked list falls back to the unranked grid.
    pub fn display(&self) -> Layout<'_> {
        match &self.ranked {
            RankedView::LeastWorn(items) if !items.is_empty() => {
                Layout::Ranked { title: LEAST_WORN_TITLE, items: items.as_slice() }
            }
            RankedView::MostPopular(items) if !items.is_empty() => {
                Layout::Ranked { title: MOST_POPULAR_TITLE, items: items.as_slice() }
            }
            _ => Layout::Grid { items: self.items.as_slice() },
        }
    }
}
