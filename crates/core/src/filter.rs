//! Translation of the user's type/occasion selectors into an item-store predicate.
//!
//! An unset selector is omitted from the predicate entirely; it never turns into an
//! equality test against an empty label.

use serde::Serialize;

use crate::domain::item::{ClothingItem, ClothingType, Occasion};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ItemFilter {
    pub type_filter: Option<ClothingType>,
    pub occasion_filter: Option<Occasion>,
}

impl ItemFilter {
    pub fn new(type_filter: Option<ClothingType>, occasion_filter: Option<Occasion>) -> Self {
        Self { type_filter, occasion_filter }
    }

    /// Builds a filter from raw selector labels where `""` means "all".
    pub fn from_labels(
        type_label: Option<&str>,
        occasion_label: Option<&str>,
    ) -> Result<Self, DomainError> {
        let type_filter = non_empty(type_label).map(str::parse::<ClothingType>).transpose()?;
        let occasion_filter = non_empty(occasion_label).map(str::parse::<Occasion>).transpose()?;
        Ok(Self { type_filter, occasion_filter })
    }

    pub fn is_unfiltered(&self) -> bool {
        self.type_filter.is_none() && self.occasion_filter.is_none()
    }

    pub fn predicate(&self) -> Predicate {
        build_query(self.type_filter, self.occasion_filter)
    }
}

fn non_empty(label: Option<&str>) -> Option<&str> {
    label.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldEquals {
    Type(ClothingType),
    Occasion(Occasion),
}

impl FieldEquals {
    pub fn matches(&self, item: &ClothingItem) -> bool {
        match self {
            Self::Type(item_type) => item.item_type == *item_type,
            Self::Occasion(occasion) => item.occasion == *occasion,
        }
    }
}

/// Conjunction of field equality tests. No conditions means "match everything".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Predicate {
    conditions: Vec<FieldEquals>,
}

impl Predicate {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn conditions(&self) -> &[FieldEquals] {
        &self.conditions
    }

    pub fn is_match_all(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, item: &ClothingItem) -> bool {
        self.conditions.iter().all(|condition| condition.matches(item))
    }
}

pub fn build_query(
    type_filter: Option<ClothingType>,
    occasion_filter: Option<Occasion>,
) -> Predicate {
    let mut conditions = Vec::with_capacity(2);
    if let Some(item_type) = type_filter {
        conditions.push(FieldEquals::Type(item_type));
    }
    if let Some(occasion) = occasion_filter {
        conditions.push(FieldEquals::Occasion(occasion));
    }
    Predicate { conditions }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{build_query, FieldEquals, ItemFilter};
    use crate::domain::item::{ClothingItem, ClothingType, ItemId, Occasion};

    fn item(id: &str, item_type: ClothingType, occasion: Occasion) -> ClothingItem {
        ClothingItem {
            id: ItemId(id.to_string()),
            item_type,
            occasion,
            image_url: format!("file:///tmp/{id}.jpg"),
            storage_path: format!("clothes/{id}.jpg_1"),
            wear_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_filters_matches_everything() {
        let predicate = build_query(None, None);

        assert!(predicate.is_match_all());
        assert!(predicate.matches(&item("a", ClothingType::Shoes, Occasion::Chill)));
        assert!(predicate.matches(&item("b", ClothingType::Jackets, Occasion::GoingOut)));
    }

    #[test]
    fn both_filters_form_a_conjunction() {
        let predicate = build_query(Some(ClothingType::Shoes), Some(Occasion::GoingOut));

        assert_eq!(
            predicate.conditions(),
            &[FieldEquals::Type(ClothingType::Shoes), FieldEquals::Occasion(Occasion::GoingOut)]
        );
        assert!(predicate.matches(&item("a", ClothingType::Shoes, Occasion::GoingOut)));
        assert!(!predicate.matches(&item("b", ClothingType::Shoes, Occasion::Chill)));
        assert!(!predicate.matches(&item("c", ClothingType::Pants, Occasion::GoingOut)));
    }

    #[test]
    fn type_only_filter_ignores_occasion() {
        let items = [
            item("a", ClothingType::Shoes, Occasion::Chill),
            item("b", ClothingType::Shoes, Occasion::GoingOut),
            item("c", ClothingType::Hoodies, Occasion::Chill),
        ];
        let predicate = ItemFilter::new(Some(ClothingType::Shoes), None).predicate();

        let matched: Vec<&str> = items
            .iter()
            .filter(|item| predicate.matches(item))
            .map(|item| item.id.0.as_str())
            .collect();
        assert_eq!(matched, vec!["a", "b"]);
    }

    #[test]
    fn empty_labels_are_omitted_from_the_predicate() {
        let filter = ItemFilter::from_labels(Some(""), Some("  ")).expect("empty labels parse");
        assert!(filter.is_unfiltered());
        assert!(filter.predicate().is_match_all());

        let filter = ItemFilter::from_labels(Some(""), Some("Chill")).expect("labels parse");
        assert_eq!(filter.predicate().conditions(), &[FieldEquals::Occasion(Occasion::Chill)]);
    }

    #[test]
    fn unknown_labels_fail_to_build_a_filter() {
        assert!(ItemFilter::from_labels(Some("Hats"), None).is_err());
    }
}
