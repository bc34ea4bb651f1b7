use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClothingType {
    #[serde(rename = "T-Shirt")]
    TShirt,
    Shirts,
    Jackets,
    Hoodies,
    Pants,
    Shorts,
    Shoes,
}

impl ClothingType {
    pub const ALL: [ClothingType; 7] = [
        ClothingType::TShirt,
        ClothingType::Shirts,
        ClothingType::Jackets,
        ClothingType::Hoodies,
        ClothingType::Pants,
        ClothingType::Shorts,
        ClothingType::Shoes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TShirt => "T-Shirt",
            Self::Shirts => "Shirts",
            Self::Jackets => "Jackets",
            Self::Hoodies => "Hoodies",
            Self::Pants => "Pants",
            Self::Shorts => "Shorts",
            Self::Shoes => "Shoes",
        }
    }
}

impl fmt::Display for ClothingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClothingType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::UnknownLabel { field: "type", value: trimmed.to_string() })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occasion {
    Chill,
    #[serde(rename = "Going Out")]
    GoingOut,
}

impl Occasion {
    pub const ALL: [Occasion; 2] = [Occasion::Chill, Occasion::GoingOut];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chill => "Chill",
            Self::GoingOut => "Going Out",
        }
    }
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Occasion {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        // "going-out" and "going_out" are accepted as CLI-friendly spellings.
        let normalized = trimmed.replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| DomainError::UnknownLabel {
                field: "occasion",
                value: trimmed.to_string(),
            })
    }
}

/// A stored clothing item as loaded from the item store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub item_type: ClothingType,
    pub occasion: Occasion,
    pub image_url: String,
    pub storage_path: String,
    pub wear_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Fields for a record that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewItem {
    pub item_type: ClothingType,
    pub occasion: Occasion,
    pub image_url: String,
    pub storage_path: String,
}

/// A single-field update accepted by the item store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldUpdate {
    WearCount(u32),
}

impl FieldUpdate {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::WearCount(_) => "wear_count",
        }
    }
}

/// The mutation produced by wearing an item: `to` is always `from + 1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WearIncrement {
    pub item_id: ItemId,
    pub from: u32,
    pub to: u32,
}

impl WearIncrement {
    pub fn for_item(item: &ClothingItem) -> Self {
        // u32::MAX wears is unreachable in practice; saturate rather than wrap to zero.
        Self {
            item_id: item.id.clone(),
            from: item.wear_count,
            to: item.wear_count.saturating_add(1),
        }
    }

    pub fn as_update(&self) -> FieldUpdate {
        FieldUpdate::WearCount(self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClothingType, Occasion};
    use crate::errors::DomainError;

    #[test]
    fn labels_round_trip_through_display_and_parse() {
        for item_type in ClothingType::ALL {
            assert_eq!(item_type.to_string().parse::<ClothingType>(), Ok(item_type));
        }
        for occasion in Occasion::ALL {
            assert_eq!(occasion.to_string().parse::<Occasion>(), Ok(occasion));
        }
    }

    #[test]
    fn parsing_is_case_insensitive_and_accepts_cli_spellings() {
        assert_eq!("t-shirt".parse::<ClothingType>(), Ok(ClothingType::TShirt));
        assert_eq!(" SHOES ".parse::<ClothingType>(), Ok(ClothingType::Shoes));
        assert_eq!("going-out".parse::<Occasion>(), Ok(Occasion::GoingOut));
        assert_eq!("going_out".parse::<Occasion>(), Ok(Occasion::GoingOut));
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let error = "Socks".parse::<ClothingType>().expect_err("socks are not a type");
        assert_eq!(error, DomainError::UnknownLabel { field: "type", value: "Socks".to_string() });

        let error = "Formal".parse::<Occasion>().expect_err("formal is not an occasion");
        assert!(matches!(error, DomainError::UnknownLabel { field: "occasion", .. }));
    }

    #[test]
    fn serde_uses_display_labels() {
        let json = serde_json::to_string(&ClothingType::TShirt).expect("serialize type");
        assert_eq!(json, "\"T-Shirt\"");
        let json = serde_json::to_string(&Occasion::GoingOut).expect("serialize occasion");
        assert_eq!(json, "\"Going Out\"");
    }
}
