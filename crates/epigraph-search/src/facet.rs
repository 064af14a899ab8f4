//! Facet declarations and per-facet display settings.

use epigraph_index::IndexItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of options shown per facet by default.
pub const OPTIONS_PER_FACET: usize = 15;

/// Number of options shown for an expanded facet.
pub const OPTIONS_PER_FACET_EXPANDED: usize = 100;

/// The categorical fields results are aggregated and filtered over.
///
/// Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FacetKey {
    Script,
    Allograph,
    Tags,
    Components,
    Features,
    ComponentFeatures,
}

impl FacetKey {
    pub const ALL: [FacetKey; 6] = [
        FacetKey::Script,
        FacetKey::Allograph,
        FacetKey::Tags,
        FacetKey::Components,
        FacetKey::Features,
        FacetKey::ComponentFeatures,
    ];

    /// Wire code, matching the index document's field names.
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetKey::Script => "scr",
            FacetKey::Allograph => "chr",
            FacetKey::Tags => "tag",
            FacetKey::Components => "com",
            FacetKey::Features => "fea",
            FacetKey::ComponentFeatures => "cxf",
        }
    }

    /// Human-readable facet title.
    pub fn title(&self) -> &'static str {
        match self {
            FacetKey::Script => "Script",
            FacetKey::Allograph => "Allograph",
            FacetKey::Tags => "Tags",
            FacetKey::Components => "Components",
            FacetKey::Features => "Features",
            FacetKey::ComponentFeatures => "Component x Features",
        }
    }

    /// An item's values for this facet. Empty scalar fields contribute
    /// no value.
    pub fn values<'a>(&self, item: &'a IndexItem) -> Vec<&'a str> {
        match self {
            FacetKey::Script => scalar(&item.script),
            FacetKey::Allograph => scalar(&item.allograph),
            FacetKey::Tags => item.tags.iter().map(String::as_str).collect(),
            FacetKey::Components => item.components.iter().map(String::as_str).collect(),
            FacetKey::Features => item.features.iter().map(String::as_str).collect(),
            FacetKey::ComponentFeatures => {
                item.component_features.iter().map(String::as_str).collect()
            }
        }
    }
}

fn scalar(value: &str) -> Vec<&str> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value]
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raised when a wire code does not name a facet.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown facet key: {0}")]
pub struct UnknownFacetError(pub String);

impl FromStr for FacetKey {
    type Err = UnknownFacetError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        FacetKey::ALL
            .into_iter()
            .find(|key| key.as_str() == raw)
            .ok_or_else(|| UnknownFacetError(raw.to_string()))
    }
}

impl Serialize for FacetKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FacetKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Column a facet's buckets are sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetSort {
    Key,
    Count,
}

impl FacetSort {
    /// The natural order of a freshly selected sort column.
    fn natural_order(&self) -> SortOrder {
        match self {
            FacetSort::Key => SortOrder::Asc,
            FacetSort::Count => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn flipped(&self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Per-facet display settings. Serializable so the caller can persist
/// them across sessions, independent of any single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSettings {
    pub sort: FacetSort,
    pub order: SortOrder,
    pub size: usize,
}

impl Default for FacetSettings {
    fn default() -> Self {
        Self {
            sort: FacetSort::Count,
            order: SortOrder::Desc,
            size: OPTIONS_PER_FACET,
        }
    }
}

impl FacetSettings {
    /// Defaults per facet: combined component × feature labels read best
    /// sorted by key.
    pub fn default_for(key: FacetKey) -> Self {
        match key {
            FacetKey::ComponentFeatures => Self {
                sort: FacetSort::Key,
                order: SortOrder::Asc,
                size: OPTIONS_PER_FACET,
            },
            _ => Self::default(),
        }
    }

    /// Column click: re-clicking the active column flips the order,
    /// selecting the other column applies its natural order.
    pub fn toggle_column(&mut self, column: FacetSort) {
        if self.sort == column {
            self.order = self.order.flipped();
        } else {
            self.sort = column;
            self.order = column.natural_order();
        }
    }

    pub fn toggle_expanded(&mut self) {
        self.size = if self.size == OPTIONS_PER_FACET {
            OPTIONS_PER_FACET_EXPANDED
        } else {
            OPTIONS_PER_FACET
        };
    }

    pub fn is_expanded(&self) -> bool {
        self.size != OPTIONS_PER_FACET
    }
}

/// The engine's facet configuration: which facets to aggregate, their
/// settings, and whether empty buckets are hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub facets: BTreeMap<FacetKey, FacetSettings>,
    pub hide_zero_count: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            facets: FacetKey::ALL
                .into_iter()
                .map(|key| (key, FacetSettings::default_for(key)))
                .collect(),
            hide_zero_count: true,
        }
    }
}
