//! Menu filtering and ordering for a single restaurant.

use std::cmp::Ordering;
use std::str::FromStr;

use canteen_core::MenuItem;

/// Minimum item rating for the "rated 4+" pick.
const TOP_RATED: f32 = 4.0;

/// Toggles shown above a restaurant's menu.
///
/// Toggles are grouped into dietary, top-pick and spice groups. Within a
/// group an item passes if it matches any enabled toggle; a group with no
/// toggles enabled lets everything through. An item must pass every group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuFilter {
    pub veg: bool,
    pub non_veg: bool,
    /// Non-vegetarian dishes that mention egg in their description.
    pub egg: bool,

    pub bestseller: bool,
    pub rated_4_plus: bool,
    /// Items whose category mentions dessert.
    pub dessert: bool,

    pub spicy: bool,
    pub non_spicy: bool,
}

impl MenuFilter {
    /// Whether `item` passes every enabled group.
    #[must_use]
    pub fn matches(&self, item: &MenuItem) -> bool {
        self.matches_dietary(item) && self.matches_top_picks(item) && self.matches_spice(item)
    }

    fn matches_dietary(&self, item: &MenuItem) -> bool {
        if !(self.veg || self.non_veg || self.egg) {
            return true;
        }
        (self.veg && item.veg)
            || (self.non_veg && !item.veg)
            || (self.egg && !item.veg && item.description.to_lowercase().contains("egg"))
    }

    fn matches_top_picks(&self, item: &MenuItem) -> bool {
        if !(self.bestseller || self.rated_4_plus || self.dessert) {
            return true;
        }
        (self.bestseller && item.bestseller)
            || (self.rated_4_plus && item.rating.is_some_and(|r| r >= TOP_RATED))
            || (self.dessert && item.category.to_lowercase().contains("dessert"))
    }

    fn matches_spice(&self, item: &MenuItem) -> bool {
        if !(self.spicy || self.non_spicy) {
            return true;
        }
        (self.spicy && item.spicy) || (self.non_spicy && !item.spicy)
    }
}

/// Menu ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuSort {
    /// Menu order as published.
    #[default]
    Relevance,
    PriceLowToHigh,
    PriceHighToLow,
    /// Highest rated first; unrated items count as zero.
    RatingHighToLow,
}

impl MenuSort {
    pub const ALL: [Self; 4] = [
        Self::Relevance,
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
        Self::RatingHighToLow,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceLowToHigh => "price-low-to-high",
            Self::PriceHighToLow => "price-high-to-low",
            Self::RatingHighToLow => "rating-high-to-low",
        }
    }

    /// Stable-sort `items` in place.
    pub fn apply(self, items: &mut [&MenuItem]) {
        if self != Self::Relevance {
            items.sort_by(|a, b| self.compare(a, b));
        }
    }

    /// Compare two items under this ordering.
    #[must_use]
    pub fn compare(self, a: &MenuItem, b: &MenuItem) -> Ordering {
        match self {
            Self::Relevance => Ordering::Equal,
            Self::PriceLowToHigh => a.price.cmp(&b.price),
            Self::PriceHighToLow => b.price.cmp(&a.price),
            Self::RatingHighToLow => rating_of(b).total_cmp(&rating_of(a)),
        }
    }
}

impl FromStr for MenuSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s.trim())
            .ok_or_else(|| format!("unknown sort order: {s}"))
    }
}

fn rating_of(item: &MenuItem) -> f32 {
    item.rating.unwrap_or(0.0)
}
