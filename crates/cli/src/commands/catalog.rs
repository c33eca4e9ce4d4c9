//! Restaurant search and menu commands.

use std::io::Write;

use clap::Args;

use canteen_core::{MenuItem, Price, PriceTier, Restaurant, RestaurantId};
use canteen_storefront::Session;
use canteen_storefront::search::{MenuFilter, MenuSort, RestaurantQuery};

/// Restaurant search filters.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Match restaurant name or cuisine
    #[arg(short, long)]
    pub query: Option<String>,

    /// Exact cuisine
    #[arg(long)]
    pub cuisine: Option<String>,

    /// Serve any of these cuisines (repeatable)
    #[arg(long = "with-cuisine")]
    pub with_cuisines: Vec<String>,

    /// Pure vegetarian restaurants only
    #[arg(long)]
    pub veg_only: bool,

    /// Minimum rating
    #[arg(long)]
    pub min_rating: Option<f32>,

    /// Price tier, `₹` to `₹₹₹₹` (repeatable)
    #[arg(long = "price")]
    pub price_tiers: Vec<PriceTier>,
}

impl From<&SearchArgs> for RestaurantQuery {
    fn from(args: &SearchArgs) -> Self {
        Self {
            text: args.query.clone(),
            cuisine: args.cuisine.clone(),
            cuisines: args.with_cuisines.clone(),
            veg_only: args.veg_only,
            min_rating: args.min_rating,
            price_tiers: args.price_tiers.clone(),
        }
    }
}

/// Menu filters and ordering.
#[derive(Debug, Args)]
pub struct MenuArgs {
    /// Restaurant id
    pub restaurant: String,

    #[arg(long)]
    pub veg: bool,
    #[arg(long)]
    pub non_veg: bool,
    #[arg(long)]
    pub egg: bool,

    #[arg(long)]
    pub bestseller: bool,
    #[arg(long = "rated-4-plus")]
    pub rated_4_plus: bool,
    #[arg(long)]
    pub dessert: bool,

    #[arg(long)]
    pub spicy: bool,
    #[arg(long)]
    pub non_spicy: bool,

    /// relevance, price-low-to-high, price-high-to-low or rating-high-to-low
    #[arg(long, default_value = "relevance")]
    pub sort: MenuSort,
}

impl From<&MenuArgs> for MenuFilter {
    fn from(args: &MenuArgs) -> Self {
        Self {
            veg: args.veg,
            non_veg: args.non_veg,
            egg: args.egg,
            bestseller: args.bestseller,
            rated_4_plus: args.rated_4_plus,
            dessert: args.dessert,
            spicy: args.spicy,
            non_spicy: args.non_spicy,
        }
    }
}

pub fn search(
    session: &Session,
    args: &SearchArgs,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = session.catalog().search(&RestaurantQuery::from(args));
    if results.is_empty() {
        writeln!(out, "No restaurants found")?;
        return Ok(());
    }

    writeln!(out, "{} restaurants found", results.len())?;
    for restaurant in results {
        writeln!(out, "{}", restaurant_line(restaurant))?;
    }
    Ok(())
}

pub fn menu(
    session: &Session,
    args: &MenuArgs,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = RestaurantId::new(args.restaurant.as_str());
    let items = session
        .catalog()
        .menu(&id, &MenuFilter::from(args), args.sort)?;

    if let Some(restaurant) = session.catalog().restaurant(&id) {
        writeln!(out, "{}", restaurant_line(restaurant))?;
    }
    if items.is_empty() {
        writeln!(out, "No dishes match these filters")?;
    }
    for item in items {
        writeln!(out, "{}", menu_line(item, session.cart.quantity_of(&item.id)))?;
    }
    Ok(())
}

fn restaurant_line(r: &Restaurant) -> String {
    let mut line = format!(
        "[{}] {} | {:.1}★ ({}+ ratings) | {} | {} | {}",
        r.id,
        r.name,
        r.rating,
        r.review_count,
        r.price_range,
        r.cuisines.join(", "),
        r.delivery_time
    );
    if r.veg {
        line.push_str(" | pure veg");
    }
    if let Some(discount) = &r.discount {
        line.push_str(" | ");
        line.push_str(discount);
    }
    line
}

fn menu_line(item: &MenuItem, in_cart: u32) -> String {
    let mut line = format!(
        "  [{}] {} {} | {}",
        item.id,
        if item.veg { "(veg)" } else { "(non-veg)" },
        item.name,
        Price::from_amount(item.price)
    );
    if item.bestseller {
        line.push_str(" | bestseller");
    }
    if let Some(rating) = item.rating {
        line.push_str(&format!(" | {rating:.1}★"));
    }
    if in_cart > 0 {
        line.push_str(&format!(" | in cart: {in_cart}"));
    }
    line
}
