//! Cart behaviour, standalone and persisted.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use canteen_core::{CartLine, MenuItemId};
use canteen_integration_tests::{TestContext, dish};
use canteen_storefront::models::session::keys;
use canteen_storefront::services::{CartState, QuantityChange};
use canteen_storefront::storage::{self, KeyValueStore, MemoryStore, SharedStore};
use canteen_storefront::{StateError, WriteMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

#[test]
fn test_repeated_adds_collapse_into_one_line() {
    let mut cart = CartState::new();
    let biryani = dish("x", 329);
    for _ in 0..7 {
        cart.add_to_cart(&biryani).unwrap();
    }

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.quantity_of(&biryani.id), 7);
    assert_eq!(cart.total_items(), 7);
}

#[test]
fn test_update_quantity_reprices() {
    let mut cart = CartState::new();
    let x = dish("x", 10);
    cart.add_to_cart(&x).unwrap();
    cart.add_to_cart(&x).unwrap();

    cart.update_quantity(&x.id, 5).unwrap();
    assert_eq!(cart.total_price(), Decimal::new(50, 0));
}

#[test]
fn test_zero_quantity_removes_exactly_that_line() {
    let mut cart = CartState::new();
    let x = dish("x", 10);
    let y = dish("y", 15);
    for _ in 0..3 {
        cart.add_to_cart(&x).unwrap();
    }
    cart.add_to_cart(&y).unwrap();
    let before = cart.total_items();

    let change = cart.update_quantity(&x.id, 0).unwrap();
    assert_eq!(change, QuantityChange::Removed { previous: 3 });
    assert_eq!(cart.total_items(), before - 3);
    assert_eq!(cart.total_price(), Decimal::new(15, 0));
}

#[test]
fn test_unknown_line_is_not_found() {
    let mut cart = CartState::new();
    let err = cart.update_quantity(&MenuItemId::new("ghost"), 2).unwrap_err();
    assert!(matches!(err, StateError::NotFound(_)));
    assert!(cart.is_empty());
}

#[test]
fn test_totals_match_lines_for_random_sequences() {
    let dishes: Vec<_> = (0..6).map(|i| dish(&format!("d{i}"), 10 * (i + 1))).collect();

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut cart = CartState::new();

        for _ in 0..100 {
            let item = dishes.get(rng.random_range(0..dishes.len())).unwrap();
            match rng.random_range(0..4) {
                0 | 1 => {
                    cart.add_to_cart(item).unwrap();
                }
                2 => {
                    let _ = cart.update_quantity(&item.id, rng.random_range(-2..6));
                }
                _ => {
                    let _ = cart.remove_from_cart(&item.id);
                }
            }

            let lines = cart.lines();
            assert!(lines.iter().all(|l| l.quantity >= 1), "seed {seed}");
            let mut ids: Vec<_> = lines.iter().map(|l| &l.id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), lines.len(), "seed {seed}");

            let items: u64 = lines.iter().map(|l| u64::from(l.quantity)).sum();
            let price: Decimal = lines.iter().map(CartLine::line_total).sum();
            assert_eq!(cart.total_items(), items);
            assert_eq!(cart.total_price(), price);
        }
    }
}

#[test]
fn test_persisted_cart_uses_file_store() {
    let ctx = TestContext::new();
    {
        let mut cart = CartState::persistent(ctx.store(), WriteMode::Strict);
        cart.add_to_cart(&dish("x", 10)).unwrap();
        cart.add_to_cart(&dish("x", 10)).unwrap();
        cart.add_to_cart(&dish("y", 5)).unwrap();
    }

    let saved: Vec<CartLine> = storage::load(&*ctx.store(), keys::CART_ITEMS).unwrap();
    assert_eq!(saved.len(), 2);

    let cart = CartState::persistent(ctx.store(), WriteMode::Strict);
    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.total_price(), Decimal::new(25, 0));
}

#[test]
fn test_cart_file_layout() {
    let ctx = TestContext::new();
    let mut cart = CartState::persistent(ctx.store(), WriteMode::Strict);
    cart.add_to_cart(&dish("101", 249)).unwrap();
    cart.add_to_cart(&dish("101", 249)).unwrap();

    let raw = std::fs::read_to_string(ctx.path().join("cartItems.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "id": "101",
                "name": "Dish 101",
                "price": 249.0,
                "quantity": 2
            }
        ])
    );
}

#[test]
fn test_browser_cart_loads_as_is() {
    let ctx = TestContext::new();
    std::fs::write(
        ctx.path().join("cartItems.json"),
        r#"[{"id":"201","name":"Masala Dosa","price":120,"quantity":3,"image":"dosa.jpg"}]"#,
    )
    .unwrap();

    let cart = CartState::persistent(ctx.store(), WriteMode::Strict);
    assert_eq!(cart.total_price(), Decimal::new(360, 0));
    assert_eq!(
        cart.line(&MenuItemId::new("201")).unwrap().image.as_deref(),
        Some("dosa.jpg")
    );
}

#[test]
fn test_write_modes_differ_on_failure() {
    // Room for an empty cart but not for any line.
    let full = || -> SharedStore { Arc::new(MemoryStore::with_quota(4)) };

    let mut strict = CartState::persistent(full(), WriteMode::Strict);
    assert!(matches!(
        strict.add_to_cart(&dish("x", 10)),
        Err(StateError::Storage(_))
    ));
    assert!(strict.is_empty());

    let store = full();
    let mut relaxed = CartState::persistent(Arc::clone(&store), WriteMode::BestEffort);
    assert_eq!(relaxed.add_to_cart(&dish("x", 10)).unwrap(), 1);
    assert_eq!(relaxed.total_items(), 1);
    assert!(relaxed.last_write_error().is_some());
    assert_eq!(store.get(keys::CART_ITEMS).unwrap(), None);

    // Clearing fits again and clears the remembered failure.
    relaxed.clear().unwrap();
    assert!(relaxed.last_write_error().is_none());
    assert_eq!(store.get(keys::CART_ITEMS).unwrap().as_deref(), Some("[]"));
}
