//! Saved delivery addresses.
//!
//! [`AddressBook`] owns the ordered address collection and the address
//! currently chosen for delivery. Every mutation keeps two rules:
//!
//! - a non-empty collection has exactly one default address;
//! - the selection is `None` only when the collection is empty, and always
//!   names a record that exists.
//!
//! The selection is held by id, so edits to the selected record are visible
//! through [`AddressBook::selected_address`] without extra bookkeeping.

use std::collections::HashSet;

use canteen_core::{Address, AddressId, AddressUpdate, NewAddress};
use tracing::instrument;

use super::persistence::Persistence;
use crate::error::{Result, StateError};
use crate::models::WriteMode;
use crate::models::session::keys;
use crate::storage::{self, SharedStore};

/// Addresses used when nothing has been saved yet.
#[must_use]
pub fn seed_addresses() -> Vec<Address> {
    vec![
        Address {
            id: AddressId::new("1"),
            title: "Home".to_owned(),
            full_address: "123 Main Street, Apartment 4B, New York, NY 10001".to_owned(),
            is_default: true,
        },
        Address {
            id: AddressId::new("2"),
            title: "Work".to_owned(),
            full_address: "50 Broadway, Floor 10, New York, NY 10004".to_owned(),
            is_default: false,
        },
    ]
}

/// The address collection for one session.
#[derive(Debug)]
pub struct AddressBook {
    addresses: Vec<Address>,
    selected: Option<AddressId>,
    persistence: Persistence,
}

impl AddressBook {
    /// Load the collection from `store`, falling back to [`seed_addresses`].
    ///
    /// Saved data is repaired on load: duplicate ids are dropped (first
    /// wins) and the default flag is fixed up to exactly one record. The
    /// selection starts at the default address.
    #[instrument(skip(store))]
    pub fn new(store: SharedStore, mode: WriteMode) -> Self {
        let (addresses, dirty) =
            match storage::load::<Vec<Address>>(&*store, keys::SAVED_ADDRESSES) {
                Some(saved) => normalize(saved),
                None => {
                    tracing::debug!("No saved addresses; using seed collection");
                    (seed_addresses(), true)
                }
            };

        let mut persistence = Persistence::durable(store, keys::SAVED_ADDRESSES, mode);
        if dirty {
            persistence.write_best_effort(&addresses);
        }

        let selected = initial_selection(&addresses);
        tracing::debug!(count = addresses.len(), "Address book loaded");

        Self {
            addresses,
            selected,
            persistence,
        }
    }

    /// All addresses in display order.
    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    #[must_use]
    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| &a.id == id)
    }

    /// The address chosen for delivery.
    #[must_use]
    pub fn selected_address(&self) -> Option<&Address> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// See [`crate::services::CartState::last_write_error`].
    #[must_use]
    pub fn last_write_error(&self) -> Option<&str> {
        self.persistence.last_error()
    }

    /// Add a new address with a fresh id.
    ///
    /// The first address of an empty collection always becomes the default,
    /// whatever `draft.is_default` says. A new default is also selected.
    ///
    /// # Errors
    ///
    /// Only fails with `StateError::Storage` under strict writes.
    #[instrument(skip_all, fields(title = %draft.title))]
    pub fn add_address(&mut self, mut draft: NewAddress) -> Result<Address> {
        draft.is_default |= self.addresses.is_empty();
        let address = Address::create(draft);

        let mut next = self.addresses.clone();
        if address.is_default {
            clear_defaults(&mut next);
        }
        next.push(address.clone());

        self.persistence.commit(&mut self.addresses, next)?;
        if address.is_default {
            self.selected = Some(address.id.clone());
        }

        tracing::info!(address_id = %address.id, is_default = address.is_default, "Address added");
        Ok(address)
    }

    /// Replace the fields of the address `id`, keeping its id and position.
    ///
    /// Marking it default clears every other default and selects it.
    /// Un-marking the current default hands the flag to the first other
    /// record; a lone address stays default.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotFound` for an unknown id, or
    /// `StateError::Storage` under strict writes.
    #[instrument(skip(self, fields))]
    pub fn update_address(&mut self, id: &AddressId, fields: AddressUpdate) -> Result<Address> {
        let index = self.position(id)?;
        let mut next = self.addresses.clone();

        let was_default = next.get(index).is_some_and(|a| a.is_default);
        let becomes_default = fields.is_default;
        if becomes_default {
            clear_defaults(&mut next);
        }

        let updated = {
            let record = next
                .get_mut(index)
                .ok_or_else(|| StateError::not_found("address", id))?;
            record.apply(fields);
            record.clone()
        };

        if was_default && !becomes_default {
            match next.iter_mut().find(|a| &a.id != id) {
                Some(heir) => heir.is_default = true,
                None => {
                    if let Some(record) = next.get_mut(index) {
                        record.is_default = true;
                    }
                }
            }
        }

        self.persistence.commit(&mut self.addresses, next)?;
        if becomes_default {
            self.selected = Some(id.clone());
        }

        tracing::info!(address_id = %id, "Address updated");
        Ok(self.get(id).cloned().unwrap_or(updated))
    }

    /// Delete the address `id`, returning it.
    ///
    /// Removing the default promotes the first remaining address. Removing
    /// the selection moves it to the default address, or to nothing if the
    /// collection is now empty.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotFound` for an unknown id, or
    /// `StateError::Storage` under strict writes.
    #[instrument(skip(self))]
    pub fn remove_address(&mut self, id: &AddressId) -> Result<Address> {
        let index = self.position(id)?;
        let mut next = self.addresses.clone();
        let removed = next.remove(index);

        if removed.is_default {
            if let Some(first) = next.first_mut() {
                first.is_default = true;
            }
        }

        self.persistence.commit(&mut self.addresses, next)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = initial_selection(&self.addresses);
        }

        tracing::info!(address_id = %id, "Address removed");
        Ok(removed)
    }

    /// Make `id` the only default address and select it.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotFound` for an unknown id, or
    /// `StateError::Storage` under strict writes.
    #[instrument(skip(self))]
    pub fn set_default_address(&mut self, id: &AddressId) -> Result<Address> {
        let index = self.position(id)?;
        let mut next = self.addresses.clone();
        for (i, address) in next.iter_mut().enumerate() {
            address.is_default = i == index;
        }

        self.persistence.commit(&mut self.addresses, next)?;
        self.selected = Some(id.clone());

        tracing::info!(address_id = %id, "Default address changed");
        self.get(id)
            .cloned()
            .ok_or_else(|| StateError::not_found("address", id))
    }

    /// Choose `id` for delivery without touching default flags.
    ///
    /// Selection is not persisted.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotFound` for an unknown id; the selection is
    /// left as it was.
    #[instrument(skip(self))]
    pub fn select_address(&mut self, id: &AddressId) -> Result<Address> {
        let address = self
            .get(id)
            .cloned()
            .ok_or_else(|| StateError::not_found("address", id))?;
        self.selected = Some(address.id.clone());
        tracing::debug!(address_id = %id, "Address selected");
        Ok(address)
    }

    fn position(&self, id: &AddressId) -> Result<usize> {
        self.addresses
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| StateError::not_found("address", id))
    }
}

fn clear_defaults(addresses: &mut [Address]) {
    for address in addresses {
        address.is_default = false;
    }
}

/// Default address, else the first one, else nothing.
fn initial_selection(addresses: &[Address]) -> Option<AddressId> {
    addresses
        .iter()
        .find(|a| a.is_default)
        .or_else(|| addresses.first())
        .map(|a| a.id.clone())
}

/// Repair a loaded collection. Returns whether anything changed.
fn normalize(saved: Vec<Address>) -> (Vec<Address>, bool) {
    let original = saved.clone();

    let mut seen = HashSet::new();
    let mut addresses: Vec<Address> = saved
        .into_iter()
        .filter(|a| seen.insert(a.id.clone()))
        .collect();

    let keep = addresses
        .iter()
        .position(|a| a.is_default)
        .or_else(|| (!addresses.is_empty()).then_some(0));
    for (i, address) in addresses.iter_mut().enumerate() {
        address.is_default = Some(i) == keep;
    }

    let repaired = addresses != original;
    if repaired {
        tracing::warn!("Repaired saved address collection");
    }
    (addresses, repaired)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn empty_book() -> AddressBook {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set(keys::SAVED_ADDRESSES, "[]").unwrap();
        AddressBook::new(store, WriteMode::BestEffort)
    }

    fn defaults(book: &AddressBook) -> usize {
        book.addresses().iter().filter(|a| a.is_default).count()
    }

    #[test]
    fn test_seed_when_store_empty() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let book = AddressBook::new(store.clone(), WriteMode::BestEffort);

        assert_eq!(book.addresses(), seed_addresses());
        assert_eq!(book.selected_address().unwrap().title, "Home");

        let saved: Vec<Address> = storage::load(&*store, keys::SAVED_ADDRESSES).unwrap();
        assert_eq!(saved, seed_addresses());
    }

    #[test]
    fn test_malformed_store_falls_back_to_seed() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set(keys::SAVED_ADDRESSES, "{not json").unwrap();

        let book = AddressBook::new(store, WriteMode::BestEffort);
        assert_eq!(book.addresses(), seed_addresses());
    }

    #[test]
    fn test_first_address_is_promoted_to_default() {
        let mut book = empty_book();
        let added = book
            .add_address(NewAddress::new("Home", "1 A St", false))
            .unwrap();

        assert_eq!(book.len(), 1);
        assert!(added.is_default);
        assert_eq!(book.selected_address(), Some(&added));
    }

    #[test]
    fn test_add_non_default_keeps_selection() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", false)).unwrap();
        let work = book.add_address(NewAddress::new("Work", "2 B St", false)).unwrap();

        assert!(!work.is_default);
        assert_eq!(book.selected_address().unwrap().id, home.id);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_add_default_takes_over() {
        let mut book = empty_book();
        book.add_address(NewAddress::new("Home", "1 A St", false)).unwrap();
        let work = book.add_address(NewAddress::new("Work", "2 B St", true)).unwrap();

        assert_eq!(book.default_address().unwrap().id, work.id);
        assert_eq!(book.selected_address().unwrap().id, work.id);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_remove_default_and_selected() {
        let mut book = empty_book();
        let first = book.add_address(NewAddress::new("Home", "1 A St", true)).unwrap();
        let second = book.add_address(NewAddress::new("Work", "2 B St", false)).unwrap();
        assert_eq!(book.selected_address().unwrap().id, first.id);

        book.remove_address(&first.id).unwrap();

        let remaining = book.get(&second.id).unwrap();
        assert!(remaining.is_default);
        assert_eq!(book.selected_address(), Some(remaining));
    }

    #[test]
    fn test_remove_selected_prefers_default_over_first() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", false)).unwrap();
        let work = book.add_address(NewAddress::new("Work", "2 B St", false)).unwrap();
        let gym = book.add_address(NewAddress::new("Gym", "3 C St", true)).unwrap();
        book.select_address(&work.id).unwrap();

        book.remove_address(&work.id).unwrap();

        assert_eq!(book.selected_address().unwrap().id, gym.id);
        assert!(!book.get(&home.id).unwrap().is_default);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_remove_last_clears_selection() {
        let mut book = empty_book();
        let only = book.add_address(NewAddress::new("Home", "1 A St", false)).unwrap();
        book.remove_address(&only.id).unwrap();

        assert!(book.is_empty());
        assert!(book.selected_address().is_none());
        assert!(book.default_address().is_none());
    }

    #[test]
    fn test_remove_unselected_keeps_selection() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", true)).unwrap();
        let work = book.add_address(NewAddress::new("Work", "2 B St", false)).unwrap();

        book.remove_address(&work.id).unwrap();
        assert_eq!(book.selected_address().unwrap().id, home.id);
    }

    #[test]
    fn test_set_default_selects_and_is_exclusive() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", true)).unwrap();
        let work = book.add_address(NewAddress::new("Work", "2 B St", false)).unwrap();
        assert_eq!(book.selected_address().unwrap().id, home.id);

        let updated = book.set_default_address(&work.id).unwrap();
        assert!(updated.is_default);
        assert_eq!(book.selected_address().unwrap().id, work.id);
        assert!(!book.get(&home.id).unwrap().is_default);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_select_does_not_touch_defaults() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", true)).unwrap();
        let work = book.add_address(NewAddress::new("Work", "2 B St", false)).unwrap();

        book.select_address(&work.id).unwrap();
        assert_eq!(book.selected_address().unwrap().id, work.id);
        assert_eq!(book.default_address().unwrap().id, home.id);
    }

    #[test]
    fn test_unknown_ids_leave_state_unchanged() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", true)).unwrap();
        let before = book.addresses().to_vec();
        let missing = AddressId::new("missing");

        assert!(matches!(book.select_address(&missing), Err(StateError::NotFound(_))));
        assert!(matches!(book.set_default_address(&missing), Err(StateError::NotFound(_))));
        assert!(matches!(book.remove_address(&missing), Err(StateError::NotFound(_))));
        assert!(matches!(
            book.update_address(&missing, NewAddress::new("X", "Y", true)),
            Err(StateError::NotFound(_))
        ));

        assert_eq!(book.addresses(), before);
        assert_eq!(book.selected_address().unwrap().id, home.id);
    }

    #[test]
    fn test_update_refreshes_selected_record() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", true)).unwrap();

        book.update_address(&home.id, NewAddress::new("House", "9 Z St", true))
            .unwrap();

        let selected = book.selected_address().unwrap();
        assert_eq!(selected.id, home.id);
        assert_eq!(selected.title, "House");
        assert_eq!(selected.full_address, "9 Z St");
    }

    #[test]
    fn test_update_to_default_selects_it() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", true)).unwrap();
        let work = book.add_address(NewAddress::new("Work", "2 B St", false)).unwrap();

        book.update_address(&work.id, NewAddress::new("Office", "2 B St", true))
            .unwrap();
        assert_eq!(book.selected_address().unwrap().id, work.id);
        assert!(!book.get(&home.id).unwrap().is_default);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_update_demoting_default_promotes_another() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", true)).unwrap();
        let work = book.add_address(NewAddress::new("Work", "2 B St", false)).unwrap();

        book.update_address(&home.id, NewAddress::new("Home", "1 A St", false))
            .unwrap();
        assert!(book.get(&work.id).unwrap().is_default);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_update_cannot_demote_only_address() {
        let mut book = empty_book();
        let home = book.add_address(NewAddress::new("Home", "1 A St", true)).unwrap();

        let updated = book
            .update_address(&home.id, NewAddress::new("Home", "1 A St", false))
            .unwrap();
        assert!(updated.is_default);
    }

    #[test]
    fn test_load_repairs_defaults_and_duplicates() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store
            .set(
                keys::SAVED_ADDRESSES,
                r#"[
                    {"id":"a","title":"A","fullAddress":"1","isDefault":false},
                    {"id":"b","title":"B","fullAddress":"2","isDefault":true},
                    {"id":"a","title":"A2","fullAddress":"3","isDefault":true},
                    {"id":"c","title":"C","fullAddress":"4","isDefault":true}
                ]"#,
            )
            .unwrap();

        let book = AddressBook::new(store.clone(), WriteMode::BestEffort);
        let ids: Vec<&str> = book.addresses().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(book.default_address().unwrap().id.as_str(), "b");
        assert_eq!(book.selected_address().unwrap().id.as_str(), "b");

        let saved: Vec<Address> = storage::load(&*store, keys::SAVED_ADDRESSES).unwrap();
        assert_eq!(saved, book.addresses());
    }

    #[test]
    fn test_load_without_default_promotes_first() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store
            .set(
                keys::SAVED_ADDRESSES,
                r#"[{"id":"a","title":"A","fullAddress":"1","isDefault":false}]"#,
            )
            .unwrap();

        let book = AddressBook::new(store, WriteMode::BestEffort);
        assert!(book.get(&AddressId::new("a")).unwrap().is_default);
    }

    #[test]
    fn test_mutations_are_written_back() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut book = AddressBook::new(store.clone(), WriteMode::Strict);
        let added = book.add_address(NewAddress::new("Gym", "7 C St", false)).unwrap();

        let reloaded = AddressBook::new(store, WriteMode::Strict);
        assert_eq!(reloaded.addresses(), book.addresses());
        assert!(reloaded.get(&added.id).is_some());
    }

    #[test]
    fn test_strict_failure_leaves_book_unchanged() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let book = AddressBook::new(store.clone(), WriteMode::Strict);
        let stored = store.get(keys::SAVED_ADDRESSES).unwrap().unwrap();
        drop(book);

        // Room for the current collection and nothing more.
        let tight: SharedStore = Arc::new(MemoryStore::with_quota(stored.len()));
        tight.set(keys::SAVED_ADDRESSES, &stored).unwrap();
        let mut book = AddressBook::new(tight, WriteMode::Strict);
        let before = book.addresses().to_vec();

        let err = book
            .add_address(NewAddress::new("Gym", "7 C St", true))
            .unwrap_err();
        assert!(matches!(err, StateError::Storage(_)));
        assert_eq!(book.addresses(), before);
        assert_eq!(book.selected_address().unwrap().title, "Home");
    }

    #[test]
    fn test_best_effort_failure_keeps_change() {
        let store: SharedStore = Arc::new(MemoryStore::with_quota(0));
        let mut book = AddressBook::new(store, WriteMode::BestEffort);
        // The seed write already failed.
        assert!(book.last_write_error().is_some());

        let gym = book.add_address(NewAddress::new("Gym", "7 C St", true)).unwrap();
        assert_eq!(book.selected_address().unwrap().id, gym.id);
        assert!(book.last_write_error().is_some());
    }
}
