//! In-memory cart.
//!
//! Each mutation is applied to a candidate copy of the line collection,
//! totals are recomputed from that copy, and only then is it committed.
//! Stored totals therefore always equal the sums over the stored lines.

use crate::core::{CartLineItem, CartSummary, CartTotals, CatalogService, Result};
use crate::utils::error::BookingError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

#[derive(Debug, Default)]
struct CartState {
    items: Vec<CartLineItem>,
    totals: CartTotals,
}

pub struct CartStore {
    state: Mutex<CartState>,
    changes: watch::Sender<CartTotals>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CartState::default()),
            changes: watch::Sender::new(CartTotals::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(
        &self,
        state: &mut CartState,
        items: Vec<CartLineItem>,
        service_id: &str,
    ) -> Result<CartTotals> {
        let totals = CartTotals::compute(&items).ok_or_else(|| BookingError::TotalsOverflow {
            service_id: service_id.to_string(),
        })?;
        state.items = items;
        state.totals = totals;
        self.changes.send_replace(totals);
        tracing::debug!(
            service_id,
            total_items = totals.total_items,
            total_price = totals.total_price,
            "cart updated"
        );
        Ok(totals)
    }

    /// Add `quantity` of a service, merging into an existing line.
    pub fn add_item(
        &self,
        service_id: &str,
        name: &str,
        unit_price: u64,
        quantity: u32,
    ) -> Result<CartTotals> {
        if quantity == 0 {
            return Err(BookingError::InvalidQuantity {
                service_id: service_id.to_string(),
                quantity,
            });
        }

        let mut state = self.lock();
        let mut items = state.items.clone();
        match items.iter().position(|line| line.service_id == service_id) {
            Some(index) => {
                let line = &mut items[index];
                line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                    BookingError::TotalsOverflow {
                        service_id: service_id.to_string(),
                    }
                })?;
            }
            None => items.push(CartLineItem {
                service_id: service_id.to_string(),
                name: name.to_string(),
                unit_price,
                quantity,
            }),
        }
        self.commit(&mut state, items, service_id)
    }

    pub fn add_service(&self, service: &CatalogService, quantity: u32) -> Result<CartTotals> {
        service.validate()?;
        self.add_item(&service.id, &service.name, service.price, quantity)
    }

    /// Returns whether a line was removed. Absent ids are not an error.
    pub fn remove_item(&self, service_id: &str) -> bool {
        let mut state = self.lock();
        let Some(index) = state
            .items
            .iter()
            .position(|line| line.service_id == service_id)
        else {
            return false;
        };

        let mut items = state.items.clone();
        items.remove(index);
        // Removing a line can only shrink the sums.
        if let Err(e) = self.commit(&mut state, items, service_id) {
            tracing::error!("cart totals inconsistent after removal: {}", e);
        }
        true
    }

    /// Overwrite a line's quantity; `0` removes the line. Unknown ids are
    /// rejected rather than creating a line.
    pub fn set_quantity(&self, service_id: &str, quantity: u32) -> Result<CartTotals> {
        let mut state = self.lock();
        let Some(index) = state
            .items
            .iter()
            .position(|line| line.service_id == service_id)
        else {
            return Err(BookingError::ItemNotInCart {
                service_id: service_id.to_string(),
            });
        };

        let mut items = state.items.clone();
        if quantity == 0 {
            items.remove(index);
        } else {
            items[index].quantity = quantity;
        }
        self.commit(&mut state, items, service_id)
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.items.clear();
        state.totals = CartTotals::default();
        self.changes.send_replace(state.totals);
        tracing::debug!("cart cleared");
    }

    pub fn items(&self) -> Vec<CartLineItem> {
        self.lock().items.clone()
    }

    pub fn quantity_of(&self, service_id: &str) -> Option<u32> {
        self.lock()
            .items
            .iter()
            .find(|line| line.service_id == service_id)
            .map(|line| line.quantity)
    }

    pub fn totals(&self) -> CartTotals {
        self.lock().totals
    }

    pub fn total_items(&self) -> u64 {
        self.totals().total_items
    }

    pub fn total_price(&self) -> u64 {
        self.totals().total_price
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn summary(&self) -> CartSummary {
        let state = self.lock();
        CartSummary {
            visible: !state.items.is_empty(),
            total_items: state.totals.total_items,
            total_price: state.totals.total_price,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CartTotals> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(cart: &CartStore) {
        let items = cart.items();
        let quantity: u64 = items.iter().map(|l| u64::from(l.quantity)).sum();
        let price: u64 = items.iter().map(|l| l.unit_price * u64::from(l.quantity)).sum();
        assert_eq!(cart.total_items(), quantity);
        assert_eq!(cart.total_price(), price);
    }

    #[test]
    fn test_add_same_service_merges_lines() {
        let cart = CartStore::new();

        let totals = cart.add_item("svc-1", "AC Repair", 499, 1).unwrap();
        assert_eq!((totals.total_items, totals.total_price), (1, 499));

        let totals = cart.add_item("svc-1", "AC Repair", 499, 2).unwrap();
        assert_eq!((totals.total_items, totals.total_price), (3, 1497));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("svc-1"), Some(3));

        assert!(cart.remove_item("svc-1"));
        assert_eq!(cart.totals(), CartTotals::default());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let cart = CartStore::new();
        cart.add_item("b", "Plumbing", 300, 1).unwrap();
        cart.add_item("a", "Cleaning", 200, 1).unwrap();
        cart.add_item("b", "Plumbing", 300, 1).unwrap();

        let ids: Vec<String> = cart.items().into_iter().map(|l| l.service_id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_consistent(&cart);
    }

    #[test]
    fn test_zero_quantity_add_is_rejected() {
        let cart = CartStore::new();
        let err = cart.add_item("svc-1", "AC Repair", 499, 0).unwrap_err();
        assert!(matches!(err, BookingError::InvalidQuantity { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let cart = CartStore::new();
        cart.add_item("svc-1", "AC Repair", 499, 1).unwrap();
        assert!(!cart.remove_item("svc-404"));
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_set_quantity() {
        let cart = CartStore::new();
        cart.add_item("svc-1", "AC Repair", 499, 1).unwrap();
        cart.add_item("svc-2", "Deep Cleaning", 1200, 1).unwrap();

        let totals = cart.set_quantity("svc-1", 4).unwrap();
        assert_eq!(totals.total_items, 5);
        assert_eq!(totals.total_price, 499 * 4 + 1200);

        cart.set_quantity("svc-2", 0).unwrap();
        assert_eq!(cart.quantity_of("svc-2"), None);
        assert_consistent(&cart);
    }

    #[test]
    fn test_set_quantity_on_unknown_item_is_rejected() {
        let cart = CartStore::new();
        let err = cart.set_quantity("svc-9", 2).unwrap_err();
        assert!(matches!(
            err,
            BookingError::ItemNotInCart { ref service_id } if service_id == "svc-9"
        ));
        assert!(cart.is_empty());

        assert!(cart.set_quantity("svc-9", 0).is_err());
    }

    #[test]
    fn test_overflow_leaves_cart_unchanged() {
        let cart = CartStore::new();
        cart.add_item("svc-1", "AC Repair", u64::MAX / 2, 1).unwrap();

        let err = cart.add_item("svc-1", "AC Repair", u64::MAX / 2, 2).unwrap_err();
        assert!(matches!(err, BookingError::TotalsOverflow { .. }));
        assert_eq!(cart.quantity_of("svc-1"), Some(1));
        assert_consistent(&cart);
    }

    #[test]
    fn test_clear_and_summary() {
        let cart = CartStore::new();
        assert!(!cart.summary().visible);

        cart.add_item("svc-1", "AC Repair", 499, 2).unwrap();
        let summary = cart.summary();
        assert!(summary.visible);
        assert_eq!(summary.total_price, 998);

        cart.clear();
        assert!(cart.items().is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), 0);
        assert!(!cart.summary().visible);
    }

    #[test]
    fn test_add_service_from_catalog() {
        let cart = CartStore::new();
        let service = CatalogService {
            id: "svc-7".to_string(),
            name: "Sofa Cleaning".to_string(),
            price: 650,
        };
        cart.add_service(&service, 2).unwrap();
        assert_eq!(cart.total_price(), 1300);

        let blank = CatalogService {
            id: String::new(),
            ..service
        };
        assert!(cart.add_service(&blank, 1).is_err());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_subscribers_see_new_totals() {
        let cart = CartStore::new();
        let mut rx = cart.subscribe();

        cart.add_item("svc-1", "AC Repair", 499, 1).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().total_price, 499);
    }
}
