//! Cart quantity map and cart/catalog reconciliation.
//!
//! The cart never leaves the visitor's own storage: it is an ordered map from
//! [`ItemId`] to a strictly positive quantity. Catalog data is fetched
//! separately and joined onto the cart with [`reconcile`] when the cart page
//! is rendered.
//!
//! # Invariant
//!
//! Every stored quantity is `>= 1`. Operations that would bring an entry to
//! zero remove it instead.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{Item, ItemId};

/// Visitor-owned mapping of item IDs to quantities, in insertion order.
///
/// Serializes as a JSON object (`{"12": 2, "7": 1}`) with keys in insertion
/// order.
///
/// # Example
///
/// ```rust
/// use shopfront_core::{Cart, ItemId};
///
/// let mut cart = Cart::new();
/// let id = ItemId::from("a");
///
/// cart.increment(&id);
/// cart.increment(&id);
/// assert_eq!(cart.quantity(&id), 2);
///
/// cart.decrement(&id);
/// cart.decrement(&id);
/// assert_eq!(cart.quantity(&id), 0);
/// assert!(cart.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<(ItemId, NonZeroU32)>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == id)
    }

    /// Quantity for an item, or 0 if it is not in the cart.
    #[must_use]
    pub fn quantity(&self, id: &ItemId) -> u32 {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map_or(0, |(_, qty)| qty.get())
    }

    /// Add one of an item. An absent item starts at 1.
    ///
    /// Returns the new quantity.
    pub fn increment(&mut self, id: &ItemId) -> u32 {
        if let Some((_, qty)) = self.entries.iter_mut().find(|(key, _)| key == id) {
            *qty = qty.saturating_add(1);
            return qty.get();
        }

        self.entries.push((id.clone(), NonZeroU32::MIN));
        1
    }

    /// Remove one of an item.
    ///
    /// An entry at quantity 1 is removed; an absent item is left alone.
    /// Returns the new quantity (0 when the entry is gone).
    pub fn decrement(&mut self, id: &ItemId) -> u32 {
        let Some(pos) = self.position(id) else {
            return 0;
        };

        if let Some((_, qty)) = self.entries.get_mut(pos)
            && let Some(next) = NonZeroU32::new(qty.get() - 1)
        {
            *qty = next;
            return next.get();
        }

        self.entries.remove(pos);
        0
    }

    /// Set an item's quantity directly.
    ///
    /// Zero or negative quantities remove the entry; values larger than
    /// `u32::MAX` saturate. A new item is appended, an existing one keeps its
    /// position. Returns the stored quantity.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: i64) -> u32 {
        let clamped = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);

        match (self.position(id), NonZeroU32::new(clamped)) {
            (Some(pos), Some(qty)) => {
                if let Some(entry) = self.entries.get_mut(pos) {
                    entry.1 = qty;
                }
            }
            (Some(pos), None) => {
                self.entries.remove(pos);
            }
            (None, Some(qty)) => self.entries.push((id.clone(), qty)),
            (None, None) => {}
        }

        clamped
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|(_, qty)| u64::from(qty.get())).sum()
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Item IDs in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.entries.iter().map(|(id, _)| id)
    }

    /// `(id, quantity)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.entries.iter().map(|(id, qty)| (id, qty.get()))
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, qty) in &self.entries {
            map.serialize_entry(id, &qty.get())?;
        }
        map.end()
    }
}

struct CartVisitor;

impl<'de> Visitor<'de> for CartVisitor {
    type Value = Cart;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of item ids to quantities")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut cart = Cart::new();

        // Anything that is not a positive integer drops the entry.
        while let Some((id, value)) = access.next_entry::<ItemId, serde_json::Value>()? {
            let quantity = value
                .as_u64()
                .map_or(0, |q| i64::try_from(q).unwrap_or(i64::MAX));
            cart.set_quantity(&id, quantity);
        }

        Ok(cart)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CartVisitor)
    }
}

/// A cart entry joined with its catalog record for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Cart key.
    pub id: ItemId,
    /// Quantity in the cart (always `>= 1`).
    pub quantity: u32,
    /// Catalog record, or `None` when the item no longer exists remotely.
    pub item: Option<Item>,
}

impl LineItem {
    /// Name to show for this line, falling back to the raw ID.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.item
            .as_ref()
            .map(|item| item.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// Join a cart with fetched catalog records.
///
/// Produces one [`LineItem`] per cart entry, in cart order, whether or not a
/// matching record was fetched. If several records share an ID the last one
/// wins.
#[must_use]
pub fn reconcile<I>(cart: &Cart, items: I) -> Vec<LineItem>
where
    I: IntoIterator<Item = Item>,
{
    let mut by_id: HashMap<ItemId, Item> = items
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect();

    cart.iter()
        .map(|(id, quantity)| LineItem {
            id: id.clone(),
            quantity,
            item: by_id.remove(id),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str) -> Item {
        Item {
            id: ItemId::from(id),
            name: name.to_string(),
            description: String::new(),
            image: None,
            sizes: None,
        }
    }

    #[test]
    fn test_increment_absent_sets_one() {
        let mut cart = Cart::new();
        assert_eq!(cart.increment(&ItemId::from("x")), 1);
        assert_eq!(cart.quantity(&ItemId::from("x")), 1);
    }

    #[test]
    fn test_set_quantity_saturates_at_u32_max() {
        let mut cart = Cart::new();
        let id = ItemId::from("x");

        assert_eq!(cart.set_quantity(&id, i64::MAX), u32::MAX);
        assert_eq!(cart.quantity(&id), u32::MAX);

        assert_eq!(cart.set_quantity(&id, i64::from(u32::MAX) + 1), u32::MAX);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_increment_at_u32_max_stays_put() {
        let mut cart = Cart::new();
        let id = ItemId::from("x");
        cart.set_quantity(&id, i64::from(u32::MAX));
        cart.increment(&ItemId::from("y"));

        assert_eq!(cart.increment(&id), u32::MAX);
        assert_eq!(cart.quantity(&id), u32::MAX);
        assert_eq!(cart.total_quantity(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_decrement_at_one_removes_entry() {
        let mut cart = Cart::new();
        let id = ItemId::from("x");
        cart.increment(&id);

        assert_eq!(cart.decrement(&id), 0);
        assert!(cart.is_empty());
        assert_eq!(serde_json::to_string(&cart).unwrap(), "{}");
    }

    #[test]
    fn test_decrement_absent_is_noop() {
        let mut cart = Cart::new();
        cart.increment(&ItemId::from("a"));

        assert_eq!(cart.decrement(&ItemId::from("b")), 0);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_set_quantity_non_positive_removes() {
        let mut cart = Cart::new();
        let id = ItemId::from("x");
        cart.set_quantity(&id, 4);
        assert_eq!(cart.quantity(&id), 4);

        cart.set_quantity(&id, 0);
        assert!(cart.is_empty());

        cart.set_quantity(&id, -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_keeps_position() {
        let mut cart = Cart::new();
        cart.increment(&ItemId::from("a"));
        cart.increment(&ItemId::from("b"));
        cart.set_quantity(&ItemId::from("a"), 5);

        let ids: Vec<_> = cart.ids().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_total_quantity() {
        let mut cart = Cart::new();
        cart.set_quantity(&ItemId::from("a"), 2);
        cart.set_quantity(&ItemId::from("b"), 3);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_serde_preserves_order() {
        let cart: Cart = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
        assert_eq!(serde_json::to_string(&cart).unwrap(), r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_deserialize_drops_invalid_quantities() {
        let cart: Cart =
            serde_json::from_str(r#"{"a": 0, "b": -1, "c": "two", "d": 1.5, "e": 3}"#).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity(&ItemId::from("e")), 3);
    }

    #[test]
    fn test_deserialize_rejects_non_object() {
        assert!(serde_json::from_str::<Cart>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Cart>("\"cart\"").is_err());
    }

    #[test]
    fn test_reconcile_missing_item_has_no_detail() {
        let cart: Cart = serde_json::from_str(r#"{"a": 2, "b": 1}"#).unwrap();
        let lines = reconcile(&cart, vec![item("a", "X")]);

        assert_eq!(
            lines,
            vec![
                LineItem {
                    id: ItemId::from("a"),
                    quantity: 2,
                    item: Some(item("a", "X")),
                },
                LineItem {
                    id: ItemId::from("b"),
                    quantity: 1,
                    item: None,
                },
            ]
        );
        assert_eq!(lines[1].display_name(), "b");
    }

    #[test]
    fn test_reconcile_length_matches_cart() {
        let mut cart = Cart::new();
        for id in ["1", "2", "3"] {
            cart.increment(&ItemId::from(id));
        }

        assert_eq!(reconcile(&cart, Vec::new()).len(), 3);
        assert_eq!(
            reconcile(&cart, vec![item("1", "one"), item("9", "nine")]).len(),
            3
        );
    }

    #[test]
    fn test_reconcile_last_duplicate_wins() {
        let mut cart = Cart::new();
        cart.increment(&ItemId::from("1"));

        let lines = reconcile(&cart, vec![item("1", "old"), item("1", "new")]);
        assert_eq!(lines[0].display_name(), "new");
    }
}
