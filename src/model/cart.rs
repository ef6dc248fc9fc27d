//! Single-restaurant shopping cart embedded on the user document.
//!
//! Every mutation keeps two invariants: all lines share one restaurant, and
//! no line ever holds a quantity of zero.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item: ObjectId,
    pub quantity: u32,
    pub price: f64,
    pub restaurant: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Cart can only contain items from one restaurant")]
    MixedRestaurant,
    #[error("Item not in cart")]
    ItemNotInCart,
    #[error("Price must be greater than 0")]
    InvalidPrice,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Wrap stored lines, dropping any zero-quantity line left by older writes.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Cart {
            items: items.into_iter().filter(|i| i.quantity > 0).collect(),
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn restaurant(&self) -> Option<ObjectId> {
        self.items.first().map(|i| i.restaurant)
    }

    pub fn quantity_of(&self, menu_item: &ObjectId) -> Option<u32> {
        self.items.iter().find(|i| &i.menu_item == menu_item).map(|i| i.quantity)
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.price * f64::from(i.quantity)).sum()
    }

    /// Add `quantity` of a menu item. A zero quantity counts as one.
    /// Merging into an existing line keeps the price it was first added at.
    pub fn add(
        &mut self,
        menu_item: ObjectId,
        quantity: u32,
        price: f64,
        restaurant: ObjectId,
    ) -> Result<(), CartError> {
        if !(price.is_finite() && price > 0.0) {
            return Err(CartError::InvalidPrice);
        }
        if let Some(current) = self.restaurant() {
            if current != restaurant {
                return Err(CartError::MixedRestaurant);
            }
        }
        let quantity = quantity.max(1);
        match self.items.iter_mut().find(|i| i.menu_item == menu_item) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.items.push(CartItem {
                menu_item,
                quantity,
                price,
                restaurant,
            }),
        }
        Ok(())
    }

    /// Take one unit off a line; the last unit removes the line.
    pub fn decrement(&mut self, menu_item: &ObjectId) -> Result<(), CartError> {
        let idx = self
            .items
            .iter()
            .position(|i| &i.menu_item == menu_item)
            .ok_or(CartError::ItemNotInCart)?;
        if self.items[idx].quantity > 1 {
            self.items[idx].quantity -= 1;
        } else {
            self.items.remove(idx);
        }
        Ok(())
    }

    /// Drop a line entirely. Absent lines are ignored.
    pub fn remove(&mut self, menu_item: &ObjectId) {
        self.items.retain(|i| &i.menu_item != menu_item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
