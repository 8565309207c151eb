/// Shopping cart.
///
/// Items are product objects exactly as the catalog returned them, stored as
/// a JSON array under the `cart` key. The same product may appear more than
/// once; each occurrence is one unit.
///
/// On load, anything that is not an array is discarded (and removed from
/// storage) and non-object entries are dropped.

use crate::error::StorageError;
use crate::storage::{Storage, CART_KEY};
use crate::types::Product;
use serde_json::{Map, Value};

pub type CartItem = Map<String, Value>;

/// Cart backed by [`Storage`]
#[derive(Debug)]
pub struct Cart {
    storage: Storage,
    items: Vec<CartItem>,
}

impl Cart {
    /// Restores the cart saved in `storage`.
    pub fn load(storage: Storage) -> Self {
        let items = match storage.get_item(CART_KEY) {
            Ok(Some(raw)) => match parse_items(&raw) {
                Some(items) => items,
                None => {
                    tracing::warn!("Discarding unreadable saved cart");
                    if let Err(e) = storage.remove_item(CART_KEY) {
                        tracing::warn!(error = %e, "Could not remove saved cart");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read saved cart");
                Vec::new()
            }
        };

        Self { storage, items }
    }

    /// Items in the order they were added
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of units in the cart
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the cart holds nothing
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of item prices; items without a numeric price count as zero.
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .filter_map(|item| item.get("price").and_then(Value::as_f64))
            .sum()
    }

    /// Cart in the shape checkout expects.
    pub fn to_json(&self) -> Value {
        Value::Array(self.items.iter().cloned().map(Value::Object).collect())
    }

    /// Replaces every item.
    ///
    /// # Errors
    ///
    /// Fails when the cart cannot be saved.
    pub fn set(&mut self, items: Vec<CartItem>) -> Result<(), StorageError> {
        self.items = items;
        self.save()
    }

    /// Appends an item.
    ///
    /// # Errors
    ///
    /// Fails when the cart cannot be saved.
    pub fn add(&mut self, item: CartItem) -> Result<(), StorageError> {
        self.items.push(item);
        self.save()
    }

    /// Appends a catalog product.
    ///
    /// # Errors
    ///
    /// Fails when the product cannot be encoded or the cart cannot be saved.
    pub fn add_product(&mut self, product: &Product) -> Result<(), StorageError> {
        match serde_json::to_value(product) {
            Ok(Value::Object(item)) => self.add(item),
            Ok(_) => Err(StorageError::Encode {
                key: CART_KEY.to_string(),
                reason: "product is not a JSON object".to_string(),
            }),
            Err(e) => Err(StorageError::Encode {
                key: CART_KEY.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Removes the item at `index`; returns it, or `None` when out of range.
    ///
    /// # Errors
    ///
    /// Fails when the cart cannot be saved.
    pub fn remove(&mut self, index: usize) -> Result<Option<CartItem>, StorageError> {
        if index >= self.items.len() {
            return Ok(None);
        }

        let item = self.items.remove(index);
        self.save()?;
        Ok(Some(item))
    }

    /// Empties the cart and removes it from storage.
    ///
    /// # Errors
    ///
    /// Fails when storage cannot be written.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.storage.remove_item(CART_KEY)
    }

    fn save(&self) -> Result<(), StorageError> {
        self.storage.set_json(CART_KEY, &self.items)
    }
}

/// `None` when `raw` is not a JSON array.
fn parse_items(raw: &str) -> Option<Vec<CartItem>> {
    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Array(entries) => Some(
            entries
                .into_iter()
                .filter_map(|entry| match entry {
                    Value::Object(item) => Some(item),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}
