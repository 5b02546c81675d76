use crate::models::{Item, ItemId, Price};

/// Return `items` with the price of the item matching `id` replaced by `price`.
///
/// An unknown `id` returns an unchanged copy. No other field of any item is
/// touched, and the order is kept.
pub fn set_price(items: &[Item], id: &ItemId, price: &Price) -> Vec<Item> {
    items
        .iter()
        .map(|item| {
            if item.id == *id {
                Item {
                    price: price.clone(),
                    ..item.clone()
                }
            } else {
                item.clone()
            }
        })
        .collect()
}
