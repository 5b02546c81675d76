//! Domain models for pricetable.
//!
//! - [`Item`]: one priced record as served by the items API.
//! - [`ItemId`]: opaque identity of an item, the join key for price edits.
//! - [`Price`]: the numeric price, the only field the client mutates.

mod item;

pub use item::*;
