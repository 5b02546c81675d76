//! Editable price table backed by a remote items API.
//!
//! The data-sync core lives in [`sync`]: a [`sync::TableController`] loads
//! the item collection, applies price edits in memory, and saves the whole
//! collection back in one request before reloading from the server.
//! [`client`] speaks HTTP, [`view`] renders and sorts, [`session`] drives an
//! interactive terminal session, and [`api`] is a local stand-in server.

pub mod api;
pub mod client;
pub mod config;
pub mod models;
pub mod session;
pub mod sync;
pub mod view;
