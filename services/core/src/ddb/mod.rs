pub mod adapter;
pub mod delete_item;
pub mod get_item;
pub mod item;
pub mod put_item;
pub mod query;
pub mod scan;
pub mod transact_write_items;
pub mod update_item;

pub use adapter::Adapter;
pub use item::{Item, ItemError};
