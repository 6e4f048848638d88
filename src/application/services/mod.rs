//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (MenuStore) but are themselves
//! concrete structs, not traits.

mod menu;

pub use menu::{MenuEvent, MenuService, MenuSnapshot};
