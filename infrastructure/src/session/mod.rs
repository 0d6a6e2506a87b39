//! Session id persistence.

mod store;

pub use store::FileSessionStore;
