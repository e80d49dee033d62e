//! Structured tracing event ids for the session store.

mod events;

pub use events::SessionStoreEvent;
