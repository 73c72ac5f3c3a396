pub mod models;
pub mod store;

pub use models::{Message, MessageKind, Session, SessionId};
pub use store::{SessionStore, StoreHandle};
