pub mod error;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{
    ConversationRecord, MatchRecord, Preferences, Store, default_base_dir, pair_key,
};
