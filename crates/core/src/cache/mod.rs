mod entity;
mod error;
mod keys;
mod serialization;
mod traits;

pub use entity::{decode_lookup, CacheLookup, CacheableEntity};
pub use error::{CacheError, Result};
pub use keys::{entity_key, id_key, user_email_key, user_id_key};
pub use serialization::{deserialize, serialize, SerializationError};
pub use traits::Cache;
