pub mod client;
pub mod types;

pub use client::{ApiClient, ApiError, ApiResult, Backend};
pub use types::{Attachment, CreatedEntry, Entity, LineItem, NewEntry, ScaleReading};
