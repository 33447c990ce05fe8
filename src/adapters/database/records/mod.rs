pub mod admin;
pub mod message;

pub use admin::AdminUserRecord;
pub use message::{MessageRecord, micros_to_datetime, datetime_to_micros};
