pub mod publication;
pub mod raw_record;

pub use publication::{KNOWN_FIELDS, LINK_KEYS, Links, Publication};
pub use raw_record::RawRecord;
