mod document;
mod keys;
mod link;
mod normalize;
mod page_id;
mod text;

pub use document::Document;
pub use keys::{decode_key, lookup_key};
pub use normalize::{NormalizedRecord, normalize_document};
pub use text::TextCleaner;
