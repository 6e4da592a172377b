pub mod store;

pub use store::{DecodeError, Store, StoreError, decode_line, encode_task};
