//! Row codec
//!
//! Translates between model records and stored rows. See `encode` for the
//! cascading write and `decode` for the recursive read.

pub mod blob;
mod decode;
mod encode;

pub use decode::{decode_row, fetch_reference, query_rows, reference_exists, RawRow};
pub use encode::{encode_record, encode_value, Encoded};
