//! Value model
//!
//! - `value`: the closed field value variant
//! - `record`: model instances, the `Model` / `FromFields` traits
//! - `fields`: decoded mappings and typed extraction
//! - `template`: field descriptors and column derivation
//! - `token`: reference tokens

pub mod fields;
pub mod record;
pub mod template;
pub mod token;
pub mod value;

pub use fields::{Fields, FromValue};
pub use record::{FromFields, Model, Persistable, Record};
pub use template::{derive_columns, ColumnSpec, ColumnType, FieldDescriptor, FieldKind, Template};
pub use token::RefToken;
pub use value::Value;
