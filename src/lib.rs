//! # sqlcell
//!
//! Column type grammar and cell value codec for SQL clients that receive
//! result sets as text over HTTP.
//!
//! Three pieces:
//! - [`parse_type`] turns a column type string into a [`Type`] tree.
//! - [`decode`] turns one cell's text into a [`Value`] under that type.
//! - [`encode`] turns a native value into SQL literal text for parameter
//!   substitution.
//!
//! ## Quick Example
//!
//! ```
//! use sqlcell::prelude::*;
//!
//! let ty = parse_type("Array(Nullable(String))");
//! let value = decode("['a',NULL,'it\\'s']", &ty).unwrap();
//! assert_eq!(value.to_string(), "['a', NULL, 'it\\'s']");
//!
//! let literal = encode(&vec![Some("o'k"), None]).unwrap();
//! assert_eq!(literal, "['o\\'k',\\N]");
//! ```
//!
//! ## Literal Forms
//!
//! | Value      | Literal            |
//! |------------|--------------------|
//! | null       | `\N`               |
//! | boolean    | `1` / `0`          |
//! | string     | `'it\'s'`          |
//! | timestamp  | `'2024-01-02 03:04:05.123000'` |
//! | array      | `[1,2,3]`          |
//! | tuple      | `(1,'a')`          |

pub mod config;
pub mod decode;
pub mod encoder;
pub mod error;
pub mod row;
pub mod types;
pub mod value;

pub use config::CodecConfig;
pub use decode::{DecodeOptions, decode, decode_cell};
pub use encoder::{ToLiteral, encode, encode_any};
pub use error::{CodecError, CodecResult};
pub use row::{ColumnDescriptor, ResultSchema, Row};
pub use types::{Kind, ScalarType, Type, parse_type};
pub use value::{Scalar, Value};

pub mod prelude {
    pub use crate::config::CodecConfig;
    pub use crate::decode::{DecodeOptions, decode, decode_cell};
    pub use crate::encoder::{ToLiteral, encode, encode_any};
    pub use crate::error::*;
    pub use crate::row::{ColumnDescriptor, ResultSchema, Row};
    pub use crate::types::{Kind, ScalarType, Type, parse_type};
    pub use crate::value::{Scalar, Value};
}
