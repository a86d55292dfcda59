#![warn(missing_docs)]

//! Conversion between GVariant-style wire values and dynamic [`Value`]s.
//!
//! - [`decode`] / [`decode_from_text`]: wire (or text literal) to [`Value`].
//! - [`encode`]: [`Value`] to wire, wire types chosen by tag.
//! - [`encode_with_schema`]: [`Value`] to wire, directed by a type string,
//!   falling back to [`encode`] whenever the schema cannot be honoured.
//!
//! Nothing in this crate fails hard on malformed data: unrepresentable wire
//! values decode to [`Value::Unsupported`] and unencodable values yield
//! `None`, with a `tracing` warning in both cases.

mod convert;
mod decode;
mod encode;
mod error;
mod text;
mod types;
mod value;
mod wire;

pub use decode::{decode, decode_from_text};
pub use encode::{encode, encode_with_schema};
pub use error::{ParseError, SignatureError};
pub use text::parse as parse_text;
pub use types::WireType;
pub use value::Value;
pub use wire::WireValue;
