//! Human-readable text format for wire values.
//!
//! The grammar is the familiar GVariant text subset: `true`, `42`, `1.5`,
//! `'str'`, `b'bytes'`, `<variant>`, `[array]`, `(tuple,)`, `{dict: entries}`,
//! `just`/`nothing`, type keywords such as `uint32 7`, and `@TYPE`
//! annotations. [`WireValue`]'s `Display` prints in the same grammar.

mod parse;
mod print;

use std::str::FromStr;

pub use parse::parse;

use crate::{ParseError, WireValue};

impl FromStr for WireValue {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
