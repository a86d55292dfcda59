use thiserror::Error;

/// Failure to parse a wire type string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The type string was empty.
    #[error("empty type string")]
    Empty,
    /// The type string ended inside a container.
    #[error("type string ends unexpectedly at byte {0}")]
    UnexpectedEnd(usize),
    /// A character that does not start a type.
    #[error("unexpected `{ch}` in type string at byte {pos}")]
    UnexpectedChar {
        /// Offending character.
        ch: char,
        /// Byte offset.
        pos: usize,
    },
    /// A dictionary entry whose key is not a basic type.
    #[error("dictionary key at byte {0} is not a basic type")]
    NonBasicKey(usize),
    /// Containers nested beyond the supported depth.
    #[error("type string nests deeper than {0} levels")]
    TooDeep(usize),
    /// Text left over after one complete type.
    #[error("trailing characters in type string at byte {0}")]
    Trailing(usize),
}

/// Failure to parse a text-format value literal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input ended before the value was complete.
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    /// A character that cannot appear here.
    #[error("unexpected `{found}` at byte {pos}")]
    Unexpected {
        /// Offending character.
        found: char,
        /// Byte offset.
        pos: usize,
    },
    /// A bare word that is neither a literal nor a type keyword.
    #[error("unknown keyword `{word}` at byte {pos}")]
    UnknownKeyword {
        /// The word as written.
        word: String,
        /// Byte offset.
        pos: usize,
    },
    /// A malformed numeric literal.
    #[error("invalid number `{text}` at byte {pos}")]
    InvalidNumber {
        /// The literal as written.
        text: String,
        /// Byte offset.
        pos: usize,
    },
    /// A numeric literal that does not fit its type.
    #[error("number `{text}` out of range for type `{ty}` at byte {pos}")]
    OutOfRange {
        /// The literal as written.
        text: String,
        /// Target type string.
        ty: String,
        /// Byte offset.
        pos: usize,
    },
    /// A malformed escape sequence inside a string.
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),
    /// A value whose type disagrees with its context.
    #[error("expected a value of type `{expected}`, found `{found}` at byte {pos}")]
    TypeMismatch {
        /// Type required by the context.
        expected: String,
        /// Type of the value as written.
        found: String,
        /// Byte offset.
        pos: usize,
    },
    /// An empty container or `nothing` without a type annotation.
    #[error("cannot infer the type at byte {0}; add an @TYPE annotation")]
    NeedsAnnotation(usize),
    /// A malformed `@TYPE` annotation.
    #[error("invalid type annotation at byte {pos}: {source}")]
    Annotation {
        /// Byte offset of the annotation.
        pos: usize,
        /// Underlying type string error.
        source: SignatureError,
    },
    /// Containers nested beyond the supported depth.
    #[error("value nests too deeply at byte {0}")]
    TooDeep(usize),
    /// Text left over after one complete value.
    #[error("trailing input at byte {0}")]
    Trailing(usize),
}
