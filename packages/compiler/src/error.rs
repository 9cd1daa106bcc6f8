//! Compile Error Taxonomy
//!
//! All errors surface synchronously from the compile entry points. There is no
//! partial-success mode within a single component: a template either produces
//! a fully consistent binding tree or no output.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// Malformed directive syntax, reported with the offending raw source text.
    #[error("Invalid {construct} construct: {source_text}")]
    DirectiveSyntax {
        construct: &'static str,
        source_text: String,
    },

    /// `#for` only accepts an iterator expression (`item of items`).
    #[error("#for construct only supports iterator expression, received \"{source_text}\"")]
    ForParameterNotIterator { source_text: String },

    /// `#for` elements must have exactly one non-comment child.
    #[error("#for construct element must be single child")]
    MultipleIterationChildren,

    /// `#if` without a following `#else` sibling.
    #[error("#if construct expects a #else element as its next sibling")]
    MissingElseElement,

    /// A `<slot>` with an unrecognized `for` value.
    #[error("Unknown value for slot for. Expected {expected} received \"{received}\"")]
    UnknownSlotName {
        expected: &'static str,
        received: String,
    },

    /// Unparsable `{expr}` interpolation, reported with the original fragment.
    #[error("Error parsing interpolated text \"{{{fragment}}}\": {message}")]
    InterpolationSyntax { fragment: String, message: String },

    /// Expression lexer/parser failure outside of interpolation.
    #[error("Error parsing expression \"{source_text}\": {message}")]
    ExpressionSyntax {
        source_text: String,
        message: String,
    },

    /// Markup that the template parser cannot consume.
    #[error("Error parsing template markup: {message}")]
    MarkupSyntax { message: String },

    /// An isomorphic data point with no derivable getter (strict mode only).
    #[error("Could not find a point in which \"{chain}\" could be retrieved from server rendered output")]
    MissingServerGetter { chain: String },

    /// Recognized but unsupported construct.
    #[error("Not implemented: {construct}")]
    NotImplemented { construct: &'static str },

    /// Unreadable or invalid build configuration.
    #[error("Invalid compile settings: {message}")]
    Configuration { message: String },

    /// Internal invariant violation. Never expected from valid input.
    #[error("Unknown binding aspect {aspect}")]
    UnknownAspect { aspect: &'static str },
}

pub type Result<T> = std::result::Result<T, CompileError>;
