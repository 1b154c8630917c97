//! Error kinds reported by registration, value conversion and execution.
//!
//! None of these abort anything: the registry and the shell stay usable
//! after every one of them.

use thiserror::Error;

/// A value token could not be converted by its descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Empty token (two adjacent delimiters in the input line).
    #[error("empty value")]
    Empty,

    /// Token does not fit the scratch buffer.
    #[error("value longer than {max} bytes")]
    TooLong { max: usize },

    /// Not an optionally signed run of decimal digits.
    #[error("not an integer")]
    InvalidInteger,

    /// Integer syntax is fine but the value does not fit the type width.
    #[error("integer out of range")]
    OutOfRange,

    /// `<CHAR>` takes exactly one ASCII character.
    #[error("expected a single ASCII character")]
    InvalidChar,

    /// `<PTR>` takes a hexadecimal address, `0x` prefix optional.
    #[error("not a hexadecimal address")]
    InvalidAddress,

    /// Marker and fallback descriptors never carry a value.
    #[error("descriptor does not take a value")]
    NotAValue,
}

/// A registration spec was rejected. The registry is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// Nothing left after trimming blanks and control bytes.
    #[error("empty command spec")]
    EmptySpec,

    /// The spec (or a nesting level) starts with a tag instead of a name.
    #[error("expected a command name, found tag `{tag}`")]
    MissingName { tag: String },

    /// Tag not present in the descriptor table.
    #[error("unknown argument type `{tag}`")]
    UnknownType { tag: String },

    /// The full command path is already registered.
    #[error("command `{path}` is already registered")]
    DuplicatePath { path: String },

    /// An already registered segment declares a different argument grammar.
    #[error("command `{name}` is already registered with a different grammar")]
    GrammarConflict { name: String },

    /// Growing the root table or a child list failed.
    #[error("allocation failure while growing the command tree")]
    AllocationFailure,
}

/// Why a line did not run a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// Root or nested command name not registered.
    #[error("unknown command `{name}`")]
    UnknownCommand { name: String },

    /// The line ended while a value or a subcommand was still expected.
    #[error("`{command}` is missing an argument: expected {expected}")]
    MissingArgument { command: String, expected: &'static str },

    /// A value token failed its descriptor's conversion.
    #[error("cannot parse `{token}` as {tag}: {source}")]
    UnparsableToken {
        token: String,
        tag: &'static str,
        #[source]
        source: ParseError,
    },

    /// Tokens left over after every argument was satisfied.
    #[error("`{command}` takes no further arguments, found `{extra}`")]
    TooManyArguments { command: String, extra: String },

    /// The state machine reached a state it should never observe.
    #[error("internal fault in the command state machine")]
    Fault,
}
