//! # Type Descriptor Table
//!
//! Static mapping from a bracketed syntax tag to a value kind, its fixed
//! binary width and its conversion rule.
//!
//! | Tag | Width | Rust type |
//! |------------|-------|-----------|
//! | `<CHAR>`   | 1     | `u8` (one ASCII character) |
//! | `<BYTE>`   | 1     | `i8`  |
//! | `<UBYTE>`  | 1     | `u8`  |
//! | `<SHORT>`  | 2     | `i16` |
//! | `<USHORT>` | 2     | `u16` |
//! | `<INT>`    | 4     | `i32` |
//! | `<UINT>`   | 4     | `u32` |
//! | `<LONG>`   | word  | `isize` |
//! | `<ULONG>`  | word  | `usize` |
//! | `<LLONG>`  | 8     | `i64` |
//! | `<ULLONG>` | 8     | `u64` |
//! | `<STRING>` | word  | `&str` (index of an owned heap copy) |
//! | `<PTR>`    | word  | `usize` address, hexadecimal |
//!
//! Two entries never carry a value: `<SUBCMD>` marks that the next word is a
//! nested command name, and `<VOID>` is what an unknown tag resolves to.

use core::fmt;
use core::mem::size_of;
use core::num::IntErrorKind;
use core::str::FromStr;

use crate::error::ParseError;

/// Leading byte of every argument tag.
pub const TAG_MARKER: char = '<';

/// Closed set of argument kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Subcommand,
    Void,
    Char,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LLong,
    ULLong,
    Str,
    Ptr,
}

impl Kind {
    /// Number of bytes one value of this kind occupies in an argument bundle.
    pub const fn width(self) -> usize {
        match self {
            Kind::Subcommand | Kind::Void => 0,
            Kind::Char | Kind::Byte | Kind::UByte => 1,
            Kind::Short | Kind::UShort => 2,
            Kind::Int | Kind::UInt => 4,
            Kind::LLong | Kind::ULLong => 8,
            Kind::Long => size_of::<isize>(),
            Kind::ULong | Kind::Ptr => size_of::<usize>(),
            // strings are stored as the index of their owned heap block
            Kind::Str => size_of::<usize>(),
        }
    }

    /// Convert one token into a value of this kind.
    ///
    /// The whole token must match; `"42abc"` is not an integer.
    pub fn parse(self, text: &str) -> Result<Value<'_>, ParseError> {
        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        let value = match self {
            Kind::Subcommand | Kind::Void => return Err(ParseError::NotAValue),
            Kind::Char => match text.as_bytes() {
                [b] if b.is_ascii() => Value::Char(*b),
                _ => return Err(ParseError::InvalidChar),
            },
            Kind::Byte => Value::Byte(parse_int(text)?),
            Kind::UByte => Value::UByte(parse_int(text)?),
            Kind::Short => Value::Short(parse_int(text)?),
            Kind::UShort => Value::UShort(parse_int(text)?),
            Kind::Int => Value::Int(parse_int(text)?),
            Kind::UInt => Value::UInt(parse_int(text)?),
            Kind::Long => Value::Long(parse_int(text)?),
            Kind::ULong => Value::ULong(parse_int(text)?),
            Kind::LLong => Value::LLong(parse_int(text)?),
            Kind::ULLong => Value::ULLong(parse_int(text)?),
            Kind::Str => Value::Str(text),
            Kind::Ptr => Value::Ptr(parse_address(text)?),
        };
        Ok(value)
    }
}

fn parse_int<T>(text: &str) -> Result<T, ParseError>
where
    T: FromStr<Err = core::num::ParseIntError>,
{
    text.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ParseError::OutOfRange,
        _ => ParseError::InvalidInteger,
    })
}

fn parse_address(text: &str) -> Result<usize, ParseError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidAddress);
    }
    usize::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidAddress)
}

/// A converted argument value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Char(u8),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(isize),
    ULong(usize),
    LLong(i64),
    ULLong(u64),
    Str(&'a str),
    Ptr(usize),
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Char(_) => Kind::Char,
            Value::Byte(_) => Kind::Byte,
            Value::UByte(_) => Kind::UByte,
            Value::Short(_) => Kind::Short,
            Value::UShort(_) => Kind::UShort,
            Value::Int(_) => Kind::Int,
            Value::UInt(_) => Kind::UInt,
            Value::Long(_) => Kind::Long,
            Value::ULong(_) => Kind::ULong,
            Value::LLong(_) => Kind::LLong,
            Value::ULLong(_) => Kind::ULLong,
            Value::Str(_) => Kind::Str,
            Value::Ptr(_) => Kind::Ptr,
        }
    }

    /// Append the native-endian bytes of a fixed-width value to `out`.
    ///
    /// Returns `false` for `Str`, whose binary form is owned by the bundle.
    pub fn encode_scalar(&self, out: &mut Vec<u8>) -> bool {
        match *self {
            Value::Char(v) | Value::UByte(v) => out.push(v),
            Value::Byte(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Value::Short(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Value::UShort(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Value::Int(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Value::UInt(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Value::Long(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Value::ULong(v) | Value::Ptr(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Value::LLong(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Value::ULLong(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Value::Str(_) => return false,
        }
        true
    }

    /// Rebuild a value from its bundle bytes. `blocks` resolves string indices.
    ///
    /// Returns `None` when the byte count does not match the kind's width.
    pub fn decode(kind: Kind, bytes: &[u8], blocks: &'a [Box<str>]) -> Option<Value<'a>> {
        let value = match kind {
            Kind::Subcommand | Kind::Void => return None,
            Kind::Char => Value::Char(*single(bytes)?),
            Kind::UByte => Value::UByte(*single(bytes)?),
            Kind::Byte => Value::Byte(i8::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::Short => Value::Short(i16::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::UShort => Value::UShort(u16::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::Int => Value::Int(i32::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::UInt => Value::UInt(u32::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::Long => Value::Long(isize::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::ULong => Value::ULong(usize::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::LLong => Value::LLong(i64::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::ULLong => Value::ULLong(u64::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::Ptr => Value::Ptr(usize::from_ne_bytes(bytes.try_into().ok()?)),
            Kind::Str => {
                let index = usize::from_ne_bytes(bytes.try_into().ok()?);
                let block: &'a str = blocks.get(index)?;
                Value::Str(block)
            }
        };
        Some(value)
    }
}

fn single(bytes: &[u8]) -> Option<&u8> {
    match bytes {
        [b] => Some(b),
        _ => None,
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Char(v) => write!(f, "{}", *v as char),
            Value::Byte(v) => write!(f, "{v}"),
            Value::UByte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::UShort(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::ULong(v) => write!(f, "{v}"),
            Value::LLong(v) => write!(f, "{v}"),
            Value::ULLong(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Ptr(v) => write!(f, "{v:#x}"),
        }
    }
}

/// One resolved type rule bound to a position in a command's grammar.
#[derive(Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub tag: &'static str,
    pub kind: Kind,
    pub width: usize,
}

impl Descriptor {
    const fn new(tag: &'static str, kind: Kind) -> Self {
        Self { tag, kind, width: kind.width() }
    }

    /// Resolve a spec word to its descriptor.
    ///
    /// A word that does not start with `<` is a command name, so it resolves
    /// to the subcommand marker. Unknown tags resolve to the `<VOID>` fallback,
    /// which callers must reject (see [`Descriptor::is_unknown`]).
    pub fn resolve(tag: &str) -> &'static Descriptor {
        if !tag.starts_with(TAG_MARKER) {
            return &DESCRIPTORS[SUBCMD_INDEX];
        }
        // scan starts past the marker entry; `<SUBCMD>` cannot be spelled in a spec
        DESCRIPTORS[VOID_INDEX..]
            .iter()
            .find(|d| d.tag == tag)
            .unwrap_or(&DESCRIPTORS[VOID_INDEX])
    }

    /// The subcommand marker descriptor.
    pub fn subcommand() -> &'static Descriptor {
        &DESCRIPTORS[SUBCMD_INDEX]
    }

    pub fn is_subcommand(&self) -> bool {
        self.kind == Kind::Subcommand
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == Kind::Void
    }

    /// True for every descriptor that consumes one value token.
    pub fn is_value(&self) -> bool {
        self.width > 0
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag)
    }
}

const SUBCMD_INDEX: usize = 0;
const VOID_INDEX: usize = 1;

static DESCRIPTORS: [Descriptor; 15] = [
    Descriptor::new("<SUBCMD>", Kind::Subcommand),
    Descriptor::new("<VOID>", Kind::Void),
    Descriptor::new("<CHAR>", Kind::Char),
    Descriptor::new("<BYTE>", Kind::Byte),
    Descriptor::new("<UBYTE>", Kind::UByte),
    Descriptor::new("<SHORT>", Kind::Short),
    Descriptor::new("<USHORT>", Kind::UShort),
    Descriptor::new("<INT>", Kind::Int),
    Descriptor::new("<UINT>", Kind::UInt),
    Descriptor::new("<LONG>", Kind::Long),
    Descriptor::new("<ULONG>", Kind::ULong),
    Descriptor::new("<LLONG>", Kind::LLong),
    Descriptor::new("<ULLONG>", Kind::ULLong),
    Descriptor::new("<STRING>", Kind::Str),
    Descriptor::new("<PTR>", Kind::Ptr),
];

/// Every descriptor that can appear as a positional argument, in table order.
pub fn value_descriptors() -> impl Iterator<Item = &'static Descriptor> {
    DESCRIPTORS.iter().filter(|d| d.is_value())
}

// ==================== TESTS =======================
