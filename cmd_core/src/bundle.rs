//! # Argument Bundle
//!
//! Type-erased carrier of the converted arguments of one execution.
//!
//! Values are appended to one contiguous byte buffer; an offset table marks
//! where each argument starts. Strings do not fit a fixed width, so the text
//! is copied into a heap block owned by the bundle and the buffer stores the
//! block index instead.
//!
//! Consumers read arguments back in order with [`ArgBundle::next`] (raw
//! bytes), [`ArgBundle::next_value`] or [`ArgBundle::next_as`]. Once every
//! pushed argument has been read these return `None`.

use core::any::Any;
use core::cell::Cell;

use crate::types::{Kind, Value};

pub struct ArgBundle<'a> {
    data: Vec<u8>,
    offsets: Vec<usize>,
    kinds: Vec<Kind>,
    blocks: Vec<Box<str>>,
    cursor: Cell<usize>,
    context: Option<&'a dyn Any>,
}

impl Default for ArgBundle<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ArgBundle<'a> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            offsets: Vec::new(),
            kinds: Vec::new(),
            blocks: Vec::new(),
            cursor: Cell::new(0),
            context: None,
        }
    }

    /// Attach the registration context handed to the handler.
    pub fn set_context(&mut self, context: Option<&'a dyn Any>) {
        self.context = context;
    }

    /// Registration context, if one was supplied and it is a `T`.
    pub fn context<T: Any>(&self) -> Option<&'a T> {
        self.context?.downcast_ref::<T>()
    }

    /// Append one argument's raw bytes, recording its offset.
    ///
    /// `bytes` must be exactly `kind.width()` long; anything else is refused
    /// and leaves the bundle unchanged, so offsets stay strictly increasing.
    fn push(&mut self, kind: Kind, bytes: &[u8]) -> bool {
        if bytes.is_empty() || bytes.len() != kind.width() {
            return false;
        }
        self.offsets.push(self.data.len());
        self.kinds.push(kind);
        self.data.extend_from_slice(bytes);
        true
    }

    /// Append a string argument: the bundle keeps its own heap copy, released with the bundle.
    pub fn push_owned(&mut self, text: &str) {
        let index = self.blocks.len();
        self.blocks.push(Box::from(text));
        self.push(Kind::Str, &index.to_ne_bytes());
    }

    pub fn push_value(&mut self, value: Value<'_>) {
        match value {
            Value::Str(text) => self.push_owned(text),
            scalar => {
                let mut bytes = Vec::with_capacity(scalar.kind().width());
                scalar.encode_scalar(&mut bytes);
                self.push(scalar.kind(), &bytes);
            }
        }
    }

    /// Number of arguments pushed.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Arguments not read yet.
    pub fn remaining(&self) -> usize {
        self.len() - self.cursor.get()
    }

    /// Kind of the next unread argument.
    pub fn peek_kind(&self) -> Option<Kind> {
        self.kinds.get(self.cursor.get()).copied()
    }

    fn take(&self) -> Option<(Kind, &[u8])> {
        let index = self.cursor.get();
        let start = *self.offsets.get(index)?;
        let end = self.offsets.get(index + 1).copied().unwrap_or(self.data.len());
        self.cursor.set(index + 1);
        Some((self.kinds[index], &self.data[start..end]))
    }

    /// Raw bytes of the next argument; `None` once the bundle is exhausted.
    pub fn next(&self) -> Option<&[u8]> {
        self.take().map(|(_, bytes)| bytes)
    }

    /// Next argument decoded back into a [`Value`].
    pub fn next_value(&self) -> Option<Value<'_>> {
        let (kind, bytes) = self.take()?;
        Value::decode(kind, bytes, &self.blocks)
    }

    /// Next argument as a concrete type.
    ///
    /// The argument is consumed even when it is not a `T`.
    pub fn next_as<'s, T: FromArg<'s>>(&'s self) -> Option<T> {
        self.next_value().and_then(T::from_value)
    }

    /// Every argument from the start, without moving the cursor.
    pub fn values(&self) -> impl Iterator<Item = Value<'_>> + '_ {
        (0..self.len()).filter_map(move |i| {
            let start = self.offsets[i];
            let end = self.offsets.get(i + 1).copied().unwrap_or(self.data.len());
            Value::decode(self.kinds[i], &self.data[start..end], &self.blocks)
        })
    }

    /// Release every owned block, the buffer and the offset table.
    /// Calling it again, or on a bundle never written to, does nothing.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.data.clear();
        self.offsets.clear();
        self.kinds.clear();
        self.cursor.set(0);
    }
}

/// Conversion from a decoded bundle value into a handler-side type.
pub trait FromArg<'a>: Sized {
    fn from_value(value: Value<'a>) -> Option<Self>;
}

macro_rules! from_arg {
    ($ty:ty => $($variant:ident),+) => {
        impl<'a> FromArg<'a> for $ty {
            fn from_value(value: Value<'a>) -> Option<Self> {
                match value {
                    $(Value::$variant(v) => Some(v),)+
                    _ => None,
                }
            }
        }
    };
}

from_arg!(i8 => Byte);
from_arg!(i16 => Short);
from_arg!(u16 => UShort);
from_arg!(i32 => Int);
from_arg!(u32 => UInt);
from_arg!(isize => Long);
from_arg!(usize => ULong, Ptr);
from_arg!(i64 => LLong);
from_arg!(u64 => ULLong);
from_arg!(u8 => UByte, Char);

impl<'a> FromArg<'a> for &'a str {
    fn from_value(value: Value<'a>) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl<'a> FromArg<'a> for char {
    fn from_value(value: Value<'a>) -> Option<Self> {
        match value {
            Value::Char(c) => Some(c as char),
            _ => None,
        }
    }
}

impl<'a> FromArg<'a> for Value<'a> {
    fn from_value(value: Value<'a>) -> Option<Self> {
        Some(value)
    }
}

// ==================== TESTS =======================
