//! GrowString: a growable, NUL-terminated character buffer.
//!
//! The buffer keeps its contents followed by exactly one `'\0'` after every
//! mutation, so [`GrowString::as_bytes_with_nul`] can be handed to anything
//! that expects a C string.
//!
//! Capacity is tracked explicitly (excluding the terminator) and follows a
//! fixed policy:
//! - a new buffer starts with capacity 10;
//! - [`push`](GrowString::push) grows to `2 * capacity + 1` when full;
//! - [`overwrite`](GrowString::overwrite) and [`concat`](GrowString::concat)
//!   resize to exactly fit the new contents.
//!
//! Allocation failures are reported as [`BufferError::OutOfMemory`].

use core::fmt;

use miette::Diagnostic;
use thiserror::Error;

const INITIAL_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum BufferError {
    #[error("out of memory while growing string buffer to {requested} bytes")]
    #[diagnostic(code(stutter::buffer::out_of_memory))]
    OutOfMemory { requested: usize },
}

pub struct GrowString {
    /// Contents followed by a single NUL.
    data: String,
    capacity: usize,
}

impl GrowString {
    /// Create an empty buffer with the initial capacity reserved.
    pub fn new() -> Result<Self, BufferError> {
        let mut data = String::new();
        reserve_exact(&mut data, INITIAL_CAPACITY + 1)?;
        data.push('\0');
        Ok(Self {
            data,
            capacity: INITIAL_CAPACITY,
        })
    }

    /// Create a buffer holding `text`, sized to fit it exactly.
    pub fn from_text(text: &str) -> Result<Self, BufferError> {
        let mut buffer = Self::new()?;
        buffer.overwrite(text)?;
        Ok(buffer)
    }

    /// Number of bytes stored, not counting the terminator.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical capacity in bytes, not counting the terminator.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one character, growing to `2 * capacity + 1` while it does not fit.
    pub fn push(&mut self, ch: char) -> Result<(), BufferError> {
        let needed = self.len() + ch.len_utf8();
        if needed > self.capacity {
            let mut new_capacity = self.capacity;
            while new_capacity < needed {
                new_capacity = 2 * new_capacity + 1;
            }
            reserve_exact(&mut self.data, new_capacity + 1)?;
            self.capacity = new_capacity;
        }
        self.data.pop();
        self.data.push(ch);
        self.data.push('\0');
        Ok(())
    }

    /// Append every character of `text` through [`push`](Self::push).
    pub fn push_str(&mut self, text: &str) -> Result<(), BufferError> {
        for ch in text.chars() {
            self.push(ch)?;
        }
        Ok(())
    }

    /// Replace the whole contents with `text`; capacity becomes `text.len()`.
    pub fn overwrite(&mut self, text: &str) -> Result<(), BufferError> {
        let mut data = String::new();
        reserve_exact(&mut data, text.len() + 1)?;
        data.push_str(text);
        data.push('\0');
        self.data = data;
        self.capacity = text.len();
        Ok(())
    }

    /// Append the contents of `other`; capacity becomes the combined length.
    pub fn concat(&mut self, other: &GrowString) -> Result<(), BufferError> {
        let new_len = self.len() + other.len();
        reserve_exact(&mut self.data, new_len + 1)?;
        self.data.pop();
        self.data.push_str(other.as_str());
        self.data.push('\0');
        self.data.shrink_to(new_len + 1);
        self.capacity = new_len;
        Ok(())
    }

    /// The contents without the terminator.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.data[..self.len()]
    }

    /// The contents including the trailing NUL.
    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.data.as_bytes()
    }

    pub fn into_string(mut self) -> String {
        self.data.pop();
        self.data
    }
}

/// Make sure `data` can hold `total` bytes without reallocating.
fn reserve_exact(data: &mut String, total: usize) -> Result<(), BufferError> {
    let additional = total.saturating_sub(data.len());
    data.try_reserve_exact(additional)
        .map_err(|_| BufferError::OutOfMemory { requested: total })
}

impl fmt::Display for GrowString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for GrowString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowString")
            .field("data", &self.as_str())
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl PartialEq<str> for GrowString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for GrowString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl AsRef<str> for GrowString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
