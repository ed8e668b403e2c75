//! Reusable buffers and owner tokens.

use std::cell::Cell;
use std::rc::Rc;

use retrofit_refs::Buffer;

/// A buffer holding `0, 1, .., n - 1`.
pub fn iota(n: i32) -> Buffer<i32> {
    Buffer::from_vec((0..n).collect())
}

/// A buffer of `n` copies of `value`.
pub fn filled<T: Clone>(value: T, n: usize) -> Buffer<T> {
    Buffer::from_vec(vec![value; n])
}

/// A NUL-terminated byte string, plus `spare` extra zeroed slots.
pub fn cstr(s: &str, spare: usize) -> Buffer<u8> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.resize(bytes.len() + 1 + spare, 0);
    Buffer::from_vec(bytes)
}

/// A NUL-terminated UTF-16 string, plus `spare` extra zeroed slots.
pub fn wide_cstr(s: &str, spare: usize) -> Buffer<u16> {
    let mut units: Vec<u16> = s.encode_utf16().collect();
    units.resize(units.len() + 1 + spare, 0);
    Buffer::from_vec(units)
}

/// Counts how many [`DropToken`]s it issued have been dropped.
#[derive(Clone, Default)]
pub struct DropCounter {
    dropped: Rc<Cell<usize>>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token that bumps the counter when dropped.
    pub fn token(&self) -> DropToken {
        DropToken {
            dropped: Rc::clone(&self.dropped),
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped.get()
    }
}

/// Owner stand-in for registry records.
pub struct DropToken {
    dropped: Rc<Cell<usize>>,
}

impl Drop for DropToken {
    fn drop(&mut self) {
        self.dropped.set(self.dropped.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cstr_is_terminated_and_padded() {
        let b = cstr("hi", 2);
        assert_eq!(b.to_vec().unwrap(), vec![b'h', b'i', 0, 0, 0]);
        assert_eq!(wide_cstr("é", 0).to_vec().unwrap(), vec![0xe9, 0]);
    }

    #[test]
    fn tokens_count_drops() {
        let counter = DropCounter::new();
        let a = counter.token();
        let b = counter.token();
        drop(a);
        assert_eq!(counter.dropped(), 1);
        drop(b);
        assert_eq!(counter.dropped(), 2);
    }
}
