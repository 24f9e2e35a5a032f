//! Byte comparison of two privileged regions
//!
//! Both regions are read through [`crate::access::read_word`], one word per compared byte. A
//! word read at the last compared byte reaches three bytes further, which is why at least
//! [`MIN_COMPARE_LENGTH`] bytes are required and the walk stops with that many left.

use crate::access;
use crate::consts::MIN_COMPARE_LENGTH;
use crate::copy::KernelCopy;
use crate::error::Result;
use crate::memory::VirtualAddress;
use crate::platform::Platform;

struct CompareCursor {
    source: VirtualAddress,
    destination: VirtualAddress,
    remaining: usize,
}

impl CompareCursor {
    fn advance(&mut self, stride: usize) {
        self.source = self.source.add(stride);
        self.destination = self.destination.add(stride);
        self.remaining = self.remaining.saturating_sub(stride);
    }

    fn step_back(&mut self, stride: usize) {
        self.source = self.source.sub(stride);
        self.destination = self.destination.sub(stride);
    }
}

/// The byte stored at `address`, whatever the word order of the machine
fn read_byte<P: Platform>(
    kcopy: &KernelCopy<P>,
    address: VirtualAddress,
    threshold: usize,
) -> Result<u8> {
    let word = access::read_word(kcopy, address, threshold)?;
    Ok(word.to_ne_bytes()[0])
}

/// Compare `length` bytes at `source` and `destination`.
///
/// Once at least one pair compared equal, the result is taken from the last pair the walk
/// stopped on after stepping back one stride, so only a mismatch in the very first pair yields
/// a non-zero difference.
pub fn compare<P: Platform>(
    kcopy: &KernelCopy<P>,
    source: VirtualAddress,
    destination: VirtualAddress,
    length: usize,
    stride: usize,
    threshold: usize,
) -> Result<i32> {
    if length < MIN_COMPARE_LENGTH {
        kcopy.platform().fatal(format_args!(
            "length must be at least {} but was {}",
            MIN_COMPARE_LENGTH, length
        ));
    }

    let mut cursor = CompareCursor {
        source,
        destination,
        remaining: length,
    };
    let mut loop_entered = false;

    while read_byte(kcopy, cursor.source, threshold)?
        == read_byte(kcopy, cursor.destination, threshold)?
    {
        loop_entered = true;
        cursor.advance(stride);

        if cursor.remaining <= MIN_COMPARE_LENGTH - 1 {
            break;
        }
    }

    if loop_entered {
        cursor.step_back(stride);
    }

    let a = read_byte(kcopy, cursor.source, threshold)?;
    let b = read_byte(kcopy, cursor.destination, threshold)?;
    Ok(i32::from(a) - i32::from(b))
}
