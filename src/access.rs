//! Word-sized access to privileged memory
//!
//! Writes always go through the privileged copy. Reads have two paths that are not
//! interchangeable: the privileged copy crashes the privileged context for addresses above the
//! high-memory threshold, and the trusted kernel read is only defined above it. The path is a
//! pure function of the address, see [`ReadPath::for_address`].

use crate::consts::WORD_SIZE;
use crate::copy::KernelCopy;
use crate::error::{Error, Result, EFAULT};
use crate::memory::VirtualAddress;
use crate::platform::Platform;
use crate::stats::Counter;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadPath {
    /// Copy the word into local memory with the privileged copy
    KernelCopy,
    /// Use the trusted kernel read
    DirectRead,
}

impl ReadPath {
    #[inline]
    pub const fn for_address(address: VirtualAddress, threshold: usize) -> Self {
        if address.data() > threshold {
            ReadPath::DirectRead
        } else {
            ReadPath::KernelCopy
        }
    }
}

pub trait PrivilegedReader {
    fn read_word(&self, address: VirtualAddress) -> Result<u32>;
}

pub struct CopyReader<'a, P>(pub &'a KernelCopy<P>);

impl<P: Platform> PrivilegedReader for CopyReader<'_, P> {
    fn read_word(&self, address: VirtualAddress) -> Result<u32> {
        let platform = self.0.platform();
        if !platform.is_address_valid(address)
            || !platform.is_address_valid(address.add(WORD_SIZE - 1))
        {
            return Err(Error::new(EFAULT));
        }

        let mut word = [0u8; WORD_SIZE];
        let local = VirtualAddress::from_ptr(word.as_mut_ptr());

        // The source is loaded in our own context before being handed to the primitive, and both
        // ends of the word were reported readable above
        unsafe { self.0.copy_from_address(local, address, WORD_SIZE)? };

        self.0.stats().add(Counter::CopyRead);
        Ok(u32::from_ne_bytes(word))
    }
}

pub struct DirectReader<'a, P>(pub &'a KernelCopy<P>);

impl<P: Platform> PrivilegedReader for DirectReader<'_, P> {
    fn read_word(&self, address: VirtualAddress) -> Result<u32> {
        let word = self.0.platform().kern_read(address);

        self.0.stats().add(Counter::DirectRead);
        Ok(word)
    }
}

/// Read the word at `address`, choosing the path from the address alone.
pub fn read_word<P: Platform>(
    kcopy: &KernelCopy<P>,
    address: VirtualAddress,
    threshold: usize,
) -> Result<u32> {
    match ReadPath::for_address(address, threshold) {
        ReadPath::DirectRead => {
            log::debug!("read {:?}: direct kernel read", address);
            DirectReader(kcopy).read_word(address)
        }
        ReadPath::KernelCopy => {
            log::debug!("read {:?}: kernel copy", address);
            CopyReader(kcopy).read_word(address)
        }
    }
}

pub fn write_word<P: Platform>(
    kcopy: &KernelCopy<P>,
    address: VirtualAddress,
    value: u32,
) -> Result<()> {
    kcopy.copy(address, &value.to_ne_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::HIGH_MEMORY_THRESHOLD;
    use crate::tests::StubPlatform;

    #[test]
    fn path_is_split_at_the_threshold() {
        let at = |a| ReadPath::for_address(VirtualAddress::new(a), HIGH_MEMORY_THRESHOLD);
        assert_eq!(at(0x1000_0000), ReadPath::KernelCopy);
        assert_eq!(at(HIGH_MEMORY_THRESHOLD), ReadPath::KernelCopy);
        assert_eq!(at(HIGH_MEMORY_THRESHOLD + 1), ReadPath::DirectRead);
        assert_eq!(at(0xFFE0_0000), ReadPath::DirectRead);
    }

    #[test]
    fn high_address_only_uses_the_direct_read() {
        let kcopy = KernelCopy::new(StubPlatform::new());
        let address = VirtualAddress::new(0xFFE8_5000);
        kcopy.platform().set_kernel_word(address, 0x1234_5678);

        assert_eq!(read_word(&kcopy, address, HIGH_MEMORY_THRESHOLD), Ok(0x1234_5678));
        assert_eq!(kcopy.platform().kern_reads(), 1);
        assert_eq!(kcopy.platform().copies(), 0);
    }

    #[test]
    fn low_address_only_uses_the_kernel_copy() {
        let kcopy = KernelCopy::new(StubPlatform::new());
        let source = 0xCAFE_F00D_u32.to_ne_bytes();
        let address = VirtualAddress::from_ptr(source.as_ptr());
        kcopy.platform().mark_valid(address, source.len());

        // Host pointers sit above 0xF000_0000, so move the threshold out of the way
        let value = read_word(&kcopy, address, usize::MAX);
        assert_eq!(value, Ok(0xCAFE_F00D));
        assert_eq!(kcopy.platform().kern_reads(), 0);
        assert_eq!(kcopy.platform().copies(), 1);
    }

    #[test]
    fn write_word_is_one_word_sized_copy() {
        let kcopy = KernelCopy::new(StubPlatform::new());
        let mut target = [0u8; 8];
        let address = VirtualAddress::from_ptr(target.as_mut_ptr());

        write_word(&kcopy, address, 0x0BAD_C0DE).unwrap();

        assert_eq!(u32::from_ne_bytes([target[0], target[1], target[2], target[3]]), 0x0BAD_C0DE);
        assert_eq!(&target[4..], &[0; 4]);
        assert_eq!(kcopy.platform().flushes(), alloc::vec![(address, WORD_SIZE)]);
    }

    #[test]
    fn copy_read_propagates_translation_faults() {
        let kcopy = KernelCopy::new(StubPlatform::new());
        kcopy.platform().fail_translation(true);
        let source = [0u8; 4];
        let address = VirtualAddress::from_ptr(source.as_ptr());
        kcopy.platform().mark_valid(address, source.len());

        let value = read_word(&kcopy, address, usize::MAX);
        assert_eq!(value, Err(Error::new(EFAULT)));
    }

    #[test]
    fn unreadable_source_faults_before_any_access() {
        let kcopy = KernelCopy::new(StubPlatform::new());

        let value = read_word(&kcopy, VirtualAddress::new(0x10), HIGH_MEMORY_THRESHOLD);
        assert_eq!(value, Err(Error::new(EFAULT)));
        assert_eq!(kcopy.platform().copies(), 0);
        assert!(kcopy.platform().flushes().is_empty());
    }

    #[test]
    fn word_must_be_readable_to_its_last_byte() {
        let kcopy = KernelCopy::new(StubPlatform::new());
        let source = [0x11u8; 8];
        let address = VirtualAddress::from_ptr(source.as_ptr());
        kcopy.platform().mark_valid(address, 6);

        assert_eq!(read_word(&kcopy, address, usize::MAX), Ok(0x1111_1111));
        assert_eq!(read_word(&kcopy, address.add(2), usize::MAX), Ok(0x1111_1111));
        assert_eq!(read_word(&kcopy, address.add(3), usize::MAX), Err(Error::new(EFAULT)));
        assert_eq!(kcopy.platform().copies(), 2);
    }
}
