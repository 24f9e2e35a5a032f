//! The single-slot command mailbox
//!
//! An external producer stores a value and then a destination address into the record. The
//! poller performs the write and zeroes the destination and then the value, which the producer
//! observes as completion.
//!
//! Nothing stops the producer from posting a new command between the poller's load of the
//! destination and the zeroing of the record; such a command is lost.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::memory::VirtualAddress;

/// Layout shared with the producer: destination word at offset 0, value right after it.
#[repr(C)]
#[derive(Debug, Default)]
pub struct MailboxRecord {
    destination: AtomicUsize,
    value: AtomicU32,
}

impl MailboxRecord {
    pub const fn new() -> Self {
        Self {
            destination: AtomicUsize::new(0),
            value: AtomicU32::new(0),
        }
    }

    /// Producer side: publish a command
    pub fn post(&self, destination: VirtualAddress, value: u32) {
        self.value.store(value, Ordering::Relaxed);
        self.destination.store(destination.data(), Ordering::Release);
    }

    pub fn load(&self) -> (VirtualAddress, u32) {
        (
            VirtualAddress::new(self.destination.load(Ordering::Acquire)),
            self.value.load(Ordering::Relaxed),
        )
    }

    pub fn is_empty(&self) -> bool {
        VirtualAddress::new(self.destination.load(Ordering::Acquire)).is_null()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Mailbox {
    record: &'static MailboxRecord,
}

impl Mailbox {
    pub fn new(record: &'static MailboxRecord) -> Self {
        Self { record }
    }

    /// # Safety
    /// `address` must point to a mapped, suitably aligned [`MailboxRecord`] that outlives the
    /// process.
    pub unsafe fn from_address(address: VirtualAddress) -> Self {
        Self {
            record: unsafe { &*(address.data() as *const MailboxRecord) },
        }
    }

    pub fn record(&self) -> &'static MailboxRecord {
        self.record
    }

    pub fn destination(&self) -> VirtualAddress {
        VirtualAddress::new(self.record.destination.load(Ordering::Acquire))
    }

    pub fn value(&self) -> u32 {
        self.record.value.load(Ordering::Acquire)
    }

    /// Mark the slot free: destination first, then value
    pub fn consume(&self) {
        self.record.destination.store(0, Ordering::Release);
        self.record.value.store(0, Ordering::Release);
    }
}
