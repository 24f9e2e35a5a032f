// Because the address map of the privileged side is fixed, every magic number the bridge relies
// on is defined here, in one place

/// Size of a transferred word
pub const WORD_SIZE: usize = core::mem::size_of::<u32>();

/// Largest transfer handled by the per-call staging buffer
pub const MAX_TRANSFER: usize = WORD_SIZE;

/// Largest transfer handled by the large staging buffer
pub const MAX_BUFFER_SIZE: usize = 0x5000;

/// Addresses above this are only readable through the direct kernel read
pub const HIGH_MEMORY_THRESHOLD: usize = 0xF000_0000;

/// Well-known location of the mailbox record
pub const MAILBOX_ADDRESS: usize = 0x1010_0000;

/// Shortest span the comparator accepts
pub const MIN_COMPARE_LENGTH: usize = 4;
/// Default distance between two compared bytes
pub const COMPARE_STEP: usize = 1;

/// Size of the poller's stack
pub const POLLER_STACK_SIZE: usize = 0x100;
/// Alignment of the poller's stack
pub const POLLER_STACK_ALIGN: usize = 0x40;
/// Scheduling priority of the poller (lowest)
pub const POLLER_PRIORITY: i32 = 31;
