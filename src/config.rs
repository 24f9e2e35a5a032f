//! Runtime configuration. Defaults come from [`crate::consts`].

use crate::consts::*;
use crate::memory::VirtualAddress;
use crate::platform::ThreadAttributes;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BridgeConfig {
    /// Reads above this address use the direct kernel read
    pub high_memory_threshold: usize,
    /// Step between two bytes looked at by the comparator
    pub compare_stride: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            high_memory_threshold: HIGH_MEMORY_THRESHOLD,
            compare_stride: COMPARE_STEP,
        }
    }
}

impl BridgeConfig {
    pub fn with_high_memory_threshold(mut self, threshold: usize) -> Self {
        self.high_memory_threshold = threshold;
        self
    }
    /// A zero stride would never advance, so it is raised to one
    pub fn with_compare_stride(mut self, stride: usize) -> Self {
        self.compare_stride = stride.max(1);
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ServiceConfig {
    pub mailbox: VirtualAddress,
    pub stack_size: usize,
    pub stack_align: usize,
    pub priority: i32,
    pub attributes: ThreadAttributes,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mailbox: VirtualAddress::new(MAILBOX_ADDRESS),
            stack_size: POLLER_STACK_SIZE,
            stack_align: POLLER_STACK_ALIGN,
            priority: POLLER_PRIORITY,
            attributes: ThreadAttributes::AFFINITY_CPU1
                | ThreadAttributes::PINNED_AFFINITY
                | ThreadAttributes::DETACHED,
        }
    }
}

impl ServiceConfig {
    pub fn with_mailbox(mut self, mailbox: VirtualAddress) -> Self {
        self.mailbox = mailbox;
        self
    }
    pub fn with_stack(mut self, size: usize, align: usize) -> Self {
        self.stack_size = size;
        self.stack_align = align;
        self
    }
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
    pub fn with_attributes(mut self, attributes: ThreadAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}
