//! Primitives supplied by the system the bridge runs on
//!
//! Nothing in here is implemented by this crate. An embedder implements [`Platform`] on top of the
//! privileged copy syscall, the address translator and the cache maintenance routines, and
//! [`WorkerSpawner`] on top of the thread API.

use alloc::alloc::{alloc, dealloc, Layout};
use alloc::boxed::Box;
use core::fmt;
use core::ptr::NonNull;

use crate::error::{Error, Result, EINVAL, ENOMEM};
use crate::memory::{PhysicalAddress, VirtualAddress};

pub trait Platform: Send + Sync {
    /// Copy `source` to `destination` from the privileged context.
    ///
    /// # Safety
    /// `destination` must be a physical address the privileged context may write
    /// `source.len()` bytes to. The length bound is enforced by the caller.
    unsafe fn kernel_copy(&self, destination: PhysicalAddress, source: &[u8]);

    /// Translate an effective address of the current context, failing if it is unmapped
    fn effective_to_physical(&self, address: VirtualAddress) -> Result<PhysicalAddress>;

    /// Flush `[address, address + len)` from the data cache
    fn flush_data_range(&self, address: VirtualAddress, len: usize);

    /// Read one word through the trusted kernel read. The kernel performs the access, the bridge
    /// only routes addresses above the high-memory threshold here.
    fn kern_read(&self, address: VirtualAddress) -> u32;

    /// Whether `address` is mapped and readable from the current context
    fn is_address_valid(&self, address: VirtualAddress) -> bool;

    /// Abort with a diagnostic. Used for policy violations, never for runtime faults.
    fn fatal(&self, message: fmt::Arguments<'_>) -> !;
}

bitflags! {
    /// Attributes a worker is created with
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ThreadAttributes: u32 {
        const AFFINITY_CPU0 = 1 << 0;
        const AFFINITY_CPU1 = 1 << 1;
        const AFFINITY_CPU2 = 1 << 2;
        const DETACHED = 1 << 3;
        const PINNED_AFFINITY = 1 << 4;

        const AFFINITY_ANY = Self::AFFINITY_CPU0.bits()
            | Self::AFFINITY_CPU1.bits()
            | Self::AFFINITY_CPU2.bits();
    }
}

/// Stack memory handed to a worker. Freed when dropped, so the spawner must keep it alive for as
/// long as the worker runs.
pub struct WorkerStack {
    base: NonNull<u8>,
    layout: Layout,
}

// The stack is plain memory owned by whoever holds this value
unsafe impl Send for WorkerStack {}

impl WorkerStack {
    pub fn new(size: usize, align: usize) -> Result<Self> {
        let layout = Layout::from_size_align(size, align).map_err(|_| Error::new(EINVAL))?;
        if layout.size() == 0 {
            return Err(Error::new(EINVAL));
        }

        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr)
            .map(|base| Self { base, layout })
            .ok_or(Error::new(ENOMEM))
    }
    pub fn base(&self) -> *mut u8 {
        self.base.as_ptr()
    }
    /// One past the highest byte; stacks grow down from here
    pub fn top(&self) -> *mut u8 {
        unsafe { self.base.as_ptr().add(self.layout.size()) }
    }
    pub fn len(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for WorkerStack {
    fn drop(&mut self) {
        unsafe { dealloc(self.base.as_ptr(), self.layout) }
    }
}

impl fmt::Debug for WorkerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerStack")
            .field("base", &self.base)
            .field("len", &self.layout.size())
            .field("align", &self.layout.align())
            .finish()
    }
}

pub struct WorkerSpec {
    pub entry: Box<dyn FnOnce() + Send + 'static>,
    pub stack: WorkerStack,
    pub priority: i32,
    pub attributes: ThreadAttributes,
}

pub trait WorkerSpawner {
    type Handle;

    /// Create a suspended worker
    fn create_worker(&self, spec: WorkerSpec) -> Result<Self::Handle>;

    fn resume_worker(&self, handle: &Self::Handle) -> Result<()>;
}
