//! Copies through the privileged copy primitive
//!
//! Every copy is staged into memory owned by the bridge, the destination is translated to a
//! physical address, the primitive is called once and the destination range is flushed from the
//! data cache so the next read through that address observes the new bytes.

use arrayvec::ArrayVec;
use spin::Mutex;

use crate::consts::{MAX_BUFFER_SIZE, MAX_TRANSFER};
use crate::error::Result;
use crate::memory::VirtualAddress;
use crate::platform::Platform;
use crate::stats::{BridgeStats, Counter};

pub struct KernelCopy<P> {
    platform: P,
    large: Mutex<ArrayVec<u8, MAX_BUFFER_SIZE>>,
    stats: BridgeStats,
}

impl<P: Platform> KernelCopy<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            large: Mutex::new(ArrayVec::new_const()),
            stats: BridgeStats::new(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Copy at most [`MAX_TRANSFER`] bytes to `destination`.
    pub fn copy(&self, destination: VirtualAddress, source: &[u8]) -> Result<()> {
        let staging = self.stage(source);
        self.commit(destination, &staging)
    }

    /// Copy `len` bytes found at `source` to `destination`.
    ///
    /// # Safety
    /// `source` must be readable from the current context for `len` bytes.
    pub unsafe fn copy_from_address(
        &self,
        destination: VirtualAddress,
        source: VirtualAddress,
        len: usize,
    ) -> Result<()> {
        let source = unsafe { core::slice::from_raw_parts(source.data() as *const u8, len) };
        self.copy(destination, source)
    }

    /// Copy at most [`MAX_BUFFER_SIZE`] bytes to `destination` with a single privileged call.
    pub fn copy_large(&self, destination: VirtualAddress, source: &[u8]) -> Result<()> {
        if source.len() > MAX_BUFFER_SIZE {
            self.platform.fatal(format_args!(
                "Kernel copy buffer size exceeded: {} > {}",
                source.len(),
                MAX_BUFFER_SIZE
            ));
        }

        let mut staging = self.large.lock();
        staging.clear();
        staging
            .try_extend_from_slice(source)
            .unwrap_or_else(|_| self.platform.fatal(format_args!("large staging overflow")));

        let physical = self.platform.effective_to_physical(destination)?;
        unsafe { self.platform.kernel_copy(physical, &staging) };
        self.platform.flush_data_range(destination, staging.len());

        self.stats.add(Counter::LargeCopy);
        Ok(())
    }

    fn stage(&self, source: &[u8]) -> ArrayVec<u8, MAX_TRANSFER> {
        let mut staging = ArrayVec::new();
        if staging.try_extend_from_slice(source).is_err() {
            self.platform.fatal(format_args!(
                "Kernel copy staging exceeded: {} > {}",
                source.len(),
                MAX_TRANSFER
            ));
        }
        staging
    }

    fn commit(&self, destination: VirtualAddress, staged: &[u8]) -> Result<()> {
        let physical = self.platform.effective_to_physical(destination)?;
        unsafe { self.platform.kernel_copy(physical, staged) };
        self.platform.flush_data_range(destination, staged.len());

        self.stats.add(Counter::Copy);
        Ok(())
    }
}
