use crate::access;
use crate::compare;
use crate::config::BridgeConfig;
use crate::consts::{MAX_BUFFER_SIZE, WORD_SIZE};
use crate::copy::KernelCopy;
use crate::error::Result;
use crate::memory::VirtualAddress;
use crate::platform::Platform;
use crate::stats::BridgeStatsData;

/// Reads, writes and compares privileged memory on top of a [`Platform`]
pub struct KernelBridge<P> {
    kcopy: KernelCopy<P>,
    config: BridgeConfig,
}

impl<P: Platform> KernelBridge<P> {
    pub fn new(platform: P) -> Self {
        Self::with_config(platform, BridgeConfig::default())
    }

    pub fn with_config(platform: P, config: BridgeConfig) -> Self {
        Self {
            kcopy: KernelCopy::new(platform),
            config,
        }
    }

    pub fn platform(&self) -> &P {
        self.kcopy.platform()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn kernel_copy(&self) -> &KernelCopy<P> {
        &self.kcopy
    }

    pub fn stats(&self) -> BridgeStatsData {
        self.kcopy.stats().snapshot()
    }

    /// See [`KernelCopy::copy`]
    pub fn copy(&self, destination: VirtualAddress, source: &[u8]) -> Result<()> {
        self.kcopy.copy(destination, source)
    }

    /// See [`KernelCopy::copy_large`]
    pub fn copy_large(&self, destination: VirtualAddress, source: &[u8]) -> Result<()> {
        self.kcopy.copy_large(destination, source)
    }

    pub fn write_word(&self, address: VirtualAddress, value: u32) -> Result<()> {
        access::write_word(&self.kcopy, address, value)
    }

    pub fn read_word(&self, address: VirtualAddress) -> Result<u32> {
        access::read_word(&self.kcopy, address, self.config.high_memory_threshold)
    }

    /// Difference of the bytes the comparator stopped on, see [`compare::compare`]
    pub fn compare(
        &self,
        source: VirtualAddress,
        destination: VirtualAddress,
        length: usize,
    ) -> Result<i32> {
        compare::compare(
            &self.kcopy,
            source,
            destination,
            length,
            self.config.compare_stride,
            self.config.high_memory_threshold,
        )
    }

    /// Write any number of bytes, one large copy per [`MAX_BUFFER_SIZE`] chunk
    pub fn write_bytes(&self, destination: VirtualAddress, source: &[u8]) -> Result<()> {
        for (i, chunk) in source.chunks(MAX_BUFFER_SIZE).enumerate() {
            self.kcopy
                .copy_large(destination.add(i * MAX_BUFFER_SIZE), chunk)?;
        }
        Ok(())
    }

    /// Fill `buf` word by word from `source`.
    ///
    /// A trailing partial word is still read whole, so up to three bytes past the end of the
    /// region are touched.
    pub fn read_bytes(&self, source: VirtualAddress, buf: &mut [u8]) -> Result<()> {
        for (i, chunk) in buf.chunks_mut(WORD_SIZE).enumerate() {
            let word = self.read_word(source.add(i * WORD_SIZE))?;
            chunk.copy_from_slice(&word.to_ne_bytes()[..chunk.len()]);
        }
        Ok(())
    }
}
