//! Host stand-ins for the platform primitives
//!
//! Host memory plays the part of physical memory: translation is the identity and the privileged
//! copy is a plain memory copy. Every primitive counts its calls.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;

use crate::error::{Error, Result, EFAULT, EINVAL, ENOMEM};
use crate::memory::{PhysicalAddress, VirtualAddress};
use crate::platform::{Platform, ThreadAttributes, WorkerSpawner, WorkerSpec, WorkerStack};

#[derive(Default)]
pub struct StubPlatform {
    copies: AtomicUsize,
    kern_reads: AtomicUsize,
    fail_translation: AtomicBool,
    flushes: Mutex<Vec<(VirtualAddress, usize)>>,
    unmapped: Mutex<Vec<VirtualAddress>>,
    kernel_words: Mutex<BTreeMap<VirtualAddress, u32>>,
    valid: Mutex<Vec<(VirtualAddress, usize)>>,
}

impl StubPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }
    pub fn kern_reads(&self) -> usize {
        self.kern_reads.load(Ordering::SeqCst)
    }
    pub fn flushes(&self) -> Vec<(VirtualAddress, usize)> {
        self.flushes.lock().unwrap().clone()
    }

    /// Make translation of `address` fail
    pub fn unmap(&self, address: VirtualAddress) {
        self.unmapped.lock().unwrap().push(address);
    }
    /// Make every translation fail
    pub fn fail_translation(&self, fail: bool) {
        self.fail_translation.store(fail, Ordering::SeqCst);
    }
    /// Value returned by the direct kernel read at `address`
    pub fn set_kernel_word(&self, address: VirtualAddress, value: u32) {
        self.kernel_words.lock().unwrap().insert(address, value);
    }
    /// Let the address validity check accept `[address, address + len)`
    pub fn mark_valid(&self, address: VirtualAddress, len: usize) {
        self.valid.lock().unwrap().push((address, len));
    }
}

impl Platform for StubPlatform {
    unsafe fn kernel_copy(&self, destination: PhysicalAddress, source: &[u8]) {
        self.copies.fetch_add(1, Ordering::SeqCst);
        unsafe {
            core::ptr::copy_nonoverlapping(
                source.as_ptr(),
                destination.data() as *mut u8,
                source.len(),
            );
        }
    }

    fn effective_to_physical(&self, address: VirtualAddress) -> Result<PhysicalAddress> {
        if self.fail_translation.load(Ordering::SeqCst)
            || self.unmapped.lock().unwrap().contains(&address)
        {
            return Err(Error::new(EFAULT));
        }
        Ok(PhysicalAddress::new(address.data()))
    }

    fn flush_data_range(&self, address: VirtualAddress, len: usize) {
        self.flushes.lock().unwrap().push((address, len));
    }

    fn kern_read(&self, address: VirtualAddress) -> u32 {
        self.kern_reads.fetch_add(1, Ordering::SeqCst);
        self.kernel_words
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or(0)
    }

    fn is_address_valid(&self, address: VirtualAddress) -> bool {
        self.valid
            .lock()
            .unwrap()
            .iter()
            .any(|&(base, len)| address >= base && address.data() - base.data() < len)
    }

    fn fatal(&self, message: fmt::Arguments<'_>) -> ! {
        panic!("{}", message)
    }
}

/// Worker created by [`ThreadSpawner`], backed by a host thread once resumed
pub struct StubWorker {
    pub priority: i32,
    pub attributes: ThreadAttributes,
    pub stack_len: usize,
    entry: Mutex<Option<Box<dyn FnOnce() + Send + 'static>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    _stack: WorkerStack,
}

impl StubWorker {
    pub fn join(&self) {
        if let Some(thread) = self.thread.lock().unwrap().take() {
            thread.join().expect("worker panicked");
        }
    }
}

pub struct ThreadSpawner;

impl WorkerSpawner for ThreadSpawner {
    type Handle = StubWorker;

    fn create_worker(&self, spec: WorkerSpec) -> Result<StubWorker> {
        Ok(StubWorker {
            priority: spec.priority,
            attributes: spec.attributes,
            stack_len: spec.stack.len(),
            entry: Mutex::new(Some(spec.entry)),
            thread: Mutex::new(None),
            _stack: spec.stack,
        })
    }

    fn resume_worker(&self, handle: &StubWorker) -> Result<()> {
        let entry = handle
            .entry
            .lock()
            .unwrap()
            .take()
            .ok_or(Error::new(EINVAL))?;
        *handle.thread.lock().unwrap() = Some(std::thread::spawn(entry));
        Ok(())
    }
}

/// Spawner whose workers can never be created
pub struct FailingSpawner;

impl WorkerSpawner for FailingSpawner {
    type Handle = ();

    fn create_worker(&self, _spec: WorkerSpec) -> Result<()> {
        Err(Error::new(ENOMEM))
    }

    fn resume_worker(&self, _handle: &()) -> Result<()> {
        Ok(())
    }
}

#[test]
fn stub_validity_is_range_based() {
    let stub = StubPlatform::new();
    stub.mark_valid(VirtualAddress::new(0x1000), 0x10);

    assert!(stub.is_address_valid(VirtualAddress::new(0x1000)));
    assert!(stub.is_address_valid(VirtualAddress::new(0x100F)));
    assert!(!stub.is_address_valid(VirtualAddress::new(0x1010)));
    assert!(!stub.is_address_valid(VirtualAddress::NULL));
}
