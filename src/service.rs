//! Background service turning mailbox commands into privileged word writes

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::bridge::KernelBridge;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::mailbox::Mailbox;
use crate::memory::VirtualAddress;
use crate::platform::{Platform, WorkerSpawner, WorkerSpec, WorkerStack};
use crate::stats::Counter;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PollOutcome {
    /// No valid destination was posted
    Idle,
    /// A command was carried out and the slot was freed
    Written {
        destination: VirtualAddress,
        value: u32,
    },
}

pub struct Poller<P> {
    bridge: Arc<KernelBridge<P>>,
    mailbox: Mailbox,
    shutdown: Arc<AtomicBool>,
}

impl<P: Platform> Poller<P> {
    pub fn new(bridge: Arc<KernelBridge<P>>, mailbox: Mailbox) -> Self {
        Self {
            bridge,
            mailbox,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn poll_once(&self) -> Result<PollOutcome> {
        let destination = self.mailbox.destination();

        // Zero and garbage addresses are the idle state
        if !self.bridge.platform().is_address_valid(destination) {
            return Ok(PollOutcome::Idle);
        }

        let value = self.mailbox.value();
        self.bridge.write_word(destination, value)?;
        self.mailbox.consume();

        self.bridge.kernel_copy().stats().add(Counter::Command);
        log::trace!("mailbox: wrote {:#010x} to {:?}", value, destination);

        Ok(PollOutcome::Written { destination, value })
    }

    /// Busy-poll until the shutdown flag is raised. A fault from the write path ends the loop and
    /// leaves the command in the mailbox.
    pub fn run(&self) -> Result<()> {
        while !self.shutdown.load(Ordering::Acquire) {
            self.poll_once()?;
            core::hint::spin_loop();
        }
        Ok(())
    }
}

pub struct ServiceHandle<H> {
    worker: H,
    shutdown: Arc<AtomicBool>,
}

impl<H> ServiceHandle<H> {
    pub fn worker(&self) -> &H {
        &self.worker
    }

    /// Ask the poller to return after its current iteration
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
        log::info!("kernel copy service: stop requested");
    }

    pub fn is_stopping(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// Start the poller on the mailbox at `config.mailbox`.
///
/// # Safety
/// `config.mailbox` must satisfy [`Mailbox::from_address`].
pub unsafe fn start_service<P, W>(
    bridge: Arc<KernelBridge<P>>,
    spawner: &W,
    config: &ServiceConfig,
) -> ServiceHandle<W::Handle>
where
    P: Platform + 'static,
    W: WorkerSpawner,
{
    let mailbox = unsafe { Mailbox::from_address(config.mailbox) };
    start_with_mailbox(bridge, spawner, mailbox, config)
}

/// Start the poller on a dedicated worker. Failing to get a stack or a worker is fatal.
pub fn start_with_mailbox<P, W>(
    bridge: Arc<KernelBridge<P>>,
    spawner: &W,
    mailbox: Mailbox,
    config: &ServiceConfig,
) -> ServiceHandle<W::Handle>
where
    P: Platform + 'static,
    W: WorkerSpawner,
{
    let platform = bridge.platform();

    let stack = WorkerStack::new(config.stack_size, config.stack_align).unwrap_or_else(|err| {
        platform.fatal(format_args!("Kernel copy thread stack not allocated: {}", err))
    });

    let poller = Poller::new(Arc::clone(&bridge), mailbox);
    let shutdown = poller.shutdown_flag();

    let spec = WorkerSpec {
        entry: Box::new(move || {
            if let Err(err) = poller.run() {
                log::error!("kernel copy service stopped: {}", err);
            }
        }),
        stack,
        priority: config.priority,
        attributes: config.attributes,
    };

    let worker = spawner
        .create_worker(spec)
        .unwrap_or_else(|err| platform.fatal(format_args!("Creating kernel copy thread: {}", err)));
    if let Err(err) = spawner.resume_worker(&worker) {
        platform.fatal(format_args!("Resuming kernel copy thread: {}", err));
    }

    log::info!(
        "kernel copy service: polling {:?} at priority {}",
        mailbox.record() as *const _,
        config.priority
    );

    ServiceHandle { worker, shutdown }
}
