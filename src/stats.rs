use core::sync::atomic::{AtomicUsize, Ordering};

/// Counters kept by a bridge. Only updated with the `stats` feature.
#[derive(Debug, Default)]
pub struct BridgeStats {
    /// Number of fixed-size privileged copies
    copies: AtomicUsize,
    /// Number of large privileged copies
    large_copies: AtomicUsize,
    /// Number of words read through the privileged copy
    copy_reads: AtomicUsize,
    /// Number of words read through the direct kernel read
    direct_reads: AtomicUsize,
    /// Number of mailbox commands consumed
    commands: AtomicUsize,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BridgeStatsData {
    pub copies: usize,
    pub large_copies: usize,
    pub copy_reads: usize,
    pub direct_reads: usize,
    pub commands: usize,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Counter {
    Copy,
    LargeCopy,
    CopyRead,
    DirectRead,
    Command,
}

impl BridgeStats {
    pub const fn new() -> Self {
        Self {
            copies: AtomicUsize::new(0),
            large_copies: AtomicUsize::new(0),
            copy_reads: AtomicUsize::new(0),
            direct_reads: AtomicUsize::new(0),
            commands: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub(crate) fn add(&self, counter: Counter) {
        if cfg!(not(feature = "stats")) {
            return;
        }

        match counter {
            Counter::Copy => self.copies.fetch_add(1, Ordering::Relaxed),
            Counter::LargeCopy => self.large_copies.fetch_add(1, Ordering::Relaxed),
            Counter::CopyRead => self.copy_reads.fetch_add(1, Ordering::Relaxed),
            Counter::DirectRead => self.direct_reads.fetch_add(1, Ordering::Relaxed),
            Counter::Command => self.commands.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn snapshot(&self) -> BridgeStatsData {
        BridgeStatsData {
            copies: self.copies.load(Ordering::Relaxed),
            large_copies: self.large_copies.load(Ordering::Relaxed),
            copy_reads: self.copy_reads.load(Ordering::Relaxed),
            direct_reads: self.direct_reads.load(Ordering::Relaxed),
            commands: self.commands.load(Ordering::Relaxed),
        }
    }
}
