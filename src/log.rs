use alloc::collections::VecDeque;
use core::fmt::{self, Write};
use spin::{Mutex, Once};

pub static LOG: Mutex<Option<Log>> = Mutex::new(None);

const LOG_SIZE: usize = 64 * 1024;

pub fn init() {
    let mut log = LOG.lock();
    if log.is_none() {
        *log = Some(Log::new(LOG_SIZE));
    }
}

pub struct Log {
    data: VecDeque<u8>,
    size: usize,
}

impl Log {
    pub fn new(size: usize) -> Log {
        Log {
            data: VecDeque::with_capacity(size),
            size,
        }
    }

    pub fn read(&self) -> (&[u8], &[u8]) {
        self.data.as_slices()
    }

    pub fn write(&mut self, buf: &[u8]) {
        for &b in buf {
            while self.data.len() + 1 >= self.size {
                self.data.pop_front();
            }
            self.data.push_back(b);
        }
    }
}

impl Write for Log {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}

struct BridgeLogger;

impl ::log::Log for BridgeLogger {
    fn enabled(&self, metadata: &::log::Metadata<'_>) -> bool {
        metadata.level() <= ::log::max_level()
    }
    fn log(&self, record: &::log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(ref mut log) = *LOG.lock() {
            let _ = writeln!(log, "{} {}: {}", record.level(), record.target(), record.args());
        }
    }
    fn flush(&self) {}
}

static LOGGER: BridgeLogger = BridgeLogger;
static LOGGER_INIT: Once<bool> = Once::new();

/// Route `log` records into [`LOG`]. Returns false if another logger was installed first.
pub fn init_logger(level: ::log::LevelFilter) -> bool {
    init();
    let installed = *LOGGER_INIT.call_once(|| ::log::set_logger(&LOGGER).is_ok());
    if installed {
        ::log::set_max_level(level);
        ::log::info!("Logger initialized.");
    }
    installed
}
