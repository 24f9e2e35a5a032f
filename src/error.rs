//! errno-style errors returned by the platform primitives

pub use syscall::error::{Error, Result, EFAULT, EINVAL, ENOMEM};
