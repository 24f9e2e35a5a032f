//! # Addresses
//! Virtual addresses are what callers and the mailbox producer hand us, physical addresses are
//! what the privileged copy primitive consumes. Neither is ever dereferenced by these types.

use core::fmt;

#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct VirtualAddress(usize);

impl VirtualAddress {
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn new(address: usize) -> Self {
        Self(address)
    }
    #[inline]
    pub const fn data(self) -> usize {
        self.0
    }
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
    /// Address `offset` bytes further, wrapping like the pointer arithmetic it replaces
    #[inline]
    pub const fn add(self, offset: usize) -> Self {
        Self(self.0.wrapping_add(offset))
    }
    #[inline]
    pub const fn sub(self, offset: usize) -> Self {
        Self(self.0.wrapping_sub(offset))
    }
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[virt {:#010x}]", self.0)
    }
}

#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct PhysicalAddress(usize);

impl PhysicalAddress {
    #[inline]
    pub const fn new(address: usize) -> Self {
        Self(address)
    }
    #[inline]
    pub const fn data(self) -> usize {
        self.0
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[phys {:#010x}]", self.0)
    }
}
