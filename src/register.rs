//! Memory mapped registers
//!
//! 8-bit registers are read and written with a single instruction and need no protection.
//! 16-bit registers take two byte accesses that go through the shared `TEMP` latch of the
//! timers, so an interrupt handler running between them sees, or produces, a torn value.
//! Their raw accessors therefore demand a [`CriticalSection`], and the functions at the bottom
//! of this module open one around a single access.

use core::ptr;

use bare_metal::CriticalSection;

use crate::cpu::Core;
use crate::interrupt;

/// Register accessed with a single instruction
pub trait Register {
    /// Reads the register
    fn read(&self) -> u8;

    /// Writes the register
    fn write(&self, value: u8);

    /// Read-modify-write, not atomic
    fn modify<F>(&self, f: F)
    where
        F: FnOnce(u8) -> u8,
    {
        self.write(f(self.read()))
    }
}

/// Register wider than a single access
pub trait WideRegister {
    /// Register value
    type Value: Copy;

    /// Reads the register, one part at a time
    fn read(&self, cs: CriticalSection<'_>) -> Self::Value;

    /// Writes the register, one part at a time
    fn write(&self, cs: CriticalSection<'_>, value: Self::Value);
}

/// 8-bit memory mapped register
#[derive(Debug)]
pub struct Reg8 {
    addr: usize,
}

impl Reg8 {
    /// # Safety
    ///
    /// `addr` must be the data space address of an 8-bit register
    pub const unsafe fn new(addr: usize) -> Self {
        Reg8 { addr }
    }
}

impl Register for Reg8 {
    #[inline(always)]
    fn read(&self) -> u8 {
        // NOTE(unsafe) `new` requires a valid register address
        unsafe { ptr::read_volatile(self.addr as *const u8) }
    }

    #[inline(always)]
    fn write(&self, value: u8) {
        // NOTE(unsafe) `new` requires a valid register address
        unsafe { ptr::write_volatile(self.addr as *mut u8, value) }
    }
}

/// 16-bit memory mapped register, low byte at the lower address
#[derive(Debug)]
pub struct Reg16 {
    addr: usize,
}

impl Reg16 {
    /// # Safety
    ///
    /// `addr` must be the data space address of the low byte of a 16-bit register
    pub const unsafe fn new(addr: usize) -> Self {
        Reg16 { addr }
    }
}

impl WideRegister for Reg16 {
    type Value = u16;

    #[inline(always)]
    fn read(&self, _cs: CriticalSection<'_>) -> u16 {
        let low = self.addr as *const u8;
        // NOTE(unsafe) `new` requires a valid register address. Reading the low byte latches
        // the high byte into TEMP, so the low byte goes first.
        unsafe {
            let lo = ptr::read_volatile(low);
            let hi = ptr::read_volatile(low.add(1));
            u16::from_le_bytes([lo, hi])
        }
    }

    #[inline(always)]
    fn write(&self, _cs: CriticalSection<'_>, value: u16) {
        let low = self.addr as *mut u8;
        let [lo, hi] = value.to_le_bytes();
        // NOTE(unsafe) `new` requires a valid register address. The high byte lands in TEMP
        // and is committed together with the low byte, so the high byte goes first.
        unsafe {
            ptr::write_volatile(low.add(1), hi);
            ptr::write_volatile(low, lo);
        }
    }
}

/// Writes `value` to `reg` with interrupts disabled
#[inline(always)]
pub fn write_wide_register<C, R>(core: &C, reg: &R, value: R::Value)
where
    C: Core,
    R: WideRegister,
{
    interrupt::free(core, |cs| reg.write(cs, value))
}

/// Reads `reg` with interrupts disabled
#[inline(always)]
pub fn read_wide_register<C, R>(core: &C, reg: &R) -> R::Value
where
    C: Core,
    R: WideRegister,
{
    interrupt::free(core, |cs| reg.read(cs))
}

/// Reads `reg`, applies `f` and writes the result back in one critical section
///
/// Keep `f` short, interrupts stay disabled while it runs.
#[inline(always)]
pub fn modify_wide_register<C, R, F>(core: &C, reg: &R, f: F)
where
    C: Core,
    R: WideRegister,
    F: FnOnce(R::Value) -> R::Value,
{
    interrupt::free(core, |cs| {
        let value = reg.read(cs);
        reg.write(cs, f(value));
    })
}
