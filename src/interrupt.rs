//! Interrupt-safe critical sections
//!
//! A critical section saves the complete status register, clears the global interrupt enable
//! bit and, once it ends, writes the saved value back verbatim. Re-enabling interrupts
//! unconditionally instead would turn them on inside an enclosing critical section, or inside
//! an interrupt handler.

use core::fmt;

use bare_metal::CriticalSection;

use crate::cpu::Core;

/// Snapshot of the AVR status register (`SREG`)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Sreg(u8);

impl Sreg {
    /// Global interrupt enable
    pub const I: u8 = 1 << 7;
    /// Bit copy storage
    pub const T: u8 = 1 << 6;
    /// Half carry
    pub const H: u8 = 1 << 5;
    /// Sign
    pub const S: u8 = 1 << 4;
    /// Two's complement overflow
    pub const V: u8 = 1 << 3;
    /// Negative
    pub const N: u8 = 1 << 2;
    /// Zero
    pub const Z: u8 = 1 << 1;
    /// Carry
    pub const C: u8 = 1 << 0;

    pub const fn from_bits(bits: u8) -> Self {
        Sreg(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the global interrupt enable bit is set
    pub const fn interrupts_enabled(self) -> bool {
        self.0 & Self::I != 0
    }
}

impl fmt::Debug for Sreg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sreg({:#010b})", self.0)
    }
}

/// Scoped critical section
///
/// Saves the status register and disables interrupts when created, restores the saved status
/// register when dropped.
pub struct InterruptGuard<'a, C>
where
    C: Core,
{
    core: &'a C,
    saved: Sreg,
}

impl<'a, C> InterruptGuard<'a, C>
where
    C: Core,
{
    #[inline(always)]
    pub fn new(core: &'a C) -> Self {
        let saved = core.sreg();
        core.disable_interrupts();

        InterruptGuard { core, saved }
    }

    /// Token for register accesses that need interrupts disabled
    #[inline(always)]
    pub fn critical_section(&self) -> CriticalSection<'_> {
        // NOTE(unsafe) interrupts stay disabled for as long as the guard is borrowed
        unsafe { CriticalSection::new() }
    }

    /// Status register as it was before the guard was created
    pub fn saved(&self) -> Sreg {
        self.saved
    }

    /// Ends the critical section in sleep, then restores the saved status register
    ///
    /// Runs `sei; sleep`, so an interrupt already pending still wakes the core. The sleep
    /// enable latch is cleared on wake, before the status register is written back. Taking
    /// the guard by value ends every token it handed out.
    ///
    /// ```compile_fail
    /// # use at90usb_hal::cpu::Core;
    /// # use at90usb_hal::interrupt::InterruptGuard;
    /// fn stale_token<C: Core>(core: &C) {
    ///     let guard = InterruptGuard::new(core);
    ///     let cs = guard.critical_section();
    ///     guard.sleep();
    ///     drop(cs);
    /// }
    /// ```
    pub fn sleep(self) {
        // NOTE(unsafe) `new` disabled interrupts and `self` is consumed, so no token survives
        unsafe { self.core.enable_interrupts_and_sleep() };
        self.core.sleep_disable();
    }
}

impl<'a, C> Drop for InterruptGuard<'a, C>
where
    C: Core,
{
    #[inline(always)]
    fn drop(&mut self) {
        // NOTE(unsafe) every token handed out borrowed `self`, so none outlives this point
        unsafe { self.core.restore_sreg(self.saved) }
    }
}

/// Executes `f` with interrupts disabled
#[inline(always)]
pub fn free<C, F, R>(core: &C, f: F) -> R
where
    C: Core,
    F: FnOnce(CriticalSection<'_>) -> R,
{
    let guard = InterruptGuard::new(core);

    f(guard.critical_section())
}
