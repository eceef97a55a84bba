//! Processor core primitives

use crate::interrupt::Sreg;

/// Sleep modes selectable through the `SM[2:0]` bits of `SMCR`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepMode {
    /// CPU halted, clocks and peripherals keep running
    Idle,
    /// ADC noise reduction
    AdcNoiseReduction,
    /// Oscillator stopped, only asynchronous wake sources work
    PowerDown,
    /// Power down with the asynchronous timer running
    PowerSave,
    /// Power down with the oscillator kept running
    Standby,
    /// Power save with the oscillator kept running
    ExtendedStandby,
}

impl SleepMode {
    /// `SM[2:0]` encoding of the mode
    pub fn bits(self) -> u8 {
        match self {
            SleepMode::Idle => 0b000,
            SleepMode::AdcNoiseReduction => 0b001,
            SleepMode::PowerDown => 0b010,
            SleepMode::PowerSave => 0b011,
            SleepMode::Standby => 0b110,
            SleepMode::ExtendedStandby => 0b111,
        }
    }
}

/// `SMCR` sleep enable bit
pub const SMCR_SE: u8 = 1 << 0;
/// `SMCR` sleep mode field
pub const SMCR_SM_MASK: u8 = 0b1110;

/// Applies `mode` to an `SMCR` value, leaving the sleep enable latch untouched
pub fn smcr_with_mode(smcr: u8, mode: SleepMode) -> u8 {
    (smcr & !SMCR_SM_MASK) | (mode.bits() << 1)
}

/// Instructions and core registers the rest of the crate needs from the processor
///
/// The status register is handled as a whole: it carries the flags of the last arithmetic
/// operation next to the global interrupt enable bit, and all of them have to survive a
/// critical section.
///
/// # Safety
///
/// [`InterruptGuard`](crate::interrupt::InterruptGuard) hands out `CriticalSection` tokens on
/// the strength of `disable_interrupts`. An implementation must really keep every interrupt
/// handler from running until the status register is written back with `I` set.
pub unsafe trait Core {
    /// Reads the whole status register
    fn sreg(&self) -> Sreg;

    /// Writes the whole status register back
    ///
    /// # Safety
    ///
    /// This can set the `I` bit. Calling it while a `CriticalSection` handed out by this core
    /// is still in use breaks the guarantee that token stands for.
    unsafe fn restore_sreg(&self, sreg: Sreg);

    /// Clears the global interrupt enable bit (`cli`)
    fn disable_interrupts(&self);

    /// Selects the mode entered by the next `sleep` instruction
    fn set_sleep_mode(&self, mode: SleepMode);

    /// Sets the sleep enable latch
    fn sleep_enable(&self);

    /// Clears the sleep enable latch
    fn sleep_disable(&self);

    /// Executes `sei` followed directly by `sleep`
    ///
    /// The instruction after `sei` always runs before a pending interrupt is serviced, so a
    /// wake interrupt that is already pending cannot slip in between the two and leave the
    /// core asleep with nothing left to wake it. Interrupts are enabled on return. Use
    /// [`InterruptGuard::sleep`](crate::interrupt::InterruptGuard::sleep) instead of calling
    /// this directly.
    ///
    /// # Safety
    ///
    /// Interrupts must be disabled on entry, and no `CriticalSection` token may be used once
    /// this returns.
    unsafe fn enable_interrupts_and_sleep(&self);
}

unsafe impl<'a, C> Core for &'a C
where
    C: Core,
{
    fn sreg(&self) -> Sreg {
        (**self).sreg()
    }

    unsafe fn restore_sreg(&self, sreg: Sreg) {
        (**self).restore_sreg(sreg)
    }

    fn disable_interrupts(&self) {
        (**self).disable_interrupts()
    }

    fn set_sleep_mode(&self, mode: SleepMode) {
        (**self).set_sleep_mode(mode)
    }

    fn sleep_enable(&self) {
        (**self).sleep_enable()
    }

    fn sleep_disable(&self) {
        (**self).sleep_disable()
    }

    unsafe fn enable_interrupts_and_sleep(&self) {
        (**self).enable_interrupts_and_sleep()
    }
}

#[cfg(target_arch = "avr")]
pub use self::avr::Avr;

#[cfg(target_arch = "avr")]
mod avr {
    use core::arch::asm;

    use super::{smcr_with_mode, Core, SleepMode, SMCR_SE};
    use crate::interrupt::Sreg;
    use crate::register::{Reg8, Register};

    // data space address of SMCR (I/O 0x33)
    const SMCR: Reg8 = unsafe { Reg8::new(0x53) };

    /// The AVR core this crate runs on
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Avr;

    unsafe impl Core for Avr {
        #[inline(always)]
        fn sreg(&self) -> Sreg {
            let sreg: u8;
            // NOTE(unsafe) reading SREG has no side effects
            unsafe {
                asm!("in {0}, 0x3F", out(reg) sreg, options(nomem, nostack, preserves_flags))
            };
            Sreg::from_bits(sreg)
        }

        #[inline(always)]
        unsafe fn restore_sreg(&self, sreg: Sreg) {
            asm!("out 0x3F, {0}", in(reg) sreg.bits(), options(nostack));
        }

        #[inline(always)]
        fn disable_interrupts(&self) {
            avr_device::interrupt::disable();
        }

        fn set_sleep_mode(&self, mode: SleepMode) {
            SMCR.modify(|smcr| smcr_with_mode(smcr, mode));
        }

        fn sleep_enable(&self) {
            SMCR.modify(|smcr| smcr | SMCR_SE);
        }

        fn sleep_disable(&self) {
            SMCR.modify(|smcr| smcr & !SMCR_SE);
        }

        #[inline(always)]
        unsafe fn enable_interrupts_and_sleep(&self) {
            // both instructions in one block so nothing gets scheduled between them
            asm!("sei", "sleep", options(nostack));
        }
    }

    /// Timer 3 compare match A, the `ClockWait` wake source
    ///
    /// Only has to exist so the wake does not end up in the default handler.
    #[cfg(feature = "rt")]
    #[avr_device::interrupt(at90usb1286)]
    fn TIMER3_COMPA() {}
}
