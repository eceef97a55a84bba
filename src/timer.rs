//! 16-bit timer used as the `ClockWait` wake source
//!
//! The timer counts edges on its external clock pin (`Tn`) in CTC mode and raises a compare
//! match A interrupt once the counter reaches `OCRnA`.

use crate::cpu::Core;
use crate::register::{
    read_wide_register, write_wide_register, Reg16, Reg8, Register, WideRegister,
};

/// `TIMSKn`: output compare A match interrupt enable
pub const OCIEA: u8 = 1 << 1;

/// `TCCRnB`: CTC mode (`WGMn2`), clocked by rising edges on `Tn` (`CSn2:0` = 0b111)
pub const TCCRB_CTC_EXTERNAL_RISING: u8 = 0x0F;

/// 16-bit timer/counter
pub struct Timer16<R8, R16> {
    tccra: R8,
    tccrb: R8,
    timsk: R8,
    tcnt: R16,
    ocra: R16,
}

/// Timer/counter 3 of the AT90USB128x
pub type Timer3 = Timer16<Reg8, Reg16>;

impl Timer3 {
    /// Timer/counter 3 at its fixed addresses
    ///
    /// # Safety
    ///
    /// Only one instance may exist and nothing else may drive timer/counter 3
    pub unsafe fn timer3() -> Self {
        Timer16 {
            tccra: Reg8::new(0x90),
            tccrb: Reg8::new(0x91),
            timsk: Reg8::new(0x71),
            tcnt: Reg16::new(0x94),
            ocra: Reg16::new(0x98),
        }
    }
}

impl<R8, R16> Timer16<R8, R16>
where
    R8: Register,
    R16: WideRegister<Value = u16>,
{
    pub fn new(tccra: R8, tccrb: R8, timsk: R8, tcnt: R16, ocra: R16) -> Self {
        Timer16 {
            tccra,
            tccrb,
            timsk,
            tcnt,
            ocra,
        }
    }

    /// Fires the compare match A interrupt after `threshold - start` external clock edges
    ///
    /// The counter is loaded before the clock source is selected so no edge gets counted
    /// from a stale value.
    pub fn arm_external_compare<C>(&mut self, core: &C, threshold: u16, start: u16)
    where
        C: Core,
    {
        write_wide_register(core, &self.ocra, threshold);
        write_wide_register(core, &self.tcnt, start);
        self.tccra.write(0);
        self.timsk.write(OCIEA);
        self.tccrb.write(TCCRB_CTC_EXTERNAL_RISING);
    }

    /// Masks the compare interrupt and stops the clock
    pub fn disarm(&mut self) {
        self.timsk.write(0);
        self.tccrb.write(0);
    }

    /// Whether the compare match interrupt is unmasked
    pub fn is_armed(&self) -> bool {
        self.timsk.read() & OCIEA != 0
    }

    /// Current count
    pub fn count<C>(&self, core: &C) -> u16
    where
        C: Core,
    {
        read_wide_register(core, &self.tcnt)
    }

    /// Releases the registers
    pub fn free(self) -> (R8, R8, R8, R16, R16) {
        (self.tccra, self.tccrb, self.timsk, self.tcnt, self.ocra)
    }
}
