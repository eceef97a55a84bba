//! Host simulation of the core and its registers, for tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bare_metal::CriticalSection;

use crate::cpu::{smcr_with_mode, Core, SleepMode, SMCR_SE};
use crate::interrupt::Sreg;
use crate::register::{Register, WideRegister};

/// Observable side effect of the simulated core
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Cli,
    RestoreSreg(u8),
    SetSleepMode(SleepMode),
    SleepEnable,
    SleepDisable,
    Sleep(SleepMode),
    Interrupt,
    ReadLow(u8),
    ReadHigh(u8),
    WriteHigh(u8),
    WriteLow(u8),
    Write8(&'static str, u8),
}

pub struct SimCore {
    sreg: Cell<u8>,
    smcr: Cell<u8>,
    trace: RefCell<Vec<Op>>,
    pending: RefCell<Option<Box<dyn FnOnce()>>>,
    hardware: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl SimCore {
    pub fn with_sreg(bits: u8) -> Self {
        SimCore {
            sreg: Cell::new(bits),
            smcr: Cell::new(0),
            trace: RefCell::new(Vec::new()),
            pending: RefCell::new(None),
            hardware: RefCell::new(None),
        }
    }

    pub fn trace(&self) -> Vec<Op> {
        self.trace.borrow().clone()
    }

    pub fn clear_trace(&self) {
        self.trace.borrow_mut().clear();
    }

    pub fn smcr(&self) -> u8 {
        self.smcr.get()
    }

    /// Sets status flags behind the program's back, like an arithmetic instruction would
    pub fn set_flags(&self, bits: u8) {
        self.sreg.set(self.sreg.get() | bits);
    }

    /// Makes `isr` pending; it runs at the next instruction boundary with `I` set
    pub fn raise_interrupt<F>(&self, isr: F)
    where
        F: FnOnce() + 'static,
    {
        *self.pending.borrow_mut() = Some(Box::new(isr));
    }

    /// What the rest of the board does while the core sleeps, expected to raise an interrupt
    pub fn while_asleep<F>(&self, hardware: F)
    where
        F: FnOnce() + 'static,
    {
        *self.hardware.borrow_mut() = Some(Box::new(hardware));
    }

    /// Instruction boundary: services a pending interrupt if interrupts are enabled
    pub fn poll(&self) {
        if self.sreg.get() & Sreg::I == 0 {
            return;
        }

        let isr = self.pending.borrow_mut().take();
        if let Some(isr) = isr {
            self.record(Op::Interrupt);
            let sreg = self.sreg.get();
            self.sreg.set(sreg & !Sreg::I);
            isr();
            // reti
            self.sreg.set(self.sreg.get() | Sreg::I);
        }
    }

    fn record(&self, op: Op) {
        self.trace.borrow_mut().push(op);
    }

    fn mode(&self) -> SleepMode {
        match (self.smcr.get() >> 1) & 0b111 {
            0b000 => SleepMode::Idle,
            0b001 => SleepMode::AdcNoiseReduction,
            0b010 => SleepMode::PowerDown,
            0b011 => SleepMode::PowerSave,
            0b110 => SleepMode::Standby,
            0b111 => SleepMode::ExtendedStandby,
            bits => panic!("reserved sleep mode {:#05b}", bits),
        }
    }
}

unsafe impl Core for SimCore {
    fn sreg(&self) -> Sreg {
        Sreg::from_bits(self.sreg.get())
    }

    unsafe fn restore_sreg(&self, sreg: Sreg) {
        self.record(Op::RestoreSreg(sreg.bits()));
        self.sreg.set(sreg.bits());
        self.poll();
    }

    fn disable_interrupts(&self) {
        self.record(Op::Cli);
        self.sreg.set(self.sreg.get() & !Sreg::I);
    }

    fn set_sleep_mode(&self, mode: SleepMode) {
        self.record(Op::SetSleepMode(mode));
        self.smcr.set(smcr_with_mode(self.smcr.get(), mode));
    }

    fn sleep_enable(&self) {
        self.record(Op::SleepEnable);
        self.smcr.set(self.smcr.get() | SMCR_SE);
    }

    fn sleep_disable(&self) {
        self.record(Op::SleepDisable);
        self.smcr.set(self.smcr.get() & !SMCR_SE);
    }

    unsafe fn enable_interrupts_and_sleep(&self) {
        assert!(self.sreg.get() & Sreg::I == 0, "sei+sleep with interrupts enabled");
        self.sreg.set(self.sreg.get() | Sreg::I);

        // `sleep` without SE is a no-op
        if self.smcr.get() & SMCR_SE == 0 {
            self.poll();
            return;
        }

        self.record(Op::Sleep(self.mode()));
        if self.pending.borrow().is_none() {
            let hardware = self.hardware.borrow_mut().take();
            if let Some(hardware) = hardware {
                hardware();
            }
        }
        assert!(
            self.pending.borrow().is_some(),
            "no wake source fired, the core would sleep forever"
        );
        self.poll();
    }
}

/// 16-bit register offering an interrupt window between its two byte accesses
#[derive(Clone)]
pub struct SimReg16 {
    core: Rc<SimCore>,
    bytes: Rc<[Cell<u8>; 2]>,
}

impl SimReg16 {
    pub fn new(core: &Rc<SimCore>) -> Self {
        SimReg16 {
            core: core.clone(),
            bytes: Rc::new([Cell::new(0), Cell::new(0)]),
        }
    }

    /// Current contents, without going through the core
    pub fn peek(&self) -> u16 {
        u16::from_le_bytes([self.bytes[0].get(), self.bytes[1].get()])
    }

    /// Sets the contents the way the hardware would, e.g. a counter increment
    pub fn poke(&self, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.bytes[0].set(lo);
        self.bytes[1].set(hi);
    }
}

impl WideRegister for SimReg16 {
    type Value = u16;

    fn read(&self, _cs: CriticalSection<'_>) -> u16 {
        let lo = self.bytes[0].get();
        self.core.record(Op::ReadLow(lo));
        self.core.poll();
        let hi = self.bytes[1].get();
        self.core.record(Op::ReadHigh(hi));

        u16::from_le_bytes([lo, hi])
    }

    fn write(&self, _cs: CriticalSection<'_>, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.core.record(Op::WriteHigh(hi));
        self.bytes[1].set(hi);
        self.core.poll();
        self.core.record(Op::WriteLow(lo));
        self.bytes[0].set(lo);
    }
}

/// 8-bit register recording its writes
#[derive(Clone)]
pub struct SimReg8 {
    core: Rc<SimCore>,
    name: &'static str,
    value: Rc<Cell<u8>>,
}

impl SimReg8 {
    pub fn new(core: &Rc<SimCore>, name: &'static str) -> Self {
        SimReg8 {
            core: core.clone(),
            name,
            value: Rc::new(Cell::new(0)),
        }
    }

    pub fn peek(&self) -> u8 {
        self.value.get()
    }
}

impl Register for SimReg8 {
    fn read(&self) -> u8 {
        self.value.get()
    }

    fn write(&self, value: u8) {
        self.core.record(Op::Write8(self.name, value));
        self.value.set(value);
    }
}

unsafe impl<C> Core for Rc<C>
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
