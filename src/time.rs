//! Free running tick counter

use core::cell::Cell;

use bare_metal::{CriticalSection, Mutex};

use crate::cpu::Core;
use crate::interrupt;

/// Source of the free running 32-bit counter stamped into the event log
///
/// The counter wraps silently.
pub trait Counter {
    fn counter(&self) -> u32;
}

impl<'a, T> Counter for &'a T
where
    T: Counter,
{
    fn counter(&self) -> u32 {
        (**self).counter()
    }
}

/// Tick counter advanced from a periodic interrupt
///
/// Four byte accesses make up one read on this core, so foreground reads happen inside a
/// critical section.
pub struct TickCounter<C> {
    core: C,
    ticks: Mutex<Cell<u32>>,
}

impl<C> TickCounter<C>
where
    C: Core,
{
    pub const fn new(core: C) -> Self {
        TickCounter {
            core,
            ticks: Mutex::new(Cell::new(0)),
        }
    }

    /// Advances the counter by one, called from the timer interrupt
    pub fn tick(&self, cs: CriticalSection<'_>) {
        let ticks = self.ticks.borrow(cs);
        ticks.set(ticks.get().wrapping_add(1));
    }

    /// Overwrites the counter
    pub fn reset(&self, value: u32) {
        interrupt::free(&self.core, |cs| self.ticks.borrow(cs).set(value))
    }
}

impl<C> Counter for TickCounter<C>
where
    C: Core,
{
    fn counter(&self) -> u32 {
        interrupt::free(&self.core, |cs| self.ticks.borrow(cs).get())
    }
}

/// A measurement of the tick counter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instant {
    now: u32,
}

impl Instant {
    /// Returns an `Instant` corresponding to "now"
    pub fn now<T>(counter: &T) -> Self
    where
        T: Counter,
    {
        Instant {
            now: counter.counter(),
        }
    }

    /// Ticks elapsed since the `Instant` was created
    pub fn elapsed<T>(&self, counter: &T) -> u32
    where
        T: Counter,
    {
        counter.counter().wrapping_sub(self.now)
    }

    /// Raw counter value
    pub fn ticks(&self) -> u32 {
        self.now
    }
}
