//! Power management primitives for AT90USB128x microcontrollers
//!
//! Two pieces make up this crate:
//!
//! - an atomic accessor for the 16-bit timer registers, which the 8-bit core can only reach one
//!   byte at a time ([`register`])
//! - a sleep sequencer that quiesces the front panel, arms a wake source, parks the core and
//!   restores a minimal awake state ([`pwr`])
//!
//! Everything that touches the processor goes through the [`cpu::Core`] trait. On AVR targets
//! [`cpu::Avr`] implements it with the real instructions.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]
#![cfg_attr(all(target_arch = "avr", feature = "rt"), feature(abi_avr_interrupt))]

pub extern crate embedded_hal as hal;

#[cfg(target_arch = "avr")]
pub extern crate avr_device;

pub use bare_metal::CriticalSection;

pub mod cpu;
pub mod event;
pub mod interrupt;
pub mod panel;
pub mod prelude;
pub mod pwr;
pub mod register;
pub mod time;
pub mod timer;

#[cfg(test)]
mod sim;
