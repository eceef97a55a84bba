//! Front panel: the display and the four indicator LEDs

use hal::digital::OutputPin;
use void::Void;

/// Whether the display is showing anything
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayState {
    Off,
    On,
}

/// Display driver
pub trait Display {
    /// Whether a display is fitted and responding
    fn is_available(&self) -> bool;

    /// Current state as last set by the driver
    fn state(&self) -> DisplayState;

    /// Switches the display off
    fn off(&mut self);
}

/// Indicator LEDs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Led {
    Led1,
    Led2,
    Led3,
    /// Shows the device is awake and listening
    Led4,
}

/// The four indicator LEDs, lit when their pin is driven high
pub struct Indicators<L1, L2, L3, L4> {
    led1: L1,
    led2: L2,
    led3: L3,
    led4: L4,
}

impl<L1, L2, L3, L4> Indicators<L1, L2, L3, L4>
where
    L1: OutputPin<Error = Void>,
    L2: OutputPin<Error = Void>,
    L3: OutputPin<Error = Void>,
    L4: OutputPin<Error = Void>,
{
    pub fn new(led1: L1, led2: L2, led3: L3, led4: L4) -> Self {
        Indicators {
            led1,
            led2,
            led3,
            led4,
        }
    }

    /// Lights `led`
    pub fn on(&mut self, led: Led) {
        let result = match led {
            Led::Led1 => self.led1.try_set_high(),
            Led::Led2 => self.led2.try_set_high(),
            Led::Led3 => self.led3.try_set_high(),
            Led::Led4 => self.led4.try_set_high(),
        };
        result.unwrap_or_else(|e| void::unreachable(e))
    }

    /// Darkens `led`
    pub fn off(&mut self, led: Led) {
        let result = match led {
            Led::Led1 => self.led1.try_set_low(),
            Led::Led2 => self.led2.try_set_low(),
            Led::Led3 => self.led3.try_set_low(),
            Led::Led4 => self.led4.try_set_low(),
        };
        result.unwrap_or_else(|e| void::unreachable(e))
    }

    pub fn all_off(&mut self) {
        self.off(Led::Led1);
        self.off(Led::Led2);
        self.off(Led::Led3);
        self.off(Led::Led4);
    }

    /// Releases the pins
    pub fn free(self) -> (L1, L2, L3, L4) {
        (self.led1, self.led2, self.led3, self.led4)
    }
}

/// Peripherals that get switched off around a sleep
pub trait Quiesce {
    /// Switches everything off, returning the display state found beforehand
    fn quiesce(&mut self) -> DisplayState;

    /// Shows the device is awake again
    fn signal_awake(&mut self);
}

/// Display plus indicators
pub struct Panel<D, L1, L2, L3, L4> {
    pub display: D,
    pub leds: Indicators<L1, L2, L3, L4>,
}

impl<D, L1, L2, L3, L4> Panel<D, L1, L2, L3, L4>
where
    D: Display,
    L1: OutputPin<Error = Void>,
    L2: OutputPin<Error = Void>,
    L3: OutputPin<Error = Void>,
    L4: OutputPin<Error = Void>,
{
    pub fn new(display: D, leds: Indicators<L1, L2, L3, L4>) -> Self {
        Panel { display, leds }
    }
}

impl<D, L1, L2, L3, L4> Quiesce for Panel<D, L1, L2, L3, L4>
where
    D: Display,
    L1: OutputPin<Error = Void>,
    L2: OutputPin<Error = Void>,
    L3: OutputPin<Error = Void>,
    L4: OutputPin<Error = Void>,
{
    fn quiesce(&mut self) -> DisplayState {
        let state = self.display.state();
        // an absent display is never touched
        if self.display.is_available() && state == DisplayState::On {
            self.display.off();
        }
        self.leds.all_off();

        state
    }

    fn signal_awake(&mut self) {
        // the other LEDs and the display stay off until the caller turns them on
        self.leds.on(Led::Led4);
    }
}
