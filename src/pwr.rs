//! Power management
//!
//! Both sleep flows run the same steps: switch the front panel off, arm the wake source, sleep,
//! undo the arming and light the awake LED.
//!
//! ```text
//!   quiesce -> arm -> suspend -> resume -> restore
//! ```
//!
//! Only [`SleepPolicy::ClockWait`] arms anything, the timer that counts terminal clock edges.
//! [`SleepPolicy::CardPresence`] relies on the card detect pin interrupt the application already
//! has enabled.

use cast::u32;
use log::{debug, trace};

use crate::cpu::{Core, SleepMode};
use crate::event::{self, EventLog};
use crate::interrupt::InterruptGuard;
use crate::panel::Quiesce;
use crate::register::{Register, WideRegister};
use crate::time::Counter;
use crate::timer::Timer16;

/// What wakes the device up again
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepPolicy {
    /// Terminal clock edges counted by the wake timer, peripherals keep running
    ClockWait,
    /// Card insertion or removal, everything but the pin interrupt is powered down
    CardPresence,
}

impl SleepPolicy {
    /// Mode the core sleeps in under this policy
    pub fn sleep_mode(self) -> SleepMode {
        match self {
            // the wake timer needs its clock
            SleepPolicy::ClockWait => SleepMode::Idle,
            SleepPolicy::CardPresence => SleepMode::PowerDown,
        }
    }
}

/// Wake timer configuration
#[derive(Clone, Copy, Debug)]
pub struct Config {
    wake_threshold: u16,
    wake_start: u16,
}

impl Config {
    /// Set the compare value the wake timer counts up to
    pub fn wake_threshold(mut self, wake_threshold: u16) -> Self {
        self.wake_threshold = wake_threshold;
        self
    }

    /// Set the count the wake timer starts from
    ///
    /// Starting above zero keeps the first edge after arming from matching right away.
    pub fn wake_start(mut self, wake_start: u16) -> Self {
        self.wake_start = wake_start;
        self
    }

    /// Terminal clock edges between arming and the wake interrupt
    ///
    /// Zero for a start count at or above the threshold, which `Pwr::new` rejects.
    pub fn edges_to_wake(&self) -> u32 {
        u32(self.wake_threshold).saturating_sub(u32(self.wake_start))
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            wake_threshold: 100,
            wake_start: 1,
        }
    }
}

/// Sleep sequencer
pub struct Pwr<CORE, R8, R16, CNT> {
    core: CORE,
    timer: Timer16<R8, R16>,
    counter: CNT,
    config: Config,
}

impl<CORE, R8, R16, CNT> Pwr<CORE, R8, R16, CNT>
where
    CORE: Core,
    R8: Register,
    R16: WideRegister<Value = u16>,
    CNT: Counter,
{
    /// Takes the core, the wake timer and the counter stamped into wake records
    ///
    /// Panics if the configured start count does not lie below the threshold.
    pub fn new(core: CORE, timer: Timer16<R8, R16>, counter: CNT, config: Config) -> Self {
        assert!(
            config.wake_start < config.wake_threshold,
            "wake timer would never match"
        );

        Pwr {
            core,
            timer,
            counter,
            config,
        }
    }

    /// Sleeps under `policy`
    ///
    /// Returns once the wake source fired. Only LED4 is lit afterwards, the display and the
    /// other LEDs are left for the caller to turn back on. `logger` only receives the wake time
    /// under [`SleepPolicy::ClockWait`].
    pub fn sleep<P, L>(&mut self, policy: SleepPolicy, panel: &mut P, logger: Option<&mut L>)
    where
        P: Quiesce,
        L: EventLog,
    {
        match policy {
            SleepPolicy::ClockWait => self.sleep_until_terminal_clock(panel, logger),
            SleepPolicy::CardPresence => self.sleep_until_card_inserted(panel),
        }
    }

    /// Sleeps until the terminal has clocked the wake timer up to its threshold, then logs the
    /// wake time
    pub fn sleep_until_terminal_clock<P, L>(&mut self, panel: &mut P, logger: Option<&mut L>)
    where
        P: Quiesce,
        L: EventLog,
    {
        let policy = SleepPolicy::ClockWait;
        debug!("sleeping until {} terminal clock edges", self.config.edges_to_wake());

        let display = panel.quiesce();
        trace!("display was {:?}", display);

        self.timer.arm_external_compare(
            &self.core,
            self.config.wake_threshold,
            self.config.wake_start,
        );

        self.suspend(policy.sleep_mode());
        self.timer.disarm();

        panel.signal_awake();
        debug!("woken by terminal clock");

        if let Err(e) = event::log_current_time(logger, &self.counter) {
            debug!("wake time not logged: {:?}", e);
        }
    }

    /// Sleeps in power down until the card detect interrupt fires
    pub fn sleep_until_card_inserted<P>(&mut self, panel: &mut P)
    where
        P: Quiesce,
    {
        let policy = SleepPolicy::CardPresence;
        debug!("sleeping until card presence changes");

        let display = panel.quiesce();
        trace!("display was {:?}", display);

        self.suspend(policy.sleep_mode());

        panel.signal_awake();
        debug!("woken by card presence change");
    }

    /// Wake timer configuration in use
    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases the core, the wake timer and the counter
    pub fn free(self) -> (CORE, Timer16<R8, R16>, CNT) {
        (self.core, self.timer, self.counter)
    }

    fn suspend(&self, mode: SleepMode) {
        self.core.set_sleep_mode(mode);

        let guard = InterruptGuard::new(&self.core);
        self.core.sleep_enable();
        guard.sleep();
    }
}
