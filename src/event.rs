//! Event log glue

use crate::time::Counter;

/// Event log error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A required argument was missing
    InvalidParameter,
    #[doc(hidden)]
    _Extensible,
}

/// Category of an event log record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogTag {
    /// Relative time stamp, four bytes of the free running counter
    TimeGeneral,
    #[doc(hidden)]
    _Extensible,
}

/// Append-only event log
pub trait EventLog {
    /// Appends a record carrying four data bytes
    fn log_byte4(&mut self, tag: LogTag, b0: u8, b1: u8, b2: u8, b3: u8);
}

impl<'a, L> EventLog for &'a mut L
where
    L: EventLog,
{
    fn log_byte4(&mut self, tag: LogTag, b0: u8, b1: u8, b2: u8, b3: u8) {
        (**self).log_byte4(tag, b0, b1, b2, b3)
    }
}

/// Writes the current counter value to `logger`, low byte first
pub fn log_current_time<L, T>(logger: Option<&mut L>, counter: &T) -> Result<(), Error>
where
    L: EventLog,
    T: Counter,
{
    let logger = logger.ok_or(Error::InvalidParameter)?;

    let [b0, b1, b2, b3] = counter.counter().to_le_bytes();
    logger.log_byte4(LogTag::TimeGeneral, b0, b1, b2, b3);

    Ok(())
}
