pub use hal::prelude::*;

pub use crate::cpu::Core as _at90usb_hal_cpu_Core;
pub use crate::event::EventLog as _at90usb_hal_event_EventLog;
pub use crate::panel::Display as _at90usb_hal_panel_Display;
pub use crate::panel::Quiesce as _at90usb_hal_panel_Quiesce;
pub use crate::register::Register as _at90usb_hal_register_Register;
pub use crate::register::WideRegister as _at90usb_hal_register_WideRegister;
pub use crate::time::Counter as _at90usb_hal_time_Counter;
