//! Device side of the link.
//!
//! The firmware loop that receives command lines and drives the PWM outputs,
//! written against small traits so it runs on a host as well.

pub mod command_loop;
pub mod pwm;
pub mod source;

pub use command_loop::{CommandLoop, Flow, InputErrors, ShutdownReason};
pub use pwm::{PwmOutput, SimulatedPwm};
pub use source::{LineEvent, LineSource, ScriptedLines, SerialLineSource};
