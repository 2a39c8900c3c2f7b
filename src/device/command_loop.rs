//! Firmware command loop.
//!
//! A single-threaded polling loop: check for a line without blocking, apply
//! it, repeat. Bad lines are dropped without any reply to the sender.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::config::{BOOT_HUMIDITY, BOOT_TEMPERATURE, PWM_FREQUENCY_HZ};
use crate::device::pwm::PwmOutput;
use crate::device::source::{LineEvent, LineSource};
use crate::protocol::{Command, duty_from_percent, parse_line};

/// Whether the loop keeps running after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// `exit_program` was received.
    ExitCommand,
    /// The operator interrupted the loop.
    Interrupted,
    /// A finite source ran out of lines.
    InputClosed,
}

/// Read failures seen by [`CommandLoop::run`].
///
/// A source that keeps failing is reported once at warn level; the repeats
/// go to debug until a poll succeeds again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputErrors {
    /// Every failed poll.
    pub total: usize,
    /// Failures logged at warn level, one per run of consecutive failures.
    pub reported: usize,
    failing: bool,
}

impl InputErrors {
    fn record(&mut self, error: &io::Error) {
        self.total += 1;
        if self.failing {
            debug!(error = %error, "Input read failed again");
        } else {
            warn!(error = %error, "Input read failed");
            self.failing = true;
            self.reported += 1;
        }
    }

    fn recovered(&mut self) {
        if self.failing {
            info!(failures = self.total, "Input readable again");
            self.failing = false;
        }
    }

    /// Whether the last poll failed.
    pub fn is_failing(&self) -> bool {
        self.failing
    }
}

/// Device state and command dispatch.
///
/// Holds the two PWM outputs and the last accepted humidity and temperature
/// setpoints. Nothing survives a reboot: every instance starts from the same
/// boot values.
pub struct CommandLoop<O: PwmOutput> {
    light: O,
    phototherapy: O,
    humidity: i32,
    temperature: f64,
    input_errors: InputErrors,
}

impl<O: PwmOutput> CommandLoop<O> {
    /// Set up both outputs at the PWM frequency and load boot values.
    pub fn new(mut light: O, mut phototherapy: O) -> Self {
        light.set_frequency(PWM_FREQUENCY_HZ);
        phototherapy.set_frequency(PWM_FREQUENCY_HZ);

        Self {
            light,
            phototherapy,
            humidity: BOOT_HUMIDITY,
            temperature: BOOT_TEMPERATURE,
            input_errors: InputErrors::default(),
        }
    }

    pub fn light_duty(&self) -> u16 {
        self.light.duty_u16()
    }

    pub fn phototherapy_duty(&self) -> u16 {
        self.phototherapy.duty_u16()
    }

    /// Last accepted humidity setpoint.
    pub fn humidity(&self) -> i32 {
        self.humidity
    }

    /// Last accepted temperature setpoint.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Read failures seen by [`run`](Self::run) so far.
    pub fn input_errors(&self) -> InputErrors {
        self.input_errors
    }

    pub fn light(&self) -> &O {
        &self.light
    }

    pub fn phototherapy(&self) -> &O {
        &self.phototherapy
    }

    /// Apply one input line.
    ///
    /// Lines that fail to parse or fall outside the accepted range leave
    /// the state untouched.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        let command = match parse_line(line) {
            Ok(command) => command,
            Err(e) => {
                debug!(line = line.trim_end(), error = %e, "Discarded command");
                return Flow::Continue;
            }
        };

        match command {
            Command::Light(percent) => {
                self.light.set_duty_u16(duty_from_percent(percent));
                info!(percent, duty = self.light.duty_u16(), "Light set");
            }
            Command::Phototherapy(percent) => {
                self.phototherapy.set_duty_u16(duty_from_percent(percent));
                info!(
                    percent,
                    duty = self.phototherapy.duty_u16(),
                    "Phototherapy set"
                );
            }
            Command::Humidity(percent) => {
                // No humidity actuator yet; the setpoint is only recorded.
                self.humidity = percent;
                println!("Humidity set to: {}%", percent);
            }
            Command::Temperature(celsius) => {
                // No heater yet; the setpoint is only recorded.
                self.temperature = celsius;
                println!("Temperature set to: {}°C", celsius);
            }
            Command::Exit => {
                self.shutdown();
                return Flow::Exit;
            }
        }

        Flow::Continue
    }

    /// Zero both PWM outputs.
    pub fn shutdown(&mut self) {
        self.light.set_duty_u16(0);
        self.phototherapy.set_duty_u16(0);
        info!("Outputs zeroed");
    }

    /// Poll `source` until an exit command, an interrupt or end of input.
    ///
    /// An interrupt is handled like `exit_program`. Source errors are logged,
    /// once per run of consecutive failures, and polling continues. When no line is ready the loop spins straight
    /// back to the next poll.
    pub fn run<S: LineSource>(&mut self, source: &mut S, interrupt: &AtomicBool) -> ShutdownReason {
        loop {
            if interrupt.load(Ordering::SeqCst) {
                self.shutdown();
                return ShutdownReason::Interrupted;
            }

            let event = match source.poll_line() {
                Ok(event) => {
                    self.input_errors.recovered();
                    event
                }
                Err(e) => {
                    self.input_errors.record(&e);
                    continue;
                }
            };

            match event {
                LineEvent::Line(line) => {
                    if self.handle_line(&line) == Flow::Exit {
                        return ShutdownReason::ExitCommand;
                    }
                }
                LineEvent::Idle => std::hint::spin_loop(),
                LineEvent::Closed => {
                    self.shutdown();
                    return ShutdownReason::InputClosed;
                }
            }
        }
    }
}
