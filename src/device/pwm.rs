//! PWM outputs driven by the command loop.

use tracing::debug;

/// A 16-bit PWM output.
pub trait PwmOutput {
    /// Set the duty cycle (0 = off, 65535 = fully on).
    fn set_duty_u16(&mut self, duty: u16);

    /// Current duty cycle.
    fn duty_u16(&self) -> u16;

    /// Set the PWM frequency in Hz.
    fn set_frequency(&mut self, hz: u32);
}

/// In-memory PWM output.
///
/// Stands in for the microcontroller peripheral when the loop runs on a
/// host. Every change is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedPwm {
    name: &'static str,
    duty: u16,
    frequency: u32,
    writes: usize,
}

impl SimulatedPwm {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            duty: 0,
            frequency: 0,
            writes: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Number of duty writes since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PwmOutput for SimulatedPwm {
    fn set_duty_u16(&mut self, duty: u16) {
        debug!(output = self.name, duty, "PWM duty set");
        self.duty = duty;
        self.writes += 1;
    }

    fn duty_u16(&self) -> u16 {
        self.duty
    }

    fn set_frequency(&mut self, hz: u32) {
        debug!(output = self.name, hz, "PWM frequency set");
        self.frequency = hz;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_pwm_records_state() {
        let mut pwm = SimulatedPwm::new("light");
        assert_eq!(pwm.duty_u16(), 0);
        assert_eq!(pwm.writes(), 0);

        pwm.set_frequency(1000);
        pwm.set_duty_u16(32768);
        pwm.set_duty_u16(0);

        assert_eq!(pwm.name(), "light");
        assert_eq!(pwm.frequency(), 1000);
        assert_eq!(pwm.duty_u16(), 0);
        assert_eq!(pwm.writes(), 2);
    }
}
