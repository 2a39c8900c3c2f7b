//! Command emitter.
//!
//! Turns one changed control value into one command line. Emission is
//! fire-and-forget: failures are logged and the caller carries on.

use tracing::{debug, warn};

use crate::controller::link::CommandLink;
use crate::protocol::{Channel, CommandValue, encode_command, encode_exit};

/// Raise `value` to the panel floor of `channel`.
///
/// # Example
/// ```
/// use incubator_control::controller::enforce_min;
/// use incubator_control::protocol::Channel;
///
/// assert_eq!(enforce_min(Channel::Humidity, 10), 30);
/// assert_eq!(enforce_min(Channel::Light, 60), 60);
/// ```
pub fn enforce_min(channel: Channel, value: u8) -> u8 {
    value.max(channel.panel_floor())
}

/// Writes command lines to a [`CommandLink`].
pub struct CommandEmitter<L: CommandLink> {
    link: L,
}

impl<L: CommandLink> CommandEmitter<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Send one command. Never fails and never retries.
    pub fn send(&mut self, channel: Channel, value: impl Into<CommandValue>) {
        let line = encode_command(channel, value);
        self.write(&line);
    }

    /// Ask the device to zero its outputs and stop.
    pub fn send_exit(&mut self) {
        self.write(&encode_exit());
    }

    fn write(&mut self, line: &str) {
        if !self.link.is_open() {
            debug!(line = line.trim_end(), "Link not open, command dropped");
            return;
        }

        match self.link.write_line(line) {
            Ok(()) => debug!(line = line.trim_end(), "Command sent"),
            Err(e) => {
                warn!(line = line.trim_end(), error = %e, "Command send failed");
                eprintln!("Error sending: {}", e);
            }
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Close the underlying link.
    pub fn close(&mut self) {
        if self.link.is_open() {
            self.link.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::link::{MemoryLink, SerialLink};

    #[test]
    fn test_enforce_min() {
        assert_eq!(enforce_min(Channel::Humidity, 10), 30);
        assert_eq!(enforce_min(Channel::Humidity, 30), 30);
        assert_eq!(enforce_min(Channel::Phototherapy, 0), 25);
        assert_eq!(enforce_min(Channel::Light, 24), 25);
        assert_eq!(enforce_min(Channel::Light, 99), 99);
        assert_eq!(enforce_min(Channel::Temperature, 0), 0);
    }

    #[test]
    fn test_one_line_per_send() {
        let mut emitter = CommandEmitter::new(MemoryLink::new());
        emitter.send(Channel::Light, 40u8);
        emitter.send(Channel::Light, 40u8);
        emitter.send(Channel::Temperature, 37.5);
        emitter.send_exit();

        assert_eq!(
            emitter.link().lines(),
            ["L40\n", "L40\n", "T37.5\n", "exit_program\n"]
        );
    }

    #[test]
    fn test_closed_link_is_noop() {
        let mut emitter = CommandEmitter::new(SerialLink::disconnected());
        emitter.send(Channel::Phototherapy, 50u8);
        emitter.send_exit();
        assert!(!emitter.link().is_open());
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let mut emitter = CommandEmitter::new(MemoryLink::failing());
        emitter.send(Channel::Humidity, 40u8);
        emitter.send(Channel::Humidity, 41u8);
        assert!(emitter.link().lines().is_empty());
    }

    #[test]
    fn test_close() {
        let mut emitter = CommandEmitter::new(MemoryLink::new());
        emitter.close();
        emitter.send(Channel::Light, 50u8);
        assert!(emitter.link().lines().is_empty());
    }
}
