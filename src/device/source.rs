//! Non-blocking line sources for the command loop.
//!
//! A source is polled with a zero timeout: it either hands back one complete
//! line or reports that nothing is ready yet.

use std::collections::VecDeque;
use std::io::{self, Read};

use serialport::SerialPort;
use tracing::debug;

use crate::config::MAX_LINE_LEN;

/// Result of polling a line source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// One complete line, without its terminator.
    Line(String),
    /// No complete line is available yet.
    Idle,
    /// Input is exhausted. Only finite sources report this.
    Closed,
}

/// Zero-timeout line input.
pub trait LineSource {
    /// Check for input and return at most one complete line.
    fn poll_line(&mut self) -> io::Result<LineEvent>;
}

// =============================================================================
// Serial
// =============================================================================

/// Line source reading from a serial port.
///
/// Uses the number of bytes waiting in the driver buffer as the readiness
/// check, so a poll never blocks. Bytes are accumulated until a newline
/// arrives; only one partial line of at most [`MAX_LINE_LEN`] bytes is held.
/// A longer line is dropped along with everything up to its newline.
pub struct SerialLineSource {
    port: Box<dyn SerialPort>,
    pending: Vec<u8>,
    discarding: bool,
}

impl SerialLineSource {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self {
            port,
            pending: Vec::new(),
            discarding: false,
        }
    }

    /// Bytes of the current partial line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn newline(&self) -> Option<usize> {
        self.pending.iter().position(|&b| b == b'\n')
    }

    /// Take the first complete line out of the pending buffer.
    fn take_line(&mut self) -> Option<String> {
        loop {
            if self.discarding {
                let Some(end) = self.newline() else {
                    self.pending.clear();
                    return None;
                };
                self.pending.drain(..=end);
                self.discarding = false;
            }

            if let Some(end) = self.newline() {
                let line: Vec<u8> = self.pending.drain(..=end).collect();
                if end > MAX_LINE_LEN {
                    debug!(len = end, "Dropped overlong line");
                    continue;
                }
                return Some(String::from_utf8_lossy(&line[..end]).into_owned());
            }

            if self.pending.len() > MAX_LINE_LEN {
                debug!(len = self.pending.len(), "Dropped overlong line, skipping to next newline");
                self.pending.clear();
                self.discarding = true;
            }
            return None;
        }
    }
}

impl LineSource for SerialLineSource {
    fn poll_line(&mut self) -> io::Result<LineEvent> {
        if let Some(line) = self.take_line() {
            return Ok(LineEvent::Line(line));
        }

        let available = self.port.bytes_to_read().map_err(io::Error::from)? as usize;
        if available == 0 {
            return Ok(LineEvent::Idle);
        }

        let mut buf = vec![0u8; available];
        let read = self.port.read(&mut buf)?;
        self.pending.extend_from_slice(&buf[..read]);

        Ok(self.take_line().map_or(LineEvent::Idle, LineEvent::Line))
    }
}

// =============================================================================
// Scripted
// =============================================================================

/// Line source over a fixed list of lines.
///
/// Used for replaying recorded sessions and in tests. Reports
/// [`LineEvent::Closed`] once every line has been handed out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a block of text into lines.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedLines {
    fn poll_line(&mut self) -> io::Result<LineEvent> {
        Ok(self
            .lines
            .pop_front()
            .map_or(LineEvent::Closed, LineEvent::Line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_lines_in_order() {
        let mut source = ScriptedLines::new(["L50", "P30"]);
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.poll_line().unwrap(), LineEvent::Line("L50".into()));
        assert_eq!(source.poll_line().unwrap(), LineEvent::Line("P30".into()));
        assert_eq!(source.poll_line().unwrap(), LineEvent::Closed);
        assert_eq!(source.poll_line().unwrap(), LineEvent::Closed);
    }

    #[test]
    fn test_scripted_from_text() {
        let mut source = ScriptedLines::from_text("H60\r\nT37.5\n\nexit_program\n");
        assert_eq!(source.remaining(), 4);
        assert_eq!(source.poll_line().unwrap(), LineEvent::Line("H60".into()));
        assert_eq!(source.poll_line().unwrap(), LineEvent::Line("T37.5".into()));
        assert_eq!(source.poll_line().unwrap(), LineEvent::Line("".into()));
    }

    #[cfg(unix)]
    mod serial {
        use std::io::Write;
        use std::thread;
        use std::time::Duration;

        use serialport::TTYPort;

        use super::*;
        use crate::protocol::{Command, parse_line};

        fn source_pair() -> (TTYPort, SerialLineSource) {
            let (master, slave) = TTYPort::pair().expect("pty pair");
            (master, SerialLineSource::new(Box::new(slave)))
        }

        fn send(master: &mut TTYPort, bytes: &[u8]) {
            master.write_all(bytes).unwrap();
            master.flush().unwrap();
        }

        /// Poll until something other than `Idle` arrives, giving up after ~1s.
        fn next_event(source: &mut SerialLineSource) -> LineEvent {
            for _ in 0..200 {
                match source.poll_line().unwrap() {
                    LineEvent::Idle => thread::sleep(Duration::from_millis(5)),
                    event => return event,
                }
            }
            LineEvent::Idle
        }

        /// Poll until `len` bytes of a partial line are buffered.
        fn wait_pending(source: &mut SerialLineSource, len: usize) {
            for _ in 0..200 {
                assert_eq!(source.poll_line().unwrap(), LineEvent::Idle);
                if source.pending_len() == len {
                    return;
                }
                thread::sleep(Duration::from_millis(5));
            }
            panic!("expected {} pending bytes, have {}", len, source.pending_len());
        }

        #[test]
        fn test_idle_without_bytes() {
            let (_master, mut source) = source_pair();
            assert_eq!(source.poll_line().unwrap(), LineEvent::Idle);
            assert_eq!(source.poll_line().unwrap(), LineEvent::Idle);
            assert_eq!(source.pending_len(), 0);
        }

        #[test]
        fn test_line_split_across_polls() {
            let (mut master, mut source) = source_pair();
            send(&mut master, b"L3");
            wait_pending(&mut source, 2);

            send(&mut master, b"0\n");
            assert_eq!(next_event(&mut source), LineEvent::Line("L30".into()));
            assert_eq!(source.pending_len(), 0);
            assert_eq!(source.poll_line().unwrap(), LineEvent::Idle);
        }

        #[test]
        fn test_several_lines_in_one_read() {
            let (mut master, mut source) = source_pair();
            send(&mut master, b"L30\nP50\nexit_program\n");
            assert_eq!(next_event(&mut source), LineEvent::Line("L30".into()));
            // The rest is already buffered and comes out one line per poll.
            assert_eq!(source.poll_line().unwrap(), LineEvent::Line("P50".into()));
            assert_eq!(source.poll_line().unwrap(), LineEvent::Line("exit_program".into()));
            assert_eq!(source.poll_line().unwrap(), LineEvent::Idle);
        }

        #[test]
        fn test_crlf_input() {
            let (mut master, mut source) = source_pair();
            send(&mut master, b"P50\r\nH65\r\n");
            let LineEvent::Line(line) = next_event(&mut source) else {
                panic!("no line received");
            };
            assert_eq!(line, "P50\r");
            assert_eq!(parse_line(&line), Ok(Command::Phototherapy(50)));
            assert_eq!(source.poll_line().unwrap(), LineEvent::Line("H65\r".into()));
        }

        #[test]
        fn test_endless_line_is_bounded() {
            let (mut master, mut source) = source_pair();
            let chunk = [b'X'; 1024];
            for _ in 0..16 {
                send(&mut master, &chunk);
                for _ in 0..10 {
                    assert_eq!(source.poll_line().unwrap(), LineEvent::Idle);
                    assert!(source.pending_len() <= MAX_LINE_LEN);
                    thread::sleep(Duration::from_millis(1));
                }
            }

            // The tail of the long line is skipped, the next line is intact.
            send(&mut master, b"XXXX\nL30\n");
            assert_eq!(next_event(&mut source), LineEvent::Line("L30".into()));
            assert_eq!(source.poll_line().unwrap(), LineEvent::Idle);
        }

        #[test]
        fn test_overlong_line_in_one_read() {
            let (mut master, mut source) = source_pair();
            let mut bytes = vec![b'P'; MAX_LINE_LEN + 10];
            bytes.extend_from_slice(b"\nP40\n");
            send(&mut master, &bytes);
            assert_eq!(next_event(&mut source), LineEvent::Line("P40".into()));
        }

        #[test]
        fn test_line_at_limit_is_kept() {
            let (mut master, mut source) = source_pair();
            let mut bytes = vec![b'L'; MAX_LINE_LEN];
            bytes.push(b'\n');
            send(&mut master, &bytes);
            let LineEvent::Line(line) = next_event(&mut source) else {
                panic!("no line received");
            };
            assert_eq!(line.len(), MAX_LINE_LEN);
        }
    }
}
