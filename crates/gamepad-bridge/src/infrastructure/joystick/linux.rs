//! Linux joydev implementation of [`EventSource`].
//!
//! Wraps a file descriptor for `/dev/input/jsN` opened in non-blocking
//! mode.  Readiness is detected with `select(2)` using a caller-supplied
//! timeout; draining issues fixed-size `read(2)` calls until the kernel
//! reports would-block.
//!
//! The kernel's event record is 8 bytes:
//!
//! ```text
//! struct js_event { __u32 time; __s16 value; __u8 type; __u8 number; };
//! ```
//!
//! `type` is `JS_EVENT_BUTTON` (0x01) or `JS_EVENT_AXIS` (0x02), optionally
//! OR-ed with `JS_EVENT_INIT` (0x80) on the synthetic events emitted right
//! after open.  The init bit is masked off before classification, matching
//! the kernel's documented usage.

use std::ffi::{CStr, CString};
use std::io;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::Duration;

use bridge_core::{EventKind, RawEvent};
use tracing::debug;

use super::{DeviceDescriptor, DeviceError, EventSource};

const JS_EVENT_BUTTON: u8 = 0x01;
const JS_EVENT_AXIS: u8 = 0x02;
const JS_EVENT_INIT: u8 = 0x80;

// joydev ioctl request codes ('j' = 0x6a, direction = read).
const JSIOCGAXES: libc::c_ulong = 0x8001_6a11;
const JSIOCGBUTTONS: libc::c_ulong = 0x8001_6a12;
// JSIOCGNAME with a 128-byte buffer: size field is encoded in bits 16..30.
const JSIOCGNAME_128: libc::c_ulong = 0x8080_6a13;
const NAME_BUF_LEN: usize = 128;

/// Raw kernel event record, read verbatim from the device.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct JsEvent {
    #[allow(dead_code)]
    time: u32,
    value: i16,
    kind: u8,
    number: u8,
}

impl JsEvent {
    fn to_raw_event(self) -> RawEvent {
        let kind = match self.kind & !JS_EVENT_INIT {
            JS_EVENT_BUTTON => EventKind::Button,
            JS_EVENT_AXIS => EventKind::Axis,
            _ => EventKind::Init,
        };
        RawEvent {
            kind,
            index: self.number,
            value: self.value,
        }
    }
}

/// A joystick character device opened in non-blocking mode.
///
/// The file descriptor is exclusively owned by this struct and closed
/// exactly once, on drop.  The shutdown coordinator relies on that: it only
/// drops the device after the poller thread has been joined, so a close can
/// never race an in-flight read.
#[derive(Debug)]
pub struct JoystickDevice {
    fd: libc::c_int,
    descriptor: DeviceDescriptor,
}

impl JoystickDevice {
    /// Opens the device at `path` in non-blocking read-only mode and
    /// queries its identity.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Open`] with the path and the OS error text if
    /// the device cannot be opened.
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| DeviceError::Open {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"),
        })?;

        let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_RDONLY | libc::O_NONBLOCK) };
        if fd < 0 {
            return Err(DeviceError::Open {
                path: path.to_path_buf(),
                source: io::Error::last_os_error(),
            });
        }

        let descriptor = query_descriptor(fd);
        debug!(?path, ?descriptor, "joystick device opened");

        Ok(Self { fd, descriptor })
    }

    /// Identity reported by the device at open time.
    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }
}

impl EventSource for JoystickDevice {
    fn wait_readable(&mut self, timeout: Duration) -> Result<bool, DeviceError> {
        let mut read_fds: libc::fd_set = unsafe { mem::zeroed() };
        unsafe {
            libc::FD_ZERO(&mut read_fds);
            libc::FD_SET(self.fd, &mut read_fds);
        }

        // select(2) may modify the timeval, so it is rebuilt on every call.
        let mut tv = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };

        let ret = unsafe {
            libc::select(
                self.fd + 1,
                &mut read_fds,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &mut tv,
            )
        };

        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                // Signal delivery; the poller simply retries next interval.
                return Ok(false);
            }
            return Err(DeviceError::Read(err));
        }

        Ok(ret > 0 && unsafe { libc::FD_ISSET(self.fd, &read_fds) })
    }

    fn drain(&mut self) -> Result<Vec<RawEvent>, DeviceError> {
        let mut events = Vec::new();

        loop {
            let mut record: JsEvent = unsafe { mem::zeroed() };
            let n = unsafe {
                libc::read(
                    self.fd,
                    &mut record as *mut JsEvent as *mut libc::c_void,
                    mem::size_of::<JsEvent>(),
                )
            };

            if n == mem::size_of::<JsEvent>() as isize {
                events.push(record.to_raw_event());
                continue;
            }

            if n == 0 {
                // EOF means the device went away.
                return Err(DeviceError::Read(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "device reported end of file",
                )));
            }

            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::WouldBlock {
                    // Nothing more immediately available: drain complete.
                    return Ok(events);
                }
                return Err(DeviceError::Read(err));
            }

            // Short read: joydev only produces whole records, so a partial
            // one means the stream is corrupt.
            return Err(DeviceError::Read(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("partial event record of {n} bytes"),
            )));
        }
    }
}

impl Drop for JoystickDevice {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

// ── Device identity ───────────────────────────────────────────────────────────

fn query_descriptor(fd: libc::c_int) -> DeviceDescriptor {
    let mut axes: u8 = 0;
    let mut buttons: u8 = 0;
    unsafe {
        libc::ioctl(fd, JSIOCGAXES, &mut axes as *mut u8);
        libc::ioctl(fd, JSIOCGBUTTONS, &mut buttons as *mut u8);
    }

    let mut name_buf = [0u8; NAME_BUF_LEN];
    let ret = unsafe { libc::ioctl(fd, JSIOCGNAME_128, name_buf.as_mut_ptr()) };
    let name = if ret < 0 {
        "Unknown".to_string()
    } else {
        CStr::from_bytes_until_nul(&name_buf)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "Unknown".to_string())
    };

    DeviceDescriptor {
        name,
        axes,
        buttons,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_js_event_record_is_eight_bytes() {
        // The drain loop reads fixed-size records; the layout must match the
        // kernel's exactly.
        assert_eq!(mem::size_of::<JsEvent>(), 8);
    }

    #[test]
    fn test_axis_record_converts_to_axis_event() {
        let record = JsEvent {
            time: 0,
            value: -1234,
            kind: JS_EVENT_AXIS,
            number: 3,
        };

        let event = record.to_raw_event();

        assert_eq!(event, RawEvent::axis(3, -1234));
    }

    #[test]
    fn test_init_tagged_axis_record_still_decodes_as_axis() {
        // The kernel reports initial axis positions with the init bit set;
        // they carry real values and are classified as axis events.
        let record = JsEvent {
            time: 0,
            value: 100,
            kind: JS_EVENT_AXIS | JS_EVENT_INIT,
            number: 1,
        };

        assert_eq!(record.to_raw_event().kind, EventKind::Axis);
    }

    #[test]
    fn test_unknown_record_kind_decodes_as_init() {
        let record = JsEvent {
            time: 0,
            value: 0,
            kind: 0x40,
            number: 0,
        };

        assert_eq!(record.to_raw_event().kind, EventKind::Init);
    }

    #[test]
    fn test_open_missing_device_reports_path() {
        let path = PathBuf::from("/dev/input/does-not-exist-js99");

        let err = JoystickDevice::open(&path).expect_err("open must fail");

        assert!(err.to_string().contains("does-not-exist-js99"));
    }
}
