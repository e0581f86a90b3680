//! Synchronous read engine
//!
//! Blocking `pread` against an owned file handle. The file offset is never
//! moved, so the handle carries no state between reads.
//!
//! # Features
//!
//! - Handles partial reads by retrying until complete
//! - Stops at EOF and reports the bytes read so far
//! - Retries reads interrupted by signals

use super::ReadEngine;
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

/// Synchronous engine using pread
pub struct SyncEngine {
    file: File,
}

impl SyncEngine {
    /// Wrap an open read handle. The handle is closed when the engine drops.
    pub fn new(file: File) -> Self {
        Self { file }
    }

    /// Perform a read using pread
    ///
    /// Reads until `buffer` is full or EOF is reached.
    #[inline(always)]
    fn do_read(&self, buffer: &mut [u8], offset: u64) -> io::Result<usize> {
        let fd = self.file.as_raw_fd();
        let length = buffer.len();
        let mut total_read = 0;

        while total_read < length {
            let remaining = &mut buffer[total_read..];
            let current_offset = offset + total_read as u64;

            // SAFETY: `remaining` is a valid, uniquely borrowed region of
            // `remaining.len()` bytes for the duration of the call.
            let result = unsafe {
                libc::pread(
                    fd,
                    remaining.as_mut_ptr() as *mut libc::c_void,
                    remaining.len(),
                    current_offset as libc::off_t,
                )
            };

            if result < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }

            if result == 0 {
                // EOF
                break;
            }

            total_read += result as usize;
        }

        Ok(total_read)
    }
}

impl ReadEngine for SyncEngine {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.do_read(buf, offset)
    }
}
