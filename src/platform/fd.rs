//! File-descriptor-backed terminal for Unix TTYs and byte streams.

use std::io;

use libc::c_int;

use crate::core::terminal::Terminal;
use crate::error::Result;

fn write_all_fd(fd: c_int, bytes: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        let remaining = &bytes[written..];
        let result =
            unsafe { libc::write(fd, remaining.as_ptr() as *const libc::c_void, remaining.len()) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
        }
        written += result as usize;
    }
    Ok(())
}

fn read_fd(fd: c_int, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        let result = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if result >= 0 {
            return Ok(result as usize);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

fn poll_readable(fd: c_int, timeout_ms: i32) -> io::Result<bool> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(result > 0 && (fds.revents & libc::POLLIN) != 0);
    }
}

fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

/// [`Terminal`] over a pair of raw file descriptors.
///
/// Does not own the descriptors unless constructed via [`FdTerminal::stdio`]
/// semantics (stdin/stdout are never closed). Raw-mode switching is explicit
/// and undone on drop.
pub struct FdTerminal {
    input_fd: c_int,
    output_fd: c_int,
    original_termios: Option<libc::termios>,
    columns: u16,
    rows: u16,
}

impl FdTerminal {
    /// Bind stdin/stdout.
    pub fn stdio() -> Self {
        Self::from_fds(libc::STDIN_FILENO, libc::STDOUT_FILENO)
    }

    /// Bind arbitrary descriptors, e.g. the two ends of a remote stream.
    /// Falls back to 80x24 when the output is not a TTY.
    pub fn from_fds(input_fd: c_int, output_fd: c_int) -> Self {
        let (columns, rows) = read_winsize(output_fd).unwrap_or((80, 24));
        Self {
            input_fd,
            output_fd,
            original_termios: None,
            columns,
            rows,
        }
    }

    /// Switch the input TTY to raw mode, remembering the original
    /// parameters for [`FdTerminal::restore`].
    pub fn raw_mode(&mut self) -> Result<()> {
        if self.original_termios.is_none() {
            self.original_termios = Some(get_termios(self.input_fd)?);
        }
        let mut raw = *self
            .original_termios
            .as_ref()
            .expect("original termios missing");
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.input_fd, &raw)?;
        Ok(())
    }

    /// Restore the TTY parameters captured by [`FdTerminal::raw_mode`].
    pub fn restore(&mut self) -> Result<()> {
        if let Some(original) = self.original_termios.take() {
            set_termios(self.input_fd, &original)?;
        }
        Ok(())
    }

    /// Re-read the window size, keeping the last known value when the
    /// descriptor stops answering.
    pub fn refresh_winsize(&mut self) -> (u16, u16) {
        if let Some((columns, rows)) = read_winsize(self.output_fd) {
            self.columns = columns;
            self.rows = rows;
        }
        (self.columns, self.rows)
    }
}

impl Terminal for FdTerminal {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        write_all_fd(self.output_fd, bytes)?;
        Ok(())
    }

    fn poll(&mut self, timeout_ms: i32) -> Result<bool> {
        Ok(poll_readable(self.input_fd, timeout_ms)?)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(read_fd(self.input_fd, buf)?)
    }

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }
}

impl Drop for FdTerminal {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
