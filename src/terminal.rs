use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }

        Ok(Self::with_buffer(width, height, alternate_screen))
    }

    /// Back buffer only, never touches the real terminal
    pub fn offscreen(width: u16, height: u16) -> Self {
        Self::with_buffer(width, height, false)
    }

    fn with_buffer(width: u16, height: u16, alternate_screen: bool) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Resize the back buffer, dropping its contents
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
        }
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        self.set_cell(x, y, ch, fg, None, bold);
    }

    pub fn set_cell(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bg, bold };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize)?.get(x as usize)
    }

    /// Row of the back buffer as plain text
    pub fn row_text(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().map(|c| c.ch).collect())
            .unwrap_or_default()
    }

    /// Draw the whole back buffer to the screen
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout().lock();
        queue!(out, MoveTo(0, 0))?;

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
                if let Some(bg) = cell.bg {
                    queue!(out, SetBackgroundColor(bg))?;
                }

                if let Some(color) = cell.fg {
                    queue!(out, SetForegroundColor(color), Print(cell.ch))?;
                } else {
                    queue!(out, Print(cell.ch))?;
                }

                if cell.bold || cell.bg.is_some() || cell.fg.is_some() {
                    queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
                }
            }
        }

        out.flush()
    }

    /// Next input event, waiting at most `timeout`
    pub fn poll_event(&self, timeout: Duration) -> io::Result<Option<Event>> {
        if poll(timeout)? {
            return read().map(Some);
        }
        Ok(None)
    }

    /// Sleep for specified duration
    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds.max(0.0)));
    }

    /// Write the buffer with ANSI colours (for print mode)
    pub fn write_ansi<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in &self.buffer {
            for cell in row {
                if cell.ch == ' ' && cell.bg.is_none() {
                    write!(out, " ")?;
                    continue;
                }

                if cell.bold {
                    write!(out, "\x1b[1m")?;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.bg {
                    write!(out, "\x1b[48;2;{};{};{}m", r, g, b)?;
                }
                match cell.fg {
                    Some(Color::Rgb { r, g, b }) => write!(out, "\x1b[38;2;{};{};{}m", r, g, b)?,
                    Some(Color::AnsiValue(v)) => write!(out, "\x1b[38;5;{}m", v)?,
                    Some(Color::Grey) => write!(out, "\x1b[37m")?,
                    Some(Color::White) => write!(out, "\x1b[97m")?,
                    _ => {}
                }

                write!(out, "{}\x1b[0m", cell.ch)?;
            }
            writeln!(out)?;
        }
        out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Mouse reporting for as long as the guard lives
pub struct MouseCaptureGuard;

impl MouseCaptureGuard {
    pub fn enable() -> io::Result<Self> {
        execute!(stdout(), EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for MouseCaptureGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clips_to_buffer() {
        let mut term = Terminal::offscreen(4, 2);
        term.set(-1, 0, 'x', None, false);
        term.set(4, 0, 'x', None, false);
        term.set(1, 1, 'y', Some(Color::White), true);
        assert_eq!(term.row_text(0), "    ");
        assert_eq!(term.row_text(1), " y  ");
        assert!(term.get(1, 1).unwrap().bold);
    }

    #[test]
    fn resize_resets_buffer() {
        let mut term = Terminal::offscreen(4, 2);
        term.set_str(0, 0, "abcd", None, false);
        term.resize(6, 3);
        assert_eq!(term.size(), (6, 3));
        assert_eq!(term.row_text(0), "      ");
        assert_eq!(term.row_text(3), "");
    }

    #[test]
    fn ansi_output_carries_colours() {
        let mut term = Terminal::offscreen(3, 1);
        term.set_cell(0, 0, 'a', Some(Color::Rgb { r: 1, g: 2, b: 3 }), Some(Color::Rgb { r: 9, g: 8, b: 7 }), false);
        let mut out = Vec::new();
        term.write_ansi(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[38;2;1;2;3ma"));
        assert!(text.contains("\x1b[48;2;9;8;7m"));
        assert!(text.ends_with("  \n"));
    }
}
