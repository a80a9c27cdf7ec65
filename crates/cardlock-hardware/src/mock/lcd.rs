//! Virtual character LCD.
//!
//! Simulates the 2-line × 16-column HD44780 display of the reference board
//! as driven by its I2C backpack library: text is written at the cursor,
//! runs past the end of a line onto the next one and past the last line back
//! to the top. A `'\n'` moves the cursor to the start of the next line.
//!
//! # Character Set
//!
//! Only printable ASCII (0x20-0x7E) exists in the display's ROM font. Other
//! characters are shown as `?`; control characters other than `'\n'` are
//! dropped.
//!
//! # Examples
//!
//! ```
//! use cardlock_hardware::mock::VirtualLcd;
//!
//! let mut lcd = VirtualLcd::new(2, 16);
//! lcd.put_str("Secret access activated :)");
//!
//! assert_eq!(lcd.line(0).unwrap(), "Secret access ac");
//! assert_eq!(lcd.line(1).unwrap().trim_end(), "tivated :)");
//! assert_eq!(lcd.contents(), "Secret access activated :)");
//! ```

use cardlock_core::constants::{DISPLAY_COLUMNS, DISPLAY_LINES};

/// Virtual character LCD with cursor and wrap-around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualLcd {
    lines: usize,
    columns: usize,
    buffer: Vec<Vec<u8>>,
    cursor: (usize, usize),
}

impl VirtualLcd {
    /// Create a blank display of the given geometry.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(lines: usize, columns: usize) -> Self {
        assert!(lines > 0 && columns > 0, "display must have at least one cell");
        Self {
            lines,
            columns,
            buffer: vec![vec![b' '; columns]; lines],
            cursor: (0, 0),
        }
    }

    /// Number of lines.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Number of columns per line.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Cursor position as `(line, column)`.
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Blank every cell and home the cursor.
    pub fn clear(&mut self) {
        for line in &mut self.buffer {
            line.fill(b' ');
        }
        self.cursor = (0, 0);
    }

    /// Write text at the cursor.
    pub fn put_str(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\n' => self.newline(),
                ' '..='~' => self.put_byte(ch as u8),
                c if c.is_control() => {}
                _ => self.put_byte(b'?'),
            }
        }
    }

    /// Get one line, padded to the full width.
    pub fn line(&self, index: usize) -> Option<String> {
        self.buffer
            .get(index)
            .map(|cells| String::from_utf8_lossy(cells).into_owned())
    }

    /// Get every line, padded to the full width.
    pub fn all_lines(&self) -> Vec<String> {
        (0..self.lines).filter_map(|i| self.line(i)).collect()
    }

    /// All cells read left to right, top to bottom, trailing blanks removed.
    ///
    /// A message that wrapped onto the second line reads back as one string.
    pub fn contents(&self) -> String {
        let joined: String = self.all_lines().concat();
        joined.trim_end().to_string()
    }

    /// Returns `true` if no cell holds a visible character.
    pub fn is_blank(&self) -> bool {
        self.buffer.iter().flatten().all(|c| *c == b' ')
    }

    fn put_byte(&mut self, byte: u8) {
        let (line, column) = self.cursor;
        self.buffer[line][column] = byte;
        if column + 1 >= self.columns {
            self.newline();
        } else {
            self.cursor = (line, column + 1);
        }
    }

    fn newline(&mut self) {
        let next = (self.cursor.0 + 1) % self.lines;
        self.cursor = (next, 0);
    }
}

impl Default for VirtualLcd {
    fn default() -> Self {
        Self::new(DISPLAY_LINES, DISPLAY_COLUMNS)
    }
}
