// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Serial protocol for forwarding decisions to the sorting controller.
//!
//! A decision travels as a 4-byte frame:
//!
//! | Byte | Value |
//! |------|-------|
//! | 0 | [`FRAME_PREFIX`] (`0xAA`) |
//! | 1 | [`CMD_CLASSIFICATION_RESULT`] (`0x01`) |
//! | 2 | category code, see [`Category::code`], or [`UNKNOWN_CATEGORY_CODE`] |
//! | 3 | checksum, byte 1 XOR byte 2 |
//!
//! Free-form text messages are sent as UTF-8 followed by a newline.

use std::io::Write;

use crate::category::Category;
use crate::error::{ClassifierError, Result};

/// First byte of every frame.
pub const FRAME_PREFIX: u8 = 0xAA;

/// Command byte for a classification result.
pub const CMD_CLASSIFICATION_RESULT: u8 = 0x01;

/// Code sent when the category is unknown.
pub const UNKNOWN_CATEGORY_CODE: u8 = 0xFF;

/// Length of a classification frame.
pub const FRAME_LEN: usize = 4;

/// Serial code for a category name, case-insensitive.
#[must_use]
pub fn category_code(name: &str) -> u8 {
    name.parse::<Category>()
        .map_or(UNKNOWN_CATEGORY_CODE, |c| c.code())
}

/// Encode a classification frame. `None` encodes the unknown category.
#[must_use]
pub const fn encode_classification(category: Option<Category>) -> [u8; FRAME_LEN] {
    let code = match category {
        Some(c) => c.code(),
        None => UNKNOWN_CATEGORY_CODE,
    };
    [
        FRAME_PREFIX,
        CMD_CLASSIFICATION_RESULT,
        code,
        CMD_CLASSIFICATION_RESULT ^ code,
    ]
}

/// Decode a classification frame.
///
/// Returns `None` for a valid frame carrying the unknown code.
///
/// # Errors
///
/// Returns an error on a short frame, wrong prefix, unknown command,
/// bad checksum, or a category code outside the known set.
pub fn decode_frame(frame: &[u8]) -> Result<Option<Category>> {
    let [prefix, command, code, checksum] = frame else {
        return Err(ClassifierError::ProtocolError(format!(
            "expected {FRAME_LEN} bytes, got {}",
            frame.len()
        )));
    };

    if *prefix != FRAME_PREFIX {
        return Err(ClassifierError::ProtocolError(format!("bad prefix 0x{prefix:02X}")));
    }
    if *command != CMD_CLASSIFICATION_RESULT {
        return Err(ClassifierError::ProtocolError(format!("unknown command 0x{command:02X}")));
    }
    if command ^ code != *checksum {
        return Err(ClassifierError::ProtocolError(format!(
            "checksum mismatch: got 0x{checksum:02X}, expected 0x{:02X}",
            command ^ code
        )));
    }
    if *code == UNKNOWN_CATEGORY_CODE {
        return Ok(None);
    }

    Category::ALL
        .iter()
        .find(|c| c.code() == *code)
        .copied()
        .map(Some)
        .ok_or_else(|| ClassifierError::ProtocolError(format!("unknown category code 0x{code:02X}")))
}

/// Writer for the sorting controller's serial line.
///
/// Any [`Write`] works: an opened serial device, a socket, or a buffer.
#[derive(Debug)]
pub struct SerialLink<W: Write> {
    writer: W,
}

impl<W: Write> SerialLink<W> {
    /// Wrap an open writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Send a classification frame and flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or flush fails.
    pub fn send_classification(&mut self, category: Option<Category>) -> Result<()> {
        self.writer.write_all(&encode_classification(category))?;
        self.writer.flush()?;
        Ok(())
    }

    /// Send a text line and flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or flush fails.
    pub fn send_text(&mut self, message: &str) -> Result<()> {
        self.writer.write_all(message.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
