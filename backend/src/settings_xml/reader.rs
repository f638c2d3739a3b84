//! Position-tracking cursor over a streamed XML document.

use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::settings_xml::error::{Result, SettingsXmlError, XmlPosition};

/// Streaming XML reader with line and character position tracking.
///
/// Wraps `quick_xml::Reader` over borrowed document text. Tracks line
/// numbers (1-indexed) and character positions within lines (0-indexed)
/// so structural errors can point at the offending element. Knows the
/// filesystem path it was loaded from, which is also the base for
/// resolving relative include paths.
pub struct SettingsXmlReader<'a> {
    reader: Reader<&'a [u8]>,
    content: &'a str,
    path: Option<PathBuf>,
    current_line: usize,
    current_char: usize,
    last_position: usize,
}

impl<'a> SettingsXmlReader<'a> {
    /// Create a reader over document text. `path` is the file the text was
    /// read from, or `None` for in-memory documents.
    pub fn new(content: &'a str, path: Option<&Path>) -> Self {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);

        Self {
            reader,
            content,
            path: path.map(Path::to_path_buf),
            current_line: 1,
            current_char: 0,
            last_position: 0,
        }
    }

    /// The filesystem path this document was loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current reader position for diagnostics.
    pub fn position(&self) -> XmlPosition {
        XmlPosition {
            path: self.path.clone(),
            line: self.current_line,
            column: self.current_char,
        }
    }

    /// Build a structural error at the current position.
    pub fn error(&self, message: impl Into<String>) -> SettingsXmlError {
        SettingsXmlError::Xml {
            position: self.position(),
            message: message.into(),
        }
    }

    /// Read the next event and update position tracking.
    pub fn read_event(&mut self) -> Result<Event<'a>> {
        let event = match self.reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                // advance to the error location before reporting it
                let position = self.reader.buffer_position();
                self.update_position(position);
                return Err(self.error(format!("Failed to read XML event: {}", e)));
            }
        };

        // Update position after reading so line/char tracking points to the
        // end of the event, matching the byte position
        let position = self.reader.buffer_position();
        self.update_position(position);

        Ok(event)
    }

    fn update_position(&mut self, position: usize) {
        if position <= self.last_position {
            return;
        }

        let slice = &self.content.as_bytes()[self.last_position..position.min(self.content.len())];

        for &byte in slice {
            if byte == b'\n' {
                self.current_line += 1;
                self.current_char = 0;
            } else {
                self.current_char += 1;
            }
        }

        self.last_position = position;
    }
}
