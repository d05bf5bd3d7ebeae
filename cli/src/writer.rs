use crate::error::Error;
use std::io::{Stdout, Write};

/// Writes the generated document
///
/// The document is emitted with a single write, so a failed run never leaves partial output.
pub struct Writer<W: Write = Stdout> {
    stream: W,
}

impl Writer<Stdout> {
    pub fn stdout() -> Self {
        Writer {
            stream: std::io::stdout(),
        }
    }
}

impl<W: Write> Writer<W> {
    pub fn new(stream: W) -> Self {
        Writer { stream }
    }

    /// Output the document followed by a newline
    pub fn emit(&mut self, document: &str) -> Result<(), Error> {
        self.stream
            .write_all(format!("{document}\n").as_bytes())
            .and_then(|_| self.stream.flush())
            .map_err(|e| {
                log::error!("Error while writing to stdout: {e:?}");
                Error::new("Output error", Some("Failed to write the template."))
            })
    }

    pub fn into_inner(self) -> W {
        self.stream
    }
}
