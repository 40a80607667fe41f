//! The processor's I/O boundary
//!
//! `in` consumes one whitespace-delimited integer from the bound input
//! stream; `out` pops one value and writes it followed by a newline, flushing
//! immediately so that output written before a fault is never lost.

use crate::interpreter::engine::Processor;
use crate::interpreter::errors::RuntimeError;
use crate::parser::isa::Opcode;
use std::io::{self, BufRead, Write};

/// Token reader over a buffered input source
pub struct InputStream {
    reader: Box<dyn BufRead>,
}

impl InputStream {
    pub fn new<R: BufRead + 'static>(reader: R) -> Self {
        InputStream {
            reader: Box::new(reader),
        }
    }

    /// Next whitespace-delimited token, or `None` at end of stream
    pub fn next_token(&mut self) -> io::Result<Option<String>> {
        let mut token = Vec::new();
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                break;
            }

            let mut used = 0;
            let mut complete = false;
            for &byte in buf {
                used += 1;
                if byte.is_ascii_whitespace() {
                    if !token.is_empty() {
                        complete = true;
                        break;
                    }
                } else {
                    token.push(byte);
                }
            }
            self.reader.consume(used);

            if complete {
                break;
            }
        }

        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(String::from_utf8_lossy(&token).into_owned()))
        }
    }
}

impl std::fmt::Debug for InputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputStream").finish_non_exhaustive()
    }
}

impl<W: Write> Processor<W> {
    /// `in`: read one integer and push it
    pub(crate) fn execute_input(&mut self, offset: usize) -> Result<(), RuntimeError> {
        let input = self
            .input
            .as_mut()
            .ok_or(RuntimeError::InputNotBound { offset })?;

        let token = input
            .next_token()
            .map_err(|err| RuntimeError::InputFailed {
                message: err.to_string(),
                offset,
            })?
            .ok_or(RuntimeError::InputExhausted { offset })?;

        let value = token
            .parse::<i32>()
            .map_err(|_| RuntimeError::InvalidInput { token, offset })?;

        self.push_value(value, offset)
    }

    /// `out`: pop one value and write it on its own line
    pub(crate) fn execute_output(&mut self, offset: usize) -> Result<(), RuntimeError> {
        let [value] = self.pop_operands::<1>(Opcode::Out, offset)?;
        writeln!(self.output, "{}", value)
            .and_then(|()| self.output.flush())
            .map_err(|err| RuntimeError::OutputFailed {
                message: err.to_string(),
                offset,
            })
    }
}
