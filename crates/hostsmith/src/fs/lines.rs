//! Lines — bounded, lossy line reading over any `BufRead`.
//!
//! Hosts files in the wild carry stray latin-1 bytes, usually in comments.
//! Invalid UTF-8 becomes U+FFFD instead of failing the read, so it ends up
//! as a host chunk that fails transcoding and is dropped like any other
//! malformed chunk. At most `limit + 2` bytes are buffered per line.

use std::io::{self, BufRead, Read};

/// One step of a [`LineReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    /// A line without its `\n` / `\r\n` terminator.
    Line(String),
    /// The line is longer than the limit; nothing more was buffered.
    TooLarge,
}

pub struct LineReader<R> {
    reader: R,
    limit: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, limit: usize) -> Self {
        Self {
            reader,
            limit,
            buf: Vec::new(),
        }
    }

    /// Reads the next line. `None` at end of input. A final line without
    /// terminator is still returned.
    pub fn next_line(&mut self) -> io::Result<Option<ReadLine>> {
        self.buf.clear();
        // Room for the line plus "\r\n".
        let max = self.limit as u64 + 2;
        let read = (&mut self.reader).take(max).read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        if self.buf.len() > self.limit {
            return Ok(Some(ReadLine::TooLarge));
        }

        Ok(Some(ReadLine::Line(
            String::from_utf8_lossy(&self.buf).into_owned(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(input: &[u8], limit: usize) -> Vec<ReadLine> {
        let mut reader = LineReader::new(input, limit);
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().unwrap() {
            let stop = line == ReadLine::TooLarge;
            lines.push(line);
            if stop {
                break;
            }
        }
        lines
    }

    fn line(text: &str) -> ReadLine {
        ReadLine::Line(text.to_string())
    }

    #[test]
    fn test_terminators_are_stripped() {
        assert_eq!(
            read_all(b"a\r\nb\n\nc", 16),
            vec![line("a"), line("b"), line(""), line("c")]
        );
        assert!(read_all(b"", 16).is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        assert_eq!(
            read_all(b"# caf\xe9\nok\n", 16),
            vec![line("# caf\u{FFFD}"), line("ok")]
        );
    }

    #[test]
    fn test_limit() {
        assert_eq!(read_all(b"abcd\r\nx\n", 4), vec![line("abcd"), line("x")]);
        assert_eq!(read_all(b"ab\nabcde\nx\n", 4), vec![line("ab"), ReadLine::TooLarge]);
        assert_eq!(read_all(b"abcdefghij", 4), vec![ReadLine::TooLarge]);
    }
}
