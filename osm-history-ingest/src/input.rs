//! NDJSON object reader.

use osm_history_spatial::{ImportError, OsmObject, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Iterator over the objects of an NDJSON stream, one object per line.
///
/// Blank lines are skipped. Read and parse failures are yielded as errors
/// carrying the 1-based line number.
pub struct NdjsonObjects<R> {
    reader: R,
    buf: String,
    line: u64,
}

impl<R: BufRead> NdjsonObjects<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line: 0,
        }
    }

    /// Lines consumed so far.
    pub fn lines_read(&self) -> u64 {
        self.line
    }
}

impl<R: BufRead> Iterator for NdjsonObjects<R> {
    type Item = Result<OsmObject>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            self.line += 1;
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    return Some(Err(ImportError::Input {
                        line: self.line,
                        message: e.to_string(),
                    }))
                }
            }
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return Some(OsmObject::from_json_line(text, self.line));
        }
    }
}

/// Open `path` for reading, `-` meaning stdin.
pub fn open(path: &Path) -> io::Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin().lock())));
    }
    let file = File::open(path)?;
    Ok(Box::new(BufReader::with_capacity(1 << 20, file)))
}
