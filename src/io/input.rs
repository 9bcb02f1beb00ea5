use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Startup,
    Interactive,
}

/// One input line as read, without its terminator. Decoding is left to
/// the caller so a malformed line costs only itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub bytes: Vec<u8>,
    pub source: Source,
}

impl Line {
    pub fn lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Reads the startup file to its end, then standard input.
pub struct LineReader {
    startup: Option<Box<dyn BufRead>>,
    input: Box<dyn BufRead>,
}

impl LineReader {
    pub fn new(startup: Option<Box<dyn BufRead>>, input: Box<dyn BufRead>) -> Self {
        LineReader { startup, input }
    }

    /// Standard input preceded by `startup_file` when it can be opened.
    pub fn open(startup_file: Option<&Path>) -> Self {
        let startup = startup_file.and_then(|path| match File::open(path) {
            Ok(file) => {
                log::debug!("reading startup file {}", path.display());
                Some(Box::new(BufReader::new(file)) as Box<dyn BufRead>)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("cannot open {}: {}", path.display(), e);
                None
            }
        });
        LineReader::new(startup, Box::new(io::stdin().lock()))
    }

    /// True once the startup file is exhausted, so the next line comes
    /// from standard input and deserves a prompt.
    pub fn next_is_interactive(&mut self) -> bool {
        let Some(startup) = self.startup.as_mut() else {
            return true;
        };
        match startup.fill_buf() {
            Ok(buf) if !buf.is_empty() => false,
            Ok(_) => {
                self.startup = None;
                true
            }
            Err(e) => {
                log::warn!("startup file: {}", e);
                self.startup = None;
                true
            }
        }
    }

    /// Next line without its terminator, or `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<Line>> {
        if !self.next_is_interactive() {
            if let Some(startup) = self.startup.as_mut() {
                if let Some(bytes) = read_from(startup.as_mut())? {
                    return Ok(Some(Line { bytes, source: Source::Startup }));
                }
            }
            self.startup = None;
        }
        Ok(read_from(self.input.as_mut())?.map(|bytes| Line {
            bytes,
            source: Source::Interactive,
        }))
    }
}

fn read_from(reader: &mut dyn BufRead) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn reader(startup: Option<&str>, input: &str) -> LineReader {
        LineReader::new(
            startup.map(|s| Box::new(Cursor::new(s.to_string())) as Box<dyn BufRead>),
            Box::new(Cursor::new(input.to_string())),
        )
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| std::str::from_utf8(&l.bytes).unwrap()).collect()
    }

    fn collect(mut reader: LineReader) -> Vec<Line> {
        let mut lines = Vec::new();
        while let Some(line) = reader.read_line().unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_startup_then_stdin() {
        let lines = collect(reader(Some("echo a\necho b"), "echo c\n"));
        let texts: Vec<_> = lines.iter().map(|l| (std::str::from_utf8(&l.bytes).unwrap(), l.source)).collect();
        assert_eq!(
            texts,
            vec![
                ("echo a", Source::Startup),
                ("echo b", Source::Startup),
                ("echo c", Source::Interactive),
            ]
        );
    }

    #[test]
    fn test_interactive_flag_tracks_source() {
        let mut r = reader(Some("one\n"), "two\n");
        assert!(!r.next_is_interactive());
        assert_eq!(r.read_line().unwrap().map(|l| l.source), Some(Source::Startup));
        assert!(r.next_is_interactive());
        assert_eq!(r.read_line().unwrap().map(|l| l.bytes), Some(b"two".to_vec()));
        assert_eq!(r.read_line().unwrap(), None);
    }

    #[test]
    fn test_empty_lines_are_kept() {
        let lines = collect(reader(None, "\n\r\nx\n"));
        assert_eq!(texts(&lines), vec!["", "", "x"]);
    }

    #[test]
    fn test_invalid_utf8_is_confined_to_its_line() {
        let input: &[u8] = b"echo \xff\xfe\necho after\n";
        let lines = collect(LineReader::new(None, Box::new(Cursor::new(input.to_vec()))));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].bytes, b"echo \xff\xfe".to_vec());
        assert_eq!(lines[0].lossy(), "echo \u{fffd}\u{fffd}");
        assert_eq!(texts(&lines[1..]), vec!["echo after"]);
    }

    #[test]
    fn test_open_missing_startup_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = LineReader::open(Some(&dir.path().join(".ishrc")));
        assert!(r.next_is_interactive());
    }

    #[test]
    fn test_open_existing_startup_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "setenv A b").unwrap();
        let mut r = LineReader::open(Some(file.path()));
        assert!(!r.next_is_interactive());
        let line = r.read_line().unwrap().unwrap();
        assert_eq!(line, Line { bytes: b"setenv A b".to_vec(), source: Source::Startup });
    }
}
