// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! Output sink for the `print`/`println` builtins. Decoupling these from
//! stdout directly lets tests capture program output instead of racing the
//! test harness for the terminal.

/// Something that `print`-style builtins can write text to.
pub trait Writer {
    fn write_str(&mut self, s: &str);

    fn write_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf));
    }
}

/// Writes directly to the process's standard output.
#[derive(Debug, Default)]
pub struct StdoutWriter;

impl Writer for StdoutWriter {
    fn write_str(&mut self, s: &str) {
        use std::io::Write as _;
        print!("{}", s);
        let _ = std::io::stdout().flush();
    }
}

/// Collects everything written to it in memory, for tests and embedders
/// that want the program's output as a string instead of on the terminal.
#[derive(Debug, Default)]
pub struct CollectingWriter {
    buf: String,
}

impl CollectingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl Writer for CollectingWriter {
    fn write_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn collecting_writer_accumulates() {
        let mut w = CollectingWriter::new();
        w.write_str("hello, ");
        w.write_str("world");
        w.write_char('!');
        assert_eq!(w.as_str(), "hello, world!");
    }
}
