//! Console printer with optional ANSI colors.
//!
//! The printer writes to any [`Write`] so console flows can be driven against
//! an in-memory buffer in tests.

use std::io::{self, Write};

/// Available colors for printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterColor {
    Red,
    Yellow,
    Cyan,
    BoldGreen,
    BoldCyan,
    BoldWhite,
}

impl PrinterColor {
    /// ANSI escape code for this color.
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Yellow => "\x1b[33m",
            Self::Cyan => "\x1b[36m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldCyan => "\x1b[1;36m",
            Self::BoldWhite => "\x1b[1;37m",
        }
    }
}

/// ANSI reset code.
const RESET: &str = "\x1b[0m";

/// Width of banner rules.
pub const RULE_WIDTH: usize = 60;

/// Line-oriented writer with color support.
#[derive(Debug)]
pub struct Printer<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Plain line.
    pub fn line(&mut self, content: &str) -> io::Result<()> {
        writeln!(self.out, "{}", content)
    }

    /// Empty line.
    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Line in `color`; plain when colors are off.
    pub fn print(&mut self, content: &str, color: PrinterColor) -> io::Result<()> {
        if self.color {
            writeln!(self.out, "{}{}{}", color.ansi_code(), content, RESET)
        } else {
            writeln!(self.out, "{}", content)
        }
    }

    /// Text without a newline, flushed so it shows before input is read.
    pub fn prompt(&mut self, content: &str) -> io::Result<()> {
        write!(self.out, "{}", content)?;
        self.out.flush()
    }

    /// `=` rule.
    pub fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))
    }

    /// Title framed by rules, preceded by a blank line.
    pub fn banner(&mut self, title: &str) -> io::Result<()> {
        self.blank()?;
        self.rule()?;
        self.print(title, PrinterColor::BoldCyan)?;
        self.rule()
    }

    /// `speaker: message`, speaker highlighted.
    pub fn speaker(&mut self, speaker: &str, message: &str) -> io::Result<()> {
        if self.color {
            writeln!(
                self.out,
                "{}{}{}: {}",
                PrinterColor::BoldGreen.ansi_code(),
                speaker,
                RESET,
                message
            )
        } else {
            writeln!(self.out, "{}: {}", speaker, message)
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
