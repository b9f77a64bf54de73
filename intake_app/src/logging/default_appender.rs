//! Provides the `"default"` console appender.
//!
//! Each record is assembled in a stack buffer while the target stream is
//! locked, so lines from different threads never interleave and a line
//! usually reaches the terminal in one write.
//!
//! ```toml
//! [log.appenders.default]
//! kind = "default"
//! target = "stderr" # or "stdout"
//! color = true      # detected from the stream when absent
//! ```

use std::io::{self, Write as _};

use arrayvec::ArrayVec;
use log::Record;
use log4rs::append::Append;
use log4rs::config::{Deserialize, Deserializers};
use log4rs::encode::{self, Color, Encode, EncoderConfig, Style};

use super::WRITE_BUF_SIZE;

/// Standard stream an appender writes to.
#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Stderr,
    Stdout,
}

impl Target {
    fn supports_color(self) -> bool {
        match self {
            Self::Stderr => super::supports_ansi_escapes(&io::stderr()),
            Self::Stdout => super::supports_ansi_escapes(&io::stdout()),
        }
    }
}

#[derive(Debug)]
pub struct DefaultAppender {
    encoder: Box<dyn Encode>,
    target: Target,
    color: bool,
}

impl DefaultAppender {
    fn emit<W: io::Write>(&self, out: W, record: &Record<'_>) -> anyhow::Result<()> {
        let mut line = LineBuffer::new(out, self.color);
        self.encoder.encode(&mut line, record)?;
        Ok(line.flush()?)
    }
}

impl Append for DefaultAppender {
    fn append(&self, record: &Record<'_>) -> anyhow::Result<()> {
        match self.target {
            Target::Stderr => self.emit(io::stderr().lock(), record),
            Target::Stdout => self.emit(io::stdout().lock(), record),
        }
    }

    fn flush(&self) {
        _ = match self.target {
            Target::Stderr => io::stderr().flush(),
            Target::Stdout => io::stdout().flush(),
        };
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultAppenderConfig {
    #[serde(default)]
    target: Target,
    /// Forces colors on or off.
    color: Option<bool>,
    encoder: EncoderConfig,
}

pub struct DefaultAppenderDeserializer;

impl Deserialize for DefaultAppenderDeserializer {
    type Trait = dyn Append;
    type Config = DefaultAppenderConfig;

    fn deserialize(
        &self,
        config: Self::Config,
        deserializers: &Deserializers,
    ) -> anyhow::Result<Box<Self::Trait>> {
        let encoder = deserializers.deserialize(&config.encoder.kind, config.encoder.config)?;
        let target = config.target;
        let color = config.color.unwrap_or_else(|| target.supports_color());

        Ok(Box::new(DefaultAppender {
            encoder,
            target,
            color,
        }))
    }
}

/// Collects one log line before handing it to `out`.
///
/// Writes that don't fit the remaining space spill the buffer first. Writes
/// larger than the whole buffer go straight through.
#[derive(Debug)]
struct LineBuffer<W> {
    out: W,
    color: bool,
    buf: ArrayVec<u8, WRITE_BUF_SIZE>,
}

impl<W: io::Write> LineBuffer<W> {
    fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            buf: ArrayVec::new_const(),
        }
    }

    fn spill(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.out.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }

    fn escape(&mut self, code: u8, color: Option<Color>) -> io::Result<()> {
        match color {
            Some(color) => write!(self, "\x1b[{code};5;{}m", palette_index(color)),
            None => Ok(()),
        }
    }
}

impl<W: io::Write> io::Write for LineBuffer<W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.write_all(bytes)?;
        Ok(bytes.len())
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.buf.try_extend_from_slice(bytes).is_ok() {
            return Ok(());
        }

        self.spill()?;
        if self.buf.try_extend_from_slice(bytes).is_err() {
            self.out.write_all(bytes)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.spill()?;
        self.out.flush()
    }
}

impl<W: io::Write> encode::Write for LineBuffer<W> {
    fn set_style(&mut self, style: &Style) -> io::Result<()> {
        if !self.color {
            return Ok(());
        }

        self.write_all(b"\x1b[0m")?;
        self.escape(38, style.text)?;
        self.escape(48, style.background)?;
        if style.intense == Some(true) {
            self.write_all(b"\x1b[1m")?;
        }
        Ok(())
    }
}

/// Maps to the 256-color palette index of the basic colors.
const fn palette_index(color: Color) -> u8 {
    match color {
        Color::Black => 0,
        Color::Red => 1,
        Color::Green => 2,
        Color::Yellow => 3,
        Color::Blue => 4,
        Color::Magenta => 5,
        Color::Cyan => 6,
        Color::White => 7,
    }
}
