use std::io::{self, Write};

use clap::ValueEnum;
use mbviz::consts::BAR_MAX;
use mbviz::meter::unpack;
use mbviz::DiscreteOutputPort;

/// Width of the text bar at `BAR_MAX`.
const BAR_COLUMNS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One text bar per tick, `|` marks the peak
    Bars,
    /// `tick,bar,peak,packed`
    Csv,
    /// The raw packed word, as the display hardware sees it
    Hex,
}

/// Stands in for the display GPIO: decodes each packed word and writes it out.
///
/// Writes to a GPIO can't fail, so an I/O error is parked until [`finish`](Self::finish).
/// Nothing reaches `out` until the first word or `finish`, so a run that never
/// gets going leaves it untouched.
pub struct TraceSink<W: Write> {
    out: W,
    format: Format,
    tick: u64,
    header_pending: bool,
    error: Option<io::Error>,
}

impl<W: Write> TraceSink<W> {
    pub fn new(out: W, format: Format) -> Self {
        Self { out, format, tick: 0, header_pending: format == Format::Csv, error: None }
    }

    /// Words written so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.write_header()?;
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_header(&mut self) -> io::Result<()> {
        if self.header_pending {
            writeln!(self.out, "tick,bar,peak,packed")?;
            self.header_pending = false;
        }
        Ok(())
    }

    fn emit(&mut self, word: u32) -> io::Result<()> {
        self.write_header()?;
        let (peak, bar) = unpack(word);
        match self.format {
            Format::Bars => writeln!(self.out, "{:>6} {}", self.tick, bar_line(peak, bar)),
            Format::Csv => writeln!(self.out, "{},{},{},{:#010x}", self.tick, bar, peak, word),
            Format::Hex => writeln!(self.out, "{:#010x}", word),
        }
    }
}

impl<W: Write> DiscreteOutputPort for TraceSink<W> {
    fn write(&mut self, value: u32) {
        if self.error.is_none() {
            if let Err(err) = self.emit(value) {
                self.error = Some(err);
            }
        }
        self.tick += 1;
    }
}

fn columns(height: u32) -> usize {
    ((height.min(BAR_MAX) * BAR_COLUMNS + BAR_MAX / 2) / BAR_MAX) as usize
}

/// `[#####     |    ] bar=100 peak=200`
pub fn bar_line(peak: u32, bar: u32) -> String {
    let mut cells = vec![' '; BAR_COLUMNS as usize];
    cells[..columns(bar)].fill('#');
    if let Some(marker) = columns(peak).checked_sub(1) {
        cells[marker] = '|';
    }

    let cells: String = cells.into_iter().collect();
    format!("[{cells}] bar={bar:>3} peak={peak:>3}")
}
