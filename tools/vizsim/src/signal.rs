use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use mbviz::DiscreteInputPort;

const RAMP_TICKS: u64 = 200;
const BURST_ON_TICKS: u64 = 20;
const BURST_EVERY_TICKS: u64 = 1_000;
const SINE_PERIOD_TICKS: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Waveform {
    /// Always zero
    Silence,
    /// Always `level`
    Constant,
    /// Sawtooth from 0 to `level` every 200 ticks
    Ramp,
    /// `level` for 20 ticks out of every 1000, zero otherwise
    Burst,
    /// Rectified sine peaking at `level`, 400 ticks per cycle
    Sine,
}

enum Source {
    Generated { waveform: Waveform, level: u32 },
    Recorded(Vec<u32>),
}

/// Stands in for the volume GPIO. Each read is one loop tick.
pub struct SignalPort {
    source: Source,
    tick: u64,
}

impl SignalPort {
    pub fn generated(waveform: Waveform, level: u32) -> Self {
        Self { source: Source::Generated { waveform, level }, tick: 0 }
    }

    /// Replays `samples`, then holds the last one.
    pub fn recorded(samples: Vec<u32>) -> Result<Self> {
        if samples.is_empty() {
            bail!("recorded signal has no samples");
        }
        Ok(Self { source: Source::Recorded(samples), tick: 0 })
    }

    /// One word per line, decimal or `0x` hex. Blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading volume samples from {}", path.display()))?;

        let mut samples = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let word = parse_word(line)
                .with_context(|| format!("{}:{}", path.display(), number + 1))?;
            samples.push(word);
        }

        Self::recorded(samples).with_context(|| format!("{} is empty", path.display()))
    }

    pub fn sample(&self, tick: u64) -> u32 {
        match &self.source {
            Source::Generated { waveform, level } => generate(*waveform, *level, tick),
            Source::Recorded(samples) => {
                let idx = usize::try_from(tick).unwrap_or(usize::MAX).min(samples.len() - 1);
                samples[idx]
            }
        }
    }
}

impl DiscreteInputPort for SignalPort {
    fn read(&mut self) -> u32 {
        let value = self.sample(self.tick);
        self.tick += 1;
        value
    }
}

fn generate(waveform: Waveform, level: u32, tick: u64) -> u32 {
    let level64 = level as u64;
    match waveform {
        Waveform::Silence => 0,
        Waveform::Constant => level,
        Waveform::Ramp => ((tick % RAMP_TICKS) * level64 / (RAMP_TICKS - 1)) as u32,
        Waveform::Burst => {
            if tick % BURST_EVERY_TICKS < BURST_ON_TICKS { level } else { 0 }
        }
        Waveform::Sine => {
            let phase = 2.0 * PI * (tick as f64) / SINE_PERIOD_TICKS;
            (level as f64 * phase.sin().abs()).round() as u32
        }
    }
}

/// Parse a 32-bit word written as decimal or `0x` hex. Underscores are allowed.
pub fn parse_word(text: &str) -> Result<u32> {
    let cleaned = text.trim().replace('_', "");
    let parsed = match cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => cleaned.parse::<u32>(),
    };
    parsed.with_context(|| format!("`{}` is not a 32-bit word", text.trim()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_word() {
        assert_eq!(parse_word("32000").unwrap(), 32_000);
        assert_eq!(parse_word(" 0x0190_0190 ").unwrap(), 0x0190_0190);
        assert_eq!(parse_word("0XFF").unwrap(), 255);
        assert!(parse_word("-1").is_err());
        assert!(parse_word("0x1_0000_0000").is_err());
        assert!(parse_word("loud").is_err());
    }

    #[test]
    fn test_burst_shape() {
        let mut port = SignalPort::generated(Waveform::Burst, 500);
        let samples: Vec<u32> = (0..1_050).map(|_| port.read()).collect();
        assert!(samples[..20].iter().all(|&s| s == 500));
        assert!(samples[20..1_000].iter().all(|&s| s == 0));
        assert!(samples[1_000..1_020].iter().all(|&s| s == 500));
        assert_eq!(samples[1_020], 0);
    }

    #[test]
    fn test_ramp_reaches_level_and_wraps() {
        let port = SignalPort::generated(Waveform::Ramp, 3_980);
        assert_eq!(port.sample(0), 0);
        assert_eq!(port.sample(199), 3_980);
        assert_eq!(port.sample(200), 0);
        assert!(port.sample(100) > port.sample(50));
    }

    #[test]
    fn test_sine_is_rectified() {
        let port = SignalPort::generated(Waveform::Sine, 1_000);
        assert_eq!(port.sample(0), 0);
        assert_eq!(port.sample(100), 1_000);
        assert_eq!(port.sample(300), 1_000);
        assert_eq!(port.sample(200), 0);
    }

    #[test]
    fn test_recorded_holds_last_sample() {
        let mut port = SignalPort::recorded(vec![1, 2]).unwrap();
        assert_eq!([port.read(), port.read(), port.read()], [1, 2, 2]);
        assert!(SignalPort::recorded(Vec::new()).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# captured from the looper").unwrap();
        writeln!(file, "0").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "0x7D00  # loud").unwrap();
        writeln!(file, "800").unwrap();

        let mut port = SignalPort::from_file(file.path()).unwrap();
        assert_eq!([port.read(), port.read(), port.read(), port.read()], [0, 32_000, 800, 800]);
    }

    #[test]
    fn test_from_file_reports_bad_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "12\nnope").unwrap();

        let err = SignalPort::from_file(file.path()).err().unwrap();
        assert!(format!("{err:#}").contains(":2"));
    }
}
