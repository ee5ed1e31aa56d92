mod host;
mod render;
mod signal;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mbviz::consts::BAR_MAX;
use mbviz::meter::unpack;
use mbviz::sim::TickCounter;
use mbviz::{bring_up, Frame, InitPolicy, LoopState, Role};
use tracing::{info, warn, Level};
use tracing_subscriber::util::SubscriberInitExt;

use crate::host::{HostController, HostPort, RealtimePacer, SIM_IDS};
use crate::render::{Format, TraceSink};
use crate::signal::{parse_word, SignalPort, Waveform};

#[derive(Parser)]
#[command(name = "vizsim")]
#[command(version, about = "Run the visualizer loop against simulated hardware", long_about = None)]
struct Cli {
    /// More logging (-v info, -vv debug, -vvv every tick)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the loop with a generated or recorded volume signal
    Run(RunArgs),

    /// Split a packed output word into peak and bar heights
    Decode {
        /// Packed word, decimal or 0x hex
        word: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PortArg {
    Status,
    Volume,
    Gfx,
}

impl From<PortArg> for Role {
    fn from(port: PortArg) -> Role {
        match port {
            PortArg::Status => Role::Status,
            PortArg::Volume => Role::Volume,
            PortArg::Gfx => Role::Gfx,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Generated volume signal
    #[arg(short, long, value_enum, default_value_t = Waveform::Burst)]
    signal: Waveform,

    /// Peak of the generated signal, in raw volume units
    #[arg(short, long, default_value_t = 32_000, value_parser = parse_word)]
    level: u32,

    /// Replay raw volume words from a file (one per line) instead of generating them
    #[arg(short, long, conflicts_with = "signal")]
    input: Option<PathBuf>,

    /// Number of loop iterations
    #[arg(short, long, default_value_t = 2_000)]
    ticks: u32,

    /// Sleep one loop period between iterations, like the board
    #[arg(long)]
    realtime: bool,

    /// Trace format
    #[arg(short, long, value_enum, default_value_t = Format::Bars)]
    format: Format,

    /// Write the trace here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Switch word reported by the status port
    #[arg(long, default_value_t = 0, value_parser = parse_word)]
    status: u32,

    /// Ports that fail to initialize, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    missing: Vec<PortArg>,

    /// Refuse to start if any port fails to initialize
    #[arg(long)]
    strict: bool,
}

#[derive(Debug)]
struct Summary {
    status: u32,
    gfx_bound: bool,
    displayed: u64,
    last: Option<Frame>,
    state: LoopState,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .compact()
        .finish()
        .init();
}

fn simulate<W: Write>(args: &RunArgs, out: W) -> Result<(Summary, W)> {
    let signal = match &args.input {
        Some(path) => SignalPort::from_file(path)?,
        None => SignalPort::generated(args.signal, args.level),
    };
    let sink = TraceSink::new(out, args.format);

    let mut controller = HostController::new(args.status, signal, sink);
    for port in &args.missing {
        controller.unplug((*port).into());
    }

    let policy = if args.strict { InitPolicy::Strict } else { InitPolicy::BestEffort };
    let mut peripherals =
        bring_up(&mut controller, SIM_IDS, policy).context("bringing up the simulated board")?;

    let status = peripherals.read_status();
    info!("status switches: {:#010x}", status);
    info!("running {} ticks", args.ticks);

    let mut visualizer = peripherals.into_visualizer();
    let last = if args.realtime {
        visualizer.run_for(&mut RealtimePacer, args.ticks)
    } else {
        visualizer.run_for(&mut TickCounter::default(), args.ticks)
    };

    let (_, gfx, state) = visualizer.into_parts();
    let gfx_bound = gfx.is_live();
    let sink = match gfx.into_live() {
        Some(HostPort::Display(sink)) => sink,
        _ => {
            warn!("gfx port is unbound, nothing was displayed");
            controller.into_display().context("trace writer went missing")?
        }
    };
    let displayed = sink.ticks();
    let out = sink.finish().context("writing trace")?;

    Ok((Summary { status, gfx_bound, displayed, last, state }, out))
}

fn run(args: &RunArgs) -> Result<()> {
    let summary = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            simulate(args, BufWriter::new(file))?.0
        }
        None => simulate(args, io::stdout().lock())?.0,
    };

    match summary.last {
        Some(frame) => info!(
            "done: bar={} peak={} gravity={} displayed={} gfx_bound={} status={:#010x}",
            frame.bar_height,
            frame.peak_height,
            summary.state.gravity_counter,
            summary.displayed,
            summary.gfx_bound,
            summary.status
        ),
        None => info!("done: no ticks run"),
    }
    Ok(())
}

fn decode(word: &str) -> Result<()> {
    let word = parse_word(word)?;
    let (peak, bar) = unpack(word);
    if peak > BAR_MAX || bar > BAR_MAX {
        warn!("{:#010x} has a field above {}, the loop never emits that", word, BAR_MAX);
    }
    println!("peak={peak} bar={bar}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match &cli.command {
        Commands::Run(args) => run(args),
        Commands::Decode { word } => decode(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["vizsim", "run"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            Commands::Decode { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_cli_defaults() {
        let args = args(&[]);
        assert_eq!(args.signal, Waveform::Burst);
        assert_eq!(args.level, 32_000);
        assert_eq!(args.ticks, 2_000);
        assert_eq!(args.format, Format::Bars);
        assert!(args.missing.is_empty());
        assert!(!args.strict && !args.realtime);
    }

    #[test]
    fn test_cli_rejects_signal_with_input() {
        let result = Cli::try_parse_from(["vizsim", "run", "--signal", "sine", "--input", "x.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_missing_list() {
        let args = args(&["--missing", "volume,gfx", "--level", "0x7D00"]);
        assert_eq!(args.missing, [PortArg::Volume, PortArg::Gfx]);
        assert_eq!(args.level, 32_000);
    }

    #[test]
    fn test_simulate_constant_signal() {
        let args = args(&["--signal", "constant", "--level", "800", "--ticks", "3", "--format", "csv"]);
        let (summary, out) = simulate(&args, Vec::new()).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "tick,bar,peak,packed\n0,100,100,0x00640064\n1,100,100,0x00640064\n2,100,100,0x00640064\n"
        );
        assert!(summary.gfx_bound);
        assert_eq!(summary.state, LoopState { peak_height: 100, gravity_counter: 2 });
    }

    #[test]
    fn test_simulate_burst_decays() {
        let args = args(&["--ticks", "1000", "--format", "hex"]);
        let (summary, _) = simulate(&args, io::sink()).unwrap();

        // 20 loud ticks, then 980 quiet ones. Only one decay step fits.
        let last = summary.last.unwrap();
        assert_eq!(last.bar_height, 0);
        assert_eq!(last.peak_height, 399);
    }

    #[test]
    fn test_simulate_burst_first_decay_tick() {
        let args = args(&["--ticks", "502", "--format", "csv"]);
        let (summary, out) = simulate(&args, Vec::new()).unwrap();
        assert_eq!(summary.displayed, 502);

        // Burst ticks 1..=19 sit level with the peak, so they already count
        // towards the release: the peak drops on quiet tick 482, tick 501 overall.
        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows[19], "19,400,400,0x01900190");
        assert_eq!(rows[20], "20,0,400,0x01900000");
        assert_eq!(rows[500], "500,0,400,0x01900000");
        assert_eq!(rows[501], "501,0,399,0x018f0000");
    }

    #[test]
    fn test_simulate_best_effort_without_volume() {
        let args = args(&["--missing", "volume", "--ticks", "2", "--format", "hex", "--status", "3"]);
        let (summary, out) = simulate(&args, Vec::new()).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "0x00000000\n0x00000000\n");
        assert_eq!(summary.status, 3);
    }

    #[test]
    fn test_simulate_best_effort_without_gfx() {
        let args = args(&["--missing", "gfx", "--ticks", "5", "--format", "csv"]);
        let (summary, out) = simulate(&args, Vec::new()).unwrap();

        assert!(!summary.gfx_bound);
        assert_eq!(summary.displayed, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "tick,bar,peak,packed\n");
        assert_eq!(summary.last.unwrap().peak_height, 400);
    }

    #[test]
    fn test_simulate_strict_refuses_to_start() {
        let args = args(&["--missing", "status", "--strict", "--format", "csv"]);
        let mut out = Vec::new();
        let err = simulate(&args, &mut out).err().unwrap();
        assert_eq!(
            format!("{err:#}"),
            "bringing up the simulated board: Status GPIO init failed: GPIO device 0 is not present"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_simulate_from_file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("volume.txt");
        let output = dir.path().join("trace.csv");
        std::fs::write(&input, "3200\n0\n").unwrap();

        let args = args(&[
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--ticks",
            "2",
            "--format",
            "csv",
        ]);
        run(&args).unwrap();

        let trace = std::fs::read_to_string(&output).unwrap();
        assert_eq!(trace, "tick,bar,peak,packed\n0,400,400,0x01900190\n1,0,400,0x01900000\n");
    }

    #[test]
    fn test_decode() {
        assert!(decode("0x01900190").is_ok());
        assert!(decode("nonsense").is_err());
    }
}
