use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "shoreline", version)]
struct Cli {
    /// Log debug events to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the snapshot sequence of a lake.
    Info(LakeArgs),
    /// Render one snapshot as a PNG.
    Frame(FrameArgs),
    /// Simulate autoplay and print the positions it visits.
    Play(PlayArgs),
    /// Export the snapshots from a start position to the end as an animated GIF.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct LakeArgs {
    /// Directory holding `<lake>.json` snapshot files.
    #[arg(long = "in")]
    in_dir: PathBuf,

    /// Lake identifier.
    #[arg(long)]
    lake: String,

    /// View options JSON. Defaults apply to missing fields.
    #[arg(long)]
    opts: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct StartArgs {
    /// Sequence position (0-based).
    #[arg(long)]
    position: Option<usize>,

    /// Snapshot date (YYYY-MM-DD); falls back to the nearest earlier snapshot.
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    lake: LakeArgs,

    #[command(flatten)]
    start: StartArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    lake: LakeArgs,

    /// Position to start from.
    #[arg(long, default_value_t = 0)]
    from: usize,

    /// Number of autoplay ticks to simulate.
    #[arg(long, default_value_t = 10)]
    ticks: u32,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    lake: LakeArgs,

    #[command(flatten)]
    start: StartArgs,

    /// Directory the GIF is written into.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_opts(path: Option<&Path>) -> anyhow::Result<shoreline::ShorelineOpts> {
    let opts = match path {
        Some(p) => shoreline::ShorelineOpts::from_json_file(p)
            .with_context(|| format!("load opts '{}'", p.display()))?,
        None => shoreline::ShorelineOpts::default(),
    };
    Ok(opts.with_env_overrides())
}

fn load_view(args: &LakeArgs) -> anyhow::Result<shoreline::LakeView> {
    let opts = read_opts(args.opts.as_deref())?;
    let source = shoreline::JsonSnapshotSource::new(&args.in_dir);
    let view = shoreline::LakeView::load(&args.lake, &source, opts)
        .with_context(|| format!("load lake '{}'", args.lake))?;
    Ok(view)
}

fn move_to_start(view: &mut shoreline::LakeView, start: &StartArgs) -> anyhow::Result<usize> {
    if let Some(date) = &start.date {
        let date = shoreline::parse_date(date)?;
        return Ok(view.scrub_to_date(date)?);
    }
    let position = start.position.unwrap_or(0);
    view.scrub(position)?;
    Ok(position)
}

fn cmd_info(args: LakeArgs) -> anyhow::Result<()> {
    let view = load_view(&args)?;
    let seq = view.sequence();
    println!("lake: {}", view.lake_id());
    println!("snapshots: {}", seq.len());
    if let Some((first, last)) = seq.date_span() {
        println!("span: {first} .. {last}");
    }
    for (position, snap) in seq.snapshots().iter().enumerate() {
        let points = snap.polygon.as_ref().map_or(0, |r| r.len());
        println!("{position:>5}  {}  {points} points", snap.date);
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut view = load_view(&args.lake)?;
    let position = move_to_start(&mut view, &args.start)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let frame = view.surface().snapshot().to_straight();
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} (position {position}, {:?})",
        args.out.display(),
        view.frame()
    );
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut view = load_view(&args.lake)?;
    view.scrub(args.from)?;
    match view.play() {
        shoreline::PlayOutcome::Started => {}
        other => anyhow::bail!("autoplay did not start: {other:?}"),
    }

    let period = view.opts().tick_period();
    for _ in 0..args.ticks {
        view.advance(period)?;
        if let Some(snap) = view.current_snapshot() {
            println!("{:>5}  {}", view.position().unwrap_or(0), snap.date);
        }
    }
    view.pause();
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut view = load_view(&args.lake)?;
    let position = move_to_start(&mut view, &args.start)?;

    let mut sink = shoreline::DirExportSink::new(&args.out_dir);
    let report = view.export_from(position, &mut sink)?;

    let path = sink
        .last_path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| args.out_dir.join(&report.file_name));
    eprintln!(
        "wrote {} ({} frames, {} bytes)",
        path.display(),
        report.frames,
        report.bytes
    );
    Ok(())
}
