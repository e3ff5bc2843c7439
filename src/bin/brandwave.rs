use std::fs::File;
use std::io::{BufReader, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use brandwave::{
    Engine, EngineOpts, GenerationOptions, NestingRatios, ParamMap, PresetMap, RenderRequest,
    RenderStatus, WaveGenerator,
};

#[derive(Parser, Debug)]
#[command(name = "brandwave", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one logo as a PNG.
    Render(RenderArgs),
    /// List known templates.
    List(ListArgs),
    /// Dump generated wave layers as JSON.
    Points(PointsArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Template id.
    #[arg(long)]
    template: String,

    /// Parameter JSON (flat, or grouped under core/style/custom/content).
    #[arg(long)]
    params: Option<PathBuf>,

    /// Override one parameter; the value is read as JSON when it parses, else as text.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    sets: Vec<String>,

    #[arg(long, default_value_t = 512)]
    width: u32,

    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Animation time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    #[arg(long)]
    seed: Option<String>,

    /// Color theme id applied over the parameters.
    #[arg(long)]
    theme: Option<String>,

    /// Directory of template documents.
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Directory of template documents.
    #[arg(long)]
    templates: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PointsArgs {
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    #[arg(long, default_value_t = 400.0)]
    height: f64,

    /// Samples per layer.
    #[arg(long, default_value_t = 100)]
    resolution: usize,

    #[arg(long, default_value_t = 0.0)]
    time: f64,

    #[arg(long)]
    seed: Option<String>,

    /// Emit a container wave with a small wave along each segment.
    #[arg(long)]
    nested: bool,

    /// Override one wave parameter, e.g. `amplitude=80`.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    sets: Vec<String>,

    /// Output JSON path (stdout when absent).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::List(args) => cmd_list(args),
        Command::Points(args) => cmd_points(args),
    }
}

fn engine_opts(templates: Option<PathBuf>) -> anyhow::Result<EngineOpts> {
    let mut opts = EngineOpts::from_env().context("read BRANDWAVE_* environment")?;
    if templates.is_some() {
        opts.template_dir = templates;
    }
    Ok(opts)
}

fn read_params(path: &Path) -> anyhow::Result<ParamMap> {
    let f = File::open(path).with_context(|| format!("open params '{}'", path.display()))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse params '{}'", path.display()))?;
    Ok(brandwave::flatten_parameters(&value))
}

fn apply_sets(params: &mut ParamMap, sets: &[String]) -> anyhow::Result<()> {
    for set in sets {
        let (key, raw) = set
            .split_once('=')
            .with_context(|| format!("--set '{set}' is not KEY=VALUE"))?;
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()));
        params.insert(key.trim(), value);
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let engine = Engine::new(engine_opts(args.templates)?)?;

    let mut params = match &args.params {
        Some(path) => read_params(path)?,
        None => ParamMap::new(),
    };
    if let Some(id) = &args.theme {
        let theme =
            brandwave::find_theme(id).with_context(|| format!("unknown theme '{id}'"))?;
        brandwave::apply_theme(&mut params, theme);
    }
    apply_sets(&mut params, &args.sets)?;

    let mut req = RenderRequest::new(&args.template, args.width, args.height)
        .with_params(params)
        .with_time(args.time);
    if let Some(seed) = &args.seed {
        req = req.with_seed(seed);
    }

    let outcome = engine.render(&req);
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    outcome.frame.save_png(&args.out)?;

    match outcome.status {
        RenderStatus::Rendered => {
            eprintln!("wrote {}", args.out.display());
            Ok(())
        }
        RenderStatus::Fallback(err) => Err(anyhow::Error::new(err).context(format!(
            "template '{}' failed; wrote the error frame to {}",
            args.template,
            args.out.display()
        ))),
    }
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let engine = Engine::new(engine_opts(args.templates)?)?;
    let presets = PresetMap::builtin();
    let mut stdout = std::io::stdout().lock();
    for meta in engine.registry().list_all() {
        let kind = if presets.is_registered(&meta.id) {
            "preset"
        } else {
            "document"
        };
        writeln!(stdout, "{}\t{}\t{kind}", meta.id, meta.name)?;
    }
    Ok(())
}

fn cmd_points(args: PointsArgs) -> anyhow::Result<()> {
    let mut params = ParamMap::new();
    apply_sets(&mut params, &args.sets)?;
    let wave = brandwave::wave_parameters_from(&params);
    let mut generator = WaveGenerator::new(wave, args.seed.as_deref());
    let opts = GenerationOptions::new(args.width, args.height, args.resolution).with_time(args.time);

    let json = if args.nested {
        serde_json::to_string_pretty(&generator.generate_nested(&opts, &NestingRatios::default()))?
    } else {
        serde_json::to_string_pretty(&generator.generate(&opts))?
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
