use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tilewarp::{
    BoundingMode, FilterKind, ImageSource, LatLongParams, LensDistortParams, MemoryImage,
    RenderThreading, ResampleSettings, TransformParams,
};

#[derive(Parser, Debug)]
#[command(name = "tilewarp", version)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remap a fisheye image to latitude/longitude.
    Latlong(WarpArgs),
    /// Apply or remove parametric lens distortion.
    LensDistort(WarpArgs),
    /// Apply an affine transform.
    Transform(WarpArgs),
    /// Print the lens model registry as JSON.
    Models,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BoundingChoice {
    Black,
    Clamp,
    Periodic,
}

impl From<BoundingChoice> for BoundingMode {
    fn from(c: BoundingChoice) -> Self {
        match c {
            BoundingChoice::Black => BoundingMode::Black,
            BoundingChoice::Clamp => BoundingMode::Clamp,
            BoundingChoice::Periodic => BoundingMode::Periodic,
        }
    }
}

#[derive(Parser, Debug)]
struct WarpArgs {
    /// Input image (any format the `image` crate decodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Node parameters as a JSON file; omitted fields keep their defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Reconstruction filter name, or `nearest`.
    #[arg(long, default_value = "bilinear")]
    filter: String,

    /// Filter support multiplier.
    #[arg(long, default_value_t = 1.0)]
    filter_width: f64,

    /// Behaviour outside the input data window.
    #[arg(long, value_enum, default_value_t = BoundingChoice::Black)]
    bounding_mode: BoundingChoice,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

impl WarpArgs {
    fn settings(&self) -> anyhow::Result<ResampleSettings> {
        let filter = if self.filter.eq_ignore_ascii_case("nearest") {
            None
        } else {
            Some(FilterKind::from_name(&self.filter)?)
        };
        Ok(ResampleSettings {
            filter,
            filter_width: self.filter_width,
            bounding_mode: self.bounding_mode.into(),
        })
    }

    fn params<P: serde::de::DeserializeOwned + Default>(&self) -> anyhow::Result<P> {
        let Some(path) = &self.params else {
            return Ok(P::default());
        };
        let f = std::fs::File::open(path)
            .with_context(|| format!("open params '{}'", path.display()))?;
        let r = std::io::BufReader::new(f);
        serde_json::from_reader(r).with_context(|| format!("parse params '{}'", path.display()))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Latlong(args) => {
            let params: LatLongParams = args.params()?;
            run(&args, |input, settings| {
                let node: Arc<dyn ImageSource> =
                    Arc::new(tilewarp::lat_long(input, params, settings)?);
                Ok(node)
            })
        }
        Command::LensDistort(args) => {
            let params: LensDistortParams = args.params()?;
            run(&args, |input, settings| {
                let node: Arc<dyn ImageSource> =
                    Arc::new(tilewarp::lens_distort(input, params, settings)?);
                Ok(node)
            })
        }
        Command::Transform(args) => {
            let params: TransformParams = args.params()?;
            run(&args, |input, settings| {
                let node: Arc<dyn ImageSource> =
                    Arc::new(tilewarp::transform(input, params, settings)?);
                Ok(node)
            })
        }
        Command::Models => cmd_models(),
    }
}

fn run(
    args: &WarpArgs,
    build: impl FnOnce(Arc<dyn ImageSource>, ResampleSettings) -> anyhow::Result<Arc<dyn ImageSource>>,
) -> anyhow::Result<()> {
    let input = load(&args.in_path)?;
    let node = build(Arc::new(input), args.settings()?)?;
    let threading = RenderThreading {
        parallel: true,
        threads: args.threads,
    };
    let out = tilewarp::render_image(node.as_ref(), &threading)?;
    save(&out, &args.out)?;
    tracing::info!(path = %args.out.display(), "wrote output");
    Ok(())
}

fn load(path: &Path) -> anyhow::Result<MemoryImage> {
    let img = image::open(path).with_context(|| format!("read image '{}'", path.display()))?;
    Ok(MemoryImage::from_dynamic_image(&img)?)
}

fn save(img: &MemoryImage, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.to_rgba8()?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_models() -> anyhow::Result<()> {
    let models = tilewarp::list_models()
        .iter()
        .map(|info| {
            let lens = tilewarp::create_lens_model(info.id)?;
            Ok(serde_json::json!({
                "id": info.id,
                "name": info.name,
                "parameters": lens.parameters(),
            }))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    println!("{}", serde_json::to_string_pretty(&models)?);
    Ok(())
}
