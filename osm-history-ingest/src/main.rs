use clap::Parser;
use mimalloc::MiMalloc;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

use osm_history_spatial::{CopyFileSink, ImportConfig, ImportError, Importer, StoreKind};

mod input;

use input::NdjsonObjects;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_FILTER: &str = "osm_history_ingest=info,osm_history_spatial=info";
const STORE_ERROR_MODULES: &str =
    "osm_history_spatial::point_store=debug,osm_history_spatial::assembler=debug";

fn init_logging(args: &Args) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.debug {
            EnvFilter::new("debug")
        } else if args.store_errors {
            EnvFilter::new(format!("{DEFAULT_FILTER},{STORE_ERROR_MODULES}"))
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr),
    );

    let _ = tracing::dispatcher::set_global_default(tracing::Dispatch::new(subscriber));
}

#[derive(Parser)]
#[command(
    name = "osm-history-ingest",
    about = "Import an OSM full-history dump into validity-interval table files"
)]
struct Args {
    /// NDJSON history file sorted by type, id and version ("-" for stdin)
    input: PathBuf,

    /// TOML file with import settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Point store backing: dense (alias stl) or sparse
    #[arg(long, visible_alias = "nodestore")]
    store: Option<StoreKind>,

    /// Table name prefix for the output files
    #[arg(long)]
    prefix: Option<String>,

    /// Directory for the table files
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Calculate the interior point of areas
    #[arg(long)]
    interior: bool,

    /// Keep lon/lat coordinates instead of projecting to web mercator
    #[arg(long, visible_alias = "latlon")]
    latlng: bool,

    /// Log everything at debug level
    #[arg(long)]
    debug: bool,

    /// Log point store misses and skipped geometries
    #[arg(long)]
    store_errors: bool,
}

fn load_config(path: &Path) -> Result<ImportConfig, ImportError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ImportError::Config(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&text)
        .map_err(|e| ImportError::Config(format!("invalid config {}: {e}", path.display())))
}

fn build_config(args: &Args) -> Result<ImportConfig, ImportError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ImportConfig::default(),
    };
    if let Some(store) = args.store {
        config = config.with_store(store);
    }
    if let Some(prefix) = &args.prefix {
        config = config.with_prefix(prefix.clone());
    }
    if let Some(dir) = &args.out_dir {
        config = config.with_out_dir(dir.clone());
    }
    if args.interior {
        config = config.with_interior(true);
    }
    if args.latlng {
        config = config.with_keep_lat_lng(true);
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(args)?;
    info!(
        input = %args.input.display(),
        store = ?config.store,
        prefix = %config.prefix,
        out_dir = %config.out_dir.display(),
        interior = config.interior,
        keep_lat_lng = config.keep_lat_lng,
        "starting import"
    );

    let reader = input::open(&args.input)
        .map_err(|e| ImportError::Config(format!("cannot open {}: {e}", args.input.display())))?;
    let sink = CopyFileSink::create(&config.out_dir, &config.prefix)?;

    let start = Instant::now();
    let mut importer = Importer::new(&config, sink);
    let stats = importer.run(NdjsonObjects::new(reader))?;

    let elapsed = start.elapsed().as_secs_f64();
    info!(
        nodes = stats.nodes,
        ways = stats.ways,
        relations = stats.relations,
        point_rows = stats.point_rows,
        line_rows = stats.line_rows,
        area_rows = stats.area_rows,
        minor_rows = stats.minor_rows,
        deletion_rows = stats.deletion_rows,
        skipped = stats.skipped,
        elapsed_s = %format!("{elapsed:.2}"),
        "done"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args);

    if let Err(e) = run(&args) {
        error!(error = %e, "import failed");
        return Err(e);
    }
    Ok(())
}
