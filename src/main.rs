use clap::{Args, Parser, Subcommand};
use dotglobe::cities::{builtin_cities, load_cities, random_routes, Route};
use dotglobe::config::GlobeConfig;
use dotglobe::field::{generate_dot_field, MAX_DOT_DENSITY, MAX_ROWS};
use dotglobe::geo::GeoPoint;
use dotglobe::globe::{load_mask, Globe};
use dotglobe::render::{BrailleRenderer, Renderer};
use dotglobe::settings::Settings;
use dotglobe::terminal::Terminal;
use dotglobe::{app, logging};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "dotglobe")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "dotglobe: rotating dotted globe with animated arcs between cities", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs to this file (the interactive view only logs to a file)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the animated globe (hover an arc to see its route)
    Run {
        #[command(flatten)]
        globe: GlobeArgs,

        /// Animation speed (seconds per frame)
        #[arg(short, long)]
        time: Option<f32>,
    },

    /// Print a single frame to stdout (no interactive display)
    Print {
        #[command(flatten)]
        globe: GlobeArgs,

        /// Output width in columns (defaults to the terminal width)
        #[arg(long)]
        width: Option<u16>,

        /// Output height in rows (defaults to the terminal height)
        #[arg(long)]
        height: Option<u16>,

        /// Frames to simulate before printing
        #[arg(short, long, default_value = "120")]
        frames: u32,
    },

    /// Generate the dot field and report on it
    Field {
        #[command(flatten)]
        globe: GlobeArgs,

        /// Emit JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Include every dot position in the JSON output
        #[arg(long, requires = "json")]
        points: bool,
    },
}

#[derive(Args)]
struct GlobeArgs {
    /// Land mask image: path, file:// or http(s):// URL
    #[arg(short, long)]
    mask: Option<String>,

    /// City dataset (JSON array of {city, country, lat, long})
    #[arg(short, long)]
    cities: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Latitude bands in the dot field
    #[arg(short, long)]
    rows: Option<u32>,

    /// Dots per unit of band circumference
    #[arg(short, long)]
    density: Option<f64>,

    /// Maximum number of arcs shown at once
    #[arg(short = 'p', long)]
    max_paths: Option<usize>,
}

impl GlobeArgs {
    /// Defaults, then the settings file, then the command line
    fn config(&self) -> GlobeConfig {
        let mut config = GlobeConfig::default();
        Settings::load().globe.apply(&mut config);

        if let Some(mask) = &self.mask {
            config.mask = Some(mask.clone());
        }
        if let Some(cities) = &self.cities {
            config.cities = Some(cities.clone());
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(rows) = self.rows {
            config.rows = rows.clamp(1, MAX_ROWS);
        }
        if let Some(density) = self.density {
            config.dot_density = density.clamp(0.0, MAX_DOT_DENSITY);
        }
        if let Some(max_paths) = self.max_paths {
            config.max_paths = max_paths;
        }
        config
    }
}

fn routes(config: &GlobeConfig) -> dotglobe::Result<Vec<Route>> {
    let cities = match &config.cities {
        Some(path) => load_cities(path)?,
        None => builtin_cities(),
    };
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let routes = random_routes(&cities, config.route_count, &mut rng);
    info!(cities = cities.len(), routes = routes.len(), "route pool ready");
    Ok(routes)
}

#[derive(Serialize)]
struct FieldReport {
    rows: u32,
    density: f64,
    radius: f64,
    mask_width: usize,
    mask_height: usize,
    coverage: f64,
    dots: usize,
    bands: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    points: Option<Vec<GeoPoint>>,
}

fn field_report(config: &GlobeConfig, json: bool, points: bool) -> dotglobe::Result<()> {
    let mask = load_mask(config)?;
    let params = config.field_params();
    let field = generate_dot_field(&mask, &params);

    let report = FieldReport {
        rows: params.rows,
        density: params.density,
        radius: params.radius,
        mask_width: mask.width(),
        mask_height: mask.height(),
        coverage: mask.coverage(),
        dots: field.len(),
        bands: field.bands().len(),
        points: points.then(|| field.points().to_vec()),
    };

    if json {
        let text = serde_json::to_string_pretty(&report).map_err(io::Error::from)?;
        println!("{text}");
    } else {
        println!("mask      {}x{} ({:.1}% land)", report.mask_width, report.mask_height, report.coverage * 100.0);
        println!("bands     {}", report.bands);
        println!("dots      {}", report.dots);
        println!("density   {}", report.density);
    }
    Ok(())
}

fn print_frame(config: GlobeConfig, width: Option<u16>, height: Option<u16>, frames: u32) -> dotglobe::Result<()> {
    let (term_w, term_h) = crossterm::terminal::size().unwrap_or((80, 24));
    let (w, h) = (width.unwrap_or(term_w).max(1), height.unwrap_or(term_h).max(1));

    let frame_time = config.frame_duration();
    let routes = routes(&config)?;
    let mut globe = Globe::load(config, routes)?;
    globe.resize(w, h);

    let start = Instant::now();
    for frame in 0..frames {
        globe.update(start + frame_time * frame);
    }

    let mut renderer = BrailleRenderer::offscreen(Terminal::offscreen(w, h));
    renderer.render(&globe, globe.camera())?;
    renderer.terminal().write_ansi(&mut stdout().lock())?;
    Ok(())
}

fn run(cli: Cli) -> dotglobe::Result<()> {
    match cli.command {
        Commands::Run { globe, time } => {
            if let Some(path) = &cli.log_file {
                logging::init_file(path, cli.verbose)?;
            }
            let mut config = globe.config();
            if let Some(time) = time {
                config.frame_time = time;
            }
            let routes = routes(&config)?;
            let globe = Globe::load(config, routes)?;
            app::run_interactive(globe)?;
        }
        Commands::Print { globe, width, height, frames } => {
            logging::init_stderr(cli.verbose);
            print_frame(globe.config(), width, height, frames)?;
        }
        Commands::Field { globe, json, points } => {
            logging::init_stderr(cli.verbose);
            field_report(&globe.config(), json, points)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dotglobe: {e}");
            ExitCode::FAILURE
        }
    }
}
