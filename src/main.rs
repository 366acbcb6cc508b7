//! Command-line entry point for constellation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use url::Url;

use constellation::config::SiteConfig;
use constellation::dom::{Dom, MemoryDom};
use constellation::driver::{FrameLoop, StopToken};
use constellation::error::ComposeError;
use constellation::field::{FrameContext, ParticleField, Variant};
use constellation::loader::{DirectorySource, FragmentSource, HttpSource};
use constellation::page::{boot, BootOutcome, PageContext, Widgets};
use constellation::surface::{Frame, FrameStats};
use constellation::time::ManualTimers;
use constellation::window::{self, ViewerOptions};
use constellation::Vec2;

#[derive(Parser)]
#[command(name = "constellation")]
#[command(about = "Particle backgrounds, carousels and page boot for the club website", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Site configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a window showing a particle field
    View {
        /// constellation or tech-grid
        #[arg(long, default_value = "constellation")]
        variant: Variant,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Run a field headless and report line statistics
    Simulate {
        #[arg(long, default_value = "constellation")]
        variant: Variant,

        #[arg(long, default_value_t = 600)]
        frames: u64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value_t = 1280.0)]
        width: f32,

        #[arg(long, default_value_t = 720.0)]
        height: f32,

        /// Keep the pointer outside the viewport
        #[arg(long)]
        no_pointer: bool,

        /// Pace frames to this rate instead of running flat out
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        fps: Option<u32>,
    },

    /// Boot a page file and print what each step found
    Compose {
        /// Page HTML file
        page: PathBuf,

        /// Site directory fragments are read from (defaults to the page's directory)
        #[arg(long, conflicts_with = "base")]
        root: Option<PathBuf>,

        /// Base URL fragments are fetched from
        #[arg(long)]
        base: Option<Url>,

        /// Write the composed HTML here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Vertical scroll offset used for the navbar chrome
        #[arg(long, default_value_t = 0.0)]
        scroll: f64,
    },
}

/// Default log filter for a `-v` count. `RUST_LOG` still overrides it.
fn level_for(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(level_for(cli.verbose))
        .parse_env(env_logger::Env::default())
        .init();

    let config = match &cli.config {
        Some(path) => SiteConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SiteConfig::default(),
    };

    match cli.command {
        Commands::View { variant, seed } => view(&config, variant, seed),
        Commands::Simulate {
            variant,
            frames,
            seed,
            width,
            height,
            no_pointer,
            fps,
        } => simulate(&config, variant, frames, seed, Vec2::new(width, height), !no_pointer, fps),
        Commands::Compose {
            page,
            root,
            base,
            output,
            scroll,
        } => compose(&config, &page, root, base, output, scroll),
    }
}

fn view(config: &SiteConfig, variant: Variant, seed: u64) -> Result<()> {
    let options = ViewerOptions {
        title: format!("constellation - {}", variant),
        config: config.field(variant).clone(),
        seed,
        ..Default::default()
    };
    window::run(options, StopToken::new()).context("running viewer")?;
    Ok(())
}

/// Frame loop for `simulate`, paced when a rate is given.
fn frame_loop(fps: Option<u32>) -> FrameLoop {
    match fps {
        Some(fps) if fps > 0 => FrameLoop::new().with_frame_interval(Duration::from_secs_f64(1.0 / f64::from(fps))),
        _ => FrameLoop::new(),
    }
}

fn simulate(
    config: &SiteConfig,
    variant: Variant,
    frames: u64,
    seed: u64,
    viewport: Vec2,
    pointer: bool,
    fps: Option<u32>,
) -> Result<()> {
    anyhow::ensure!(viewport.x > 0.0 && viewport.y > 0.0, "viewport must be positive, got {viewport}");

    let mut field = ParticleField::new(config.field(variant).clone(), viewport, seed);
    let mut frame = Frame::new();
    let mut totals = FrameStats::default();
    let mut peak_connections = 0;

    let stop = StopToken::new();
    let started = Instant::now();
    let ran = frame_loop(fps).run_frames(frames, &stop, |i| {
        // The pointer circles the centre, a third of the shorter side out.
        let ctx = FrameContext::new(viewport).with_pointer(pointer.then(|| {
            let angle = i as f32 * 0.02;
            viewport / 2.0 + Vec2::from_angle(angle) * (viewport.min_element() / 3.0)
        }));
        let stats = field.step(&ctx, &mut frame);
        totals.particles += stats.particles;
        totals.connections += stats.connections;
        totals.pointer_lines += stats.pointer_lines;
        peak_connections = peak_connections.max(stats.connections);
    });

    let per_frame = |n: usize| if ran == 0 { 0.0 } else { n as f64 / ran as f64 };
    println!("variant:          {}", variant);
    println!("viewport:         {}x{}", viewport.x, viewport.y);
    println!("frames:           {}", ran);
    println!("particles:        {}", field.len());
    println!("connections/frame: {:.1} (peak {})", per_frame(totals.connections), peak_connections);
    println!("pointer lines/frame: {:.1}", per_frame(totals.pointer_lines));
    log::info!("simulated {} frames in {:.2?}", ran, started.elapsed());
    Ok(())
}

fn compose(
    config: &SiteConfig,
    page: &Path,
    root: Option<PathBuf>,
    base: Option<Url>,
    output: Option<PathBuf>,
    scroll: f64,
) -> Result<()> {
    let html = fs::read_to_string(page).map_err(|source| ComposeError::Io {
        path: page.to_path_buf(),
        source,
    })?;
    let file_name = page
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ComposeError::Location(page.to_path_buf()))?;

    // The page is treated as served, so boot takes the fragment path rather
    // than the file:// redirect.
    let (source, location): (Box<dyn FragmentSource>, Url) = match base {
        Some(base) => {
            let location = base
                .join(file_name)
                .map_err(|_| ComposeError::Location(page.to_path_buf()))?;
            (Box::new(HttpSource::new(base).map_err(ComposeError::from)?), location)
        }
        None => {
            let root = match root {
                Some(root) => root,
                None => page.parent().map(Path::to_path_buf).unwrap_or_default(),
            };
            let location = config
                .dev_server_url()?
                .join(file_name)
                .map_err(|_| ComposeError::Location(page.to_path_buf()))?;
            (Box::new(DirectorySource::new(root)), location)
        }
    };

    let mut dom = MemoryDom::parse_document(&html);
    let ctx = PageContext::new(location).with_scroll(scroll);
    let report = match boot(&mut dom, source.as_ref(), config, &ctx)? {
        BootOutcome::Redirect(target) => {
            println!("redirect: {}", target);
            return Ok(());
        }
        BootOutcome::Booted(report) => report,
    };

    let mut timers = ManualTimers::new();
    let widgets = Widgets::mount(&mut dom, &mut timers, config);

    println!("page:         {}", report.page);
    println!("navbar:       {}", if report.navbar_loaded { "loaded" } else { "error panel" });
    println!("footer:       {}", if report.footer_loaded { "loaded" } else { "error panel" });
    match report.chrome {
        Some(chrome) => println!("chrome:       {:?}", chrome),
        None => println!("chrome:       no nav"),
    }
    match report.mobile_menu {
        Some(menu) => println!("mobile menu:  {:?}", menu),
        None => println!("mobile menu:  absent"),
    }
    println!("active links: {}", report.active_links);
    println!("year:         {}", if report.year_stamped { ctx.year.to_string() } else { "absent".into() });
    println!("carousels:    {}", widgets.carousels().len());
    for carousel in widgets.carousels() {
        let id = dom.attribute(carousel.container(), "id").unwrap_or_default();
        println!(
            "  #{}: {} slides, {:?}",
            id,
            carousel.original_count(),
            carousel.state()
        );
    }
    println!("slider tabs:  {}", if widgets.tabs().is_some() { "yes" } else { "no" });
    for variant in [Variant::Constellation, Variant::TechGrid] {
        if dom.element_by_id(variant.canvas_id()).is_some() {
            println!("field canvas: #{} ({})", variant.canvas_id(), variant);
        }
    }

    if let Some(output) = output {
        fs::write(&output, dom.to_html()).with_context(|| format!("writing {}", output.display()))?;
        log::info!("wrote {}", output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), log::LevelFilter::Warn);
        assert_eq!(level_for(1), log::LevelFilter::Info);
        assert_eq!(level_for(2), log::LevelFilter::Debug);
        assert_eq!(level_for(3), log::LevelFilter::Trace);
        assert_eq!(level_for(u8::MAX), log::LevelFilter::Trace);
    }

    #[test]
    fn test_verbose_flag_counts_after_subcommand() {
        let cli = Cli::try_parse_from(["constellation", "simulate", "-vv"]).unwrap();
        assert_eq!(level_for(cli.verbose), log::LevelFilter::Debug);
    }

    #[test]
    fn test_fps_sets_frame_interval() {
        assert_eq!(frame_loop(None).frame_interval(), None);
        assert_eq!(frame_loop(Some(50)).frame_interval(), Some(Duration::from_millis(20)));

        let cli = Cli::try_parse_from(["constellation", "simulate", "--fps", "30"]).unwrap();
        let Commands::Simulate { fps, .. } = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(fps, Some(30));
        assert!(Cli::try_parse_from(["constellation", "simulate", "--fps", "0"]).is_err());
    }
}
