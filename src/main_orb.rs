use anyhow::{Error as E, Result};
use clap::Parser;
use soul_orb::demiurge::persona::{describe, dominant_trait, intensity};
use soul_orb::demiurge::{classify_by_quiz, classify_by_sliders, QuadrantPosition, SliderValues};
use soul_orb::initiation::session::load_script;
use soul_orb::initiation::{InitiationManager, InputEvent, OrbConfig, ScriptedEvent};
use soul_orb::orb::{FrameLoop, PngSequenceSurface};
use std::sync::atomic::Ordering;
use tracing_chrome::ChromeLayerBuilder;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run on CPU rather than on GPU.
    #[arg(long)]
    cpu: bool,

    /// Enable tracing (generates a trace-timestamp.json file).
    #[arg(long)]
    tracing: bool,

    /// Show current configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Save current parameters to config file
    #[arg(long)]
    save_config: bool,

    /// Config file (default: config/orb.json)
    #[arg(long)]
    config_file: Option<String>,

    /// Quiz answers, one option index per question, e.g. 0,1,0
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    answers: Option<Vec<i32>>,

    /// Slider positions communication,feedback,boundary, e.g. 0.2,0.9,1.4
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    sliders: Option<Vec<f64>>,

    /// Quadrant point x,y in [0, 1]
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    position: Option<Vec<f32>>,

    /// JSON file with timed input events
    #[arg(long)]
    events: Option<String>,

    /// Number of frames to render
    #[arg(long, default_value_t = 90)]
    frames: u64,

    /// Directory for the PNG sequence
    #[arg(long)]
    output: Option<String>,

    /// Number of particles
    #[arg(long)]
    particles: Option<usize>,

    /// Square surface size in pixels
    #[arg(long)]
    size: Option<u32>,

    #[arg(long)]
    fps: Option<f32>,

    /// The seed for the particle layout.
    #[arg(long)]
    seed: Option<u64>,

    /// Pace frames against the wall clock instead of rendering back to back
    #[arg(long)]
    realtime: bool,
}

fn load_config(args: &Args) -> Result<OrbConfig> {
    let config = match args.config_file.as_deref() {
        Some(path) => OrbConfig::load_from(path)?,
        None => OrbConfig::load()?,
    };
    Ok(config.merge_with_args(
        args.particles,
        args.size,
        args.fps,
        args.seed,
        args.output.clone(),
        args.cpu,
    ))
}

fn show_config(config: &OrbConfig) -> Result<()> {
    println!("Effective Configuration:");
    println!("  Particles: {}", config.particle_count);
    println!("  Seed: {}", config.seed);
    println!("  Surface: {}x{}", config.width, config.height);
    println!("  FPS: {}", config.fps);
    println!("  Shell: [{}, {}]", config.shell_inner, config.shell_outer);
    println!("  Smoothing: {}", config.smoothing);
    println!("  Point scale: {}", config.point_scale);
    println!("  Output: {}", config.output_dir);
    println!("  Force CPU: {}", config.force_cpu);
    Ok(())
}

fn save_config(args: &Args, config: &OrbConfig) -> Result<()> {
    let path = args
        .config_file
        .clone()
        .unwrap_or_else(|| soul_orb::initiation::config::DEFAULT_CONFIG_PATH.to_string());
    config.save_to(&path)?;
    println!("Configuration saved to: {}", path);
    Ok(())
}

/// События из командной строки, все при t = 0, а за ними события сценария.
fn collect_events(args: &Args) -> Result<Vec<ScriptedEvent>> {
    let mut events = Vec::new();

    if let Some(answers) = &args.answers {
        let key = classify_by_quiz(answers);
        let archetype = key.archetype();
        println!(
            "{} Quiz archetype: {} ({}) - {}",
            archetype.symbol, key, archetype.subtitle, archetype.description
        );
        events.push(ScriptedEvent {
            at: 0.0,
            event: InputEvent::QuizCompleted {
                answers: answers.clone(),
            },
        });
    }

    if let Some(sliders) = &args.sliders {
        if sliders.len() != 3 {
            anyhow::bail!("--sliders takes exactly three values, got {}", sliders.len());
        }
        let values = SliderValues::new(sliders[0], sliders[1], sliders[2]);
        let key = classify_by_sliders(&values);
        println!("🎚️ Slider archetype: {} ({})", key, key.archetype().subtitle);
        events.push(ScriptedEvent {
            at: 0.0,
            event: InputEvent::SlidersMoved { values },
        });
    }

    if let Some(position) = &args.position {
        if position.len() != 2 {
            anyhow::bail!("--position takes x,y, got {} values", position.len());
        }
        let pos = QuadrantPosition::new(position[0], position[1]);
        println!(
            "🧭 Quadrant: {} · intensity {:.2} · {}",
            dominant_trait(pos).as_str(),
            intensity(pos),
            describe(pos)
        );
        events.push(ScriptedEvent {
            at: 0.0,
            event: InputEvent::QuadrantDragged { position: pos },
        });
    }

    if let Some(path) = &args.events {
        let script = load_script(path)
            .map_err(|e| E::msg(format!("Failed to read events file {}: {}", path, e)))?;
        println!("📜 Loaded {} scripted events", script.len());
        events.extend(script);
    }

    events.sort_by(|a, b| a.at.total_cmp(&b.at));
    Ok(events)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.show_config {
        let config = load_config(&args)?;
        return show_config(&config);
    }

    if args.save_config {
        let config = load_config(&args)?;
        return save_config(&args, &config);
    }

    let _guard = if args.tracing {
        let (chrome_layer, guard) = ChromeLayerBuilder::new().build();
        tracing_subscriber::registry().with(chrome_layer).init();
        Some(guard)
    } else {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("soul_orb=info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        None
    };

    let config = load_config(&args)?;
    let events = collect_events(&args)?;

    let manager = InitiationManager::new(config)?;
    let config = manager.config().clone();
    let surface = PngSequenceSurface::new(&config.output_dir, config.width, config.height);
    let mut system = manager.init_system(surface)?;

    if let Some(orb) = system.orb.as_mut() {
        orb.start();
    }

    let frame_loop = FrameLoop::new(config.fps).realtime(args.realtime);
    let stop = frame_loop.stop_handle();
    ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;

    let mut pending = events.into_iter().peekable();
    let frames = frame_loop.run(Some(args.frames), |_, elapsed| {
        while let Some(scripted) = pending.next_if(|s| s.at <= elapsed) {
            system.events.send(scripted.event)?;
        }
        system.tick(elapsed)
    })?;

    // события после последнего кадра все равно учитываются в итоге
    for scripted in pending {
        system.events.send(scripted.event)?;
    }
    system.session.drain();

    if let Some(orb) = system.orb.as_mut() {
        let written = orb.surface().written().len();
        let dir = orb.surface().dir().display().to_string();
        orb.dispose();
        println!("🖼️ {} of {} frames written to {}", written, frames, dir);
    }

    let session = &system.session;
    match session.archetype() {
        Some(key) => println!("✨ Archetype: {} ({})", key, key.archetype().name),
        None => println!("✨ Archetype: not yet decided"),
    }
    println!("🌀 Temperament: {}", session.describe());
    println!("💎 Clarity: {:.2}", session.clarity());
    println!(
        "🎨 Orb target: {}",
        serde_json::to_string(session.target())?
    );

    Ok(())
}
