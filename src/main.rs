use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossbeam_channel::select;
use dialoguer::Select;
use tracing::{error, info, warn};

use measureplay_rs::audio::{AudioSubscriber, RecordingSink, render_tones, write_wav};
use measureplay_rs::baseline::{IndependentSampler, group_marginals};
use measureplay_rs::dataset::Dataset;
use measureplay_rs::decoder::Decoder;
use measureplay_rs::error::{EngineError, Result};
use measureplay_rs::playback::{
    ChannelSubscriber, PlaybackController, PlaybackMessage, PlaybackRequest, PlaybackState,
};
use measureplay_rs::sampling::{
    SampleSizePolicy, Sampler, WeightedSampler, draw_without_replacement, seeded_source,
};
use measureplay_rs::ui::progress::{ProgressManager, ProgressSubscriber, templates};
use measureplay_rs::ui::{format_draw, format_event, print_banner, shade};
use measureplay_rs::utils::consts::*;
use measureplay_rs::utils::logging::init_logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dataset JSON (defaults to the bundled demo)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Seed for reproducible draws
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play draws one by one in real time
    Measure {
        #[arg(default_value = "ghz6")]
        distribution: String,
        #[arg(long, default_value = "poem")]
        decoder: String,
        #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_COUNT)]
        count: usize,
        /// Milliseconds between draws
        #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
        interval: u64,
        /// Play the correlation-free baseline instead of the measured data
        #[arg(long)]
        classical: bool,
        /// Also print each draw as a row of pixel intensities
        #[arg(long)]
        pixels: bool,
        /// Render the voiced draws to a WAV file
        #[arg(long)]
        wav: Option<PathBuf>,
    },
    /// Gallery of distinct outcomes, without replacement
    Review {
        #[arg(default_value = "ghz6")]
        distribution: String,
        #[arg(long, default_value = "poem")]
        decoder: String,
        #[arg(short = 'n', long, default_value_t = DEFAULT_REVIEW_SIZE)]
        count: usize,
        /// Return every outcome when fewer than requested exist
        #[arg(long)]
        clamp: bool,
    },
    /// Measured draws next to the classical baseline
    Compare {
        #[arg(default_value = "ghz6")]
        distribution: String,
        #[arg(long, default_value = "poem")]
        decoder: String,
        #[arg(short = 'n', long, default_value_t = 2000)]
        count: usize,
    },
    /// Step through an angle sweep
    Interfere {
        #[arg(default_value = "interference")]
        sweep: String,
        #[arg(long, default_value = "pair")]
        decoder: String,
        /// Point index; prompts when neither index nor angle is given
        #[arg(long)]
        index: Option<usize>,
        /// Snap to the measured point nearest this angle (radians)
        #[arg(long)]
        angle: Option<f64>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());
    print_banner();

    if let Err(err) = run(cli) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let dataset = match &cli.data {
        Some(path) => Dataset::load(path)?,
        None => Dataset::demo()?,
    };

    match cli.command {
        Command::Measure {
            distribution,
            decoder,
            count,
            interval,
            classical,
            pixels,
            wav,
        } => measure(
            &dataset,
            &distribution,
            &decoder,
            count,
            Duration::from_millis(interval),
            classical,
            pixels,
            wav,
            cli.seed,
        ),
        Command::Review {
            distribution,
            decoder,
            count,
            clamp,
        } => review(&dataset, &distribution, &decoder, count, clamp, cli.seed),
        Command::Compare {
            distribution,
            decoder,
            count,
        } => compare(&dataset, &distribution, &decoder, count, cli.seed),
        Command::Interfere {
            sweep,
            decoder,
            index,
            angle,
        } => interfere(&dataset, &sweep, &decoder, index, angle, cli.seed),
    }
}

#[allow(clippy::too_many_arguments)]
fn measure(
    dataset: &Dataset,
    distribution: &str,
    decoder: &str,
    count: usize,
    interval: Duration,
    classical: bool,
    pixels: bool,
    wav: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let store = dataset.store()?;
    let dist = store.get(distribution)?;
    let decoder = Arc::new(dataset.decoder(decoder)?);

    let sampler: Arc<dyn Sampler> = if classical {
        Arc::new(IndependentSampler::from_distribution(
            dist.clone(),
            decoder.spec().clone(),
        )?)
    } else {
        Arc::new(WeightedSampler::new(dist.clone()).with_label(distribution))
    };
    let intensity = Decoder::linear_intensity(decoder.spec().clone());

    let progress = ProgressManager::new();
    let template = if classical {
        templates::CLASSICAL
    } else {
        templates::MEASURE
    };
    progress
        .create_bar("playback", count as u64, template, distribution)
        .map_err(EngineError::Dataset)?;

    let (channel, rx) = ChannelSubscriber::new();
    let sink = Arc::new(RecordingSink::new());
    let mut controller = PlaybackController::<String>::new();
    controller.subscribe(Arc::new(channel));
    controller.subscribe(Arc::new(ProgressSubscriber::new(progress.clone(), "playback")));
    controller.subscribe(Arc::new(AudioSubscriber::new(sink.clone())));

    // Ctrl+C stops playback instead of killing the process
    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .unwrap_or_else(|e| warn!("Could not install Ctrl+C handler: {}", e));

    let mut request = PlaybackRequest::new(sampler, count, interval).with_decoder(decoder);
    if let Some(seed) = seed {
        request = request.with_seed(seed);
    }
    controller.start(request)?;

    loop {
        select! {
            recv(rx) -> msg => match msg {
                Ok(PlaybackMessage::Event(event)) => {
                    progress.println(&format_event(&event));
                    if pixels {
                        if let Ok(row) = intensity.decode(&event.draw.bitstring) {
                            progress.println(&format!("     {}", shade(&row)));
                        }
                    }
                }
                Ok(PlaybackMessage::State { state: PlaybackState::Completed, .. }) => break,
                Ok(_) => {}
                Err(_) => break,
            },
            recv(stop_rx) -> _ => {
                controller.stop();
                info!("Stopped by user");
                break;
            }
        }
    }

    if let Some(path) = wav {
        let stereo = render_tones(&sink.tones(), AUDIO_SAMPLE_RATE);
        write_wav(&stereo, AUDIO_SAMPLE_RATE, &path)?;
    }
    Ok(())
}

fn review(
    dataset: &Dataset,
    distribution: &str,
    decoder: &str,
    count: usize,
    clamp: bool,
    seed: Option<u64>,
) -> Result<()> {
    let store = dataset.store()?;
    let dist = store.get(distribution)?;
    let decoder = dataset.decoder(decoder)?;
    let policy = if clamp {
        SampleSizePolicy::Clamp
    } else {
        SampleSizePolicy::Strict
    };

    let mut rng = seeded_source(seed);
    let set = draw_without_replacement(&dist, count, policy, &mut rng)?;
    if set.is_clamped() {
        println!(
            "Only {} distinct outcomes measured ({} requested)",
            set.len(),
            set.requested()
        );
    }
    for (i, draw) in set.into_draws().into_iter().enumerate() {
        println!("#{:<2} {}", i + 1, format_draw(&draw));
        for line in decoder.decode_draw(&draw)? {
            println!("     {}", line);
        }
    }
    Ok(())
}

fn compare(
    dataset: &Dataset,
    distribution: &str,
    decoder: &str,
    count: usize,
    seed: Option<u64>,
) -> Result<()> {
    let store = dataset.store()?;
    let dist = store.get(distribution)?;
    let decoder = dataset.decoder(decoder)?;
    let spec = decoder.spec().clone();

    let measured = WeightedSampler::new(dist.clone());
    let classical = IndependentSampler::from_distribution(dist.clone(), spec.clone())?;
    let mut rng = seeded_source(seed);

    let quantum_draws: Vec<_> = (0..count).map(|_| measured.draw(&mut rng)).collect();
    let classical_draws: Vec<_> = (0..count).map(|_| classical.draw(&mut rng)).collect();

    println!("Per-group marginals (identical by construction):");
    let source = group_marginals(&dist, &spec)?;
    for (k, group) in source.iter().enumerate() {
        let cells: Vec<String> = group
            .iter()
            .enumerate()
            .map(|(v, p)| format!("{}={:.3}/{:.3}", v, p, classical.group_marginal(k, v)))
            .collect();
        println!("  group {}: {}", k, cells.join("  "));
    }

    let unseen = classical_draws
        .iter()
        .filter(|d| d.count == 0)
        .count();
    let repeats = |draws: &[measureplay_rs::sampling::Draw]| {
        draws
            .iter()
            .filter(|d| {
                decoder
                    .group_values(&d.bitstring)
                    .map(|v| v.windows(2).all(|w| w[0] == w[1]))
                    .unwrap_or(false)
            })
            .count() as f64
            / count.max(1) as f64
    };
    println!(
        "All groups equal: measured {:.1}%, classical {:.1}%",
        repeats(&quantum_draws[..]) * 100.0,
        repeats(&classical_draws[..]) * 100.0
    );
    println!(
        "Classical draws never seen on hardware: {:.1}%",
        unseen as f64 / count.max(1) as f64 * 100.0
    );

    println!();
    for (q, c) in quantum_draws.iter().zip(&classical_draws).take(3) {
        println!("measured  {}", format_draw(q));
        for line in decoder.decode_draw(q)? {
            println!("          {}", line);
        }
        println!("classical {}", format_draw(c));
        for line in decoder.decode_draw(c)? {
            println!("          {}", line);
        }
        println!();
    }
    Ok(())
}

fn interfere(
    dataset: &Dataset,
    sweep: &str,
    decoder: &str,
    index: Option<usize>,
    angle: Option<f64>,
    seed: Option<u64>,
) -> Result<()> {
    let store = dataset.store()?;
    let selector = dataset.selector(sweep, &store)?;
    let decoder = dataset.decoder(decoder)?;

    let index = match (index, angle) {
        (Some(i), _) => i,
        (None, Some(a)) => selector.nearest_index(a),
        (None, None) => {
            let items: Vec<String> = selector
                .angles()
                .iter()
                .map(|a| format!("{:5.1}°", a.to_degrees()))
                .collect();
            Select::new()
                .with_prompt("Rotation angle")
                .items(&items)
                .default(0)
                .interact()
                .map_err(|e| EngineError::Dataset(e.to_string()))?
        }
    };

    let dist = selector.select_at_index(index)?;
    let top = selector.top_outcome(index)?;
    println!(
        "θ = {:.1}°  top outcome {} ({:.1}%)",
        selector.angle_at(index)?.to_degrees(),
        top.bitstring,
        top.count as f64 / dist.total() as f64 * 100.0
    );

    // The two fixed readings are the top outcomes at either end of the sweep
    let first = decoder
        .decode(&selector.top_outcome(0)?.bitstring)?
        .join(", ");
    let second = decoder
        .decode(&selector.top_outcome(selector.len() - 1)?.bitstring)?
        .join(", ");
    let reading = selector.reading(index, &first, &second)?;
    println!(
        "  {:>3.0}%  {}\n  {:>3.0}%  {}",
        reading.first_opacity * 100.0,
        reading.first,
        reading.second_opacity * 100.0,
        reading.second
    );

    let sampler = WeightedSampler::new(dist);
    let mut rng = seeded_source(seed);
    let shots: Vec<String> = (0..8)
        .map(|_| sampler.draw(&mut rng).bitstring)
        .collect();
    println!("  shots: {}", shots.join(" "));
    Ok(())
}
