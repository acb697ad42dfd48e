//! Audio-style producer/consumer over a bounded ring buffer.
//!
//! A generator thread writes random 16-bit samples, a playback thread reads
//! and prints them. The generator is much faster, so it spends most of its
//! time blocked on a full buffer; when it finishes, dropping its producer
//! handle closes the channel and the playback thread drains and exits.
//!
//! Run with: `cargo run -p ringbound-rs --features demo --bin audio_demo [samples]`
//! Add `--features demo,tracing` and `RUST_LOG=ringbound_rs=trace` for logs.

use rand::Rng;
use ringbound_rs::{init_tracing, Channel, Config, Consumer, Producer};
use std::thread;
use std::time::{Duration, Instant};

/// Historical buffer size of the demo.
const BUFFER_SIZE: usize = 1024;
const DEFAULT_SAMPLES: usize = 8192;
/// Samples printed per line.
const LINE_WIDTH: usize = 16;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let samples = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<usize>()?,
        None => DEFAULT_SAMPLES,
    };

    println!("Ring Buffer Audio Demo");
    println!("======================\n");
    println!("Configuration:");
    println!("  Buffer size: {}", BUFFER_SIZE);
    println!("  Samples: {}\n", samples);

    let channel = Channel::<i16>::new(Config::new(BUFFER_SIZE, true))?;
    let producer = channel.register()?;
    let consumer = channel.consumer();

    let start = Instant::now();

    let generator = thread::Builder::new()
        .name("generator".into())
        // The producer drops when this closure returns, closing the channel.
        .spawn(move || generate_samples(&producer, samples))?;

    let playback = thread::Builder::new()
        .name("playback".into())
        .spawn(move || play_samples(consumer))?;

    let generated = generator.join().map_err(|_| "generator thread panicked")?;
    let (played, peak) = playback.join().map_err(|_| "playback thread panicked")?;
    let duration = start.elapsed();
    let m = channel.metrics();

    println!("\n\nResults:");
    println!("  Generated: {}", generated);
    println!("  Played: {}", played);
    println!("  Peak amplitude: {}", peak);
    println!("  Generator waits (buffer full): {}", m.put_waits);
    println!("  Playback waits (buffer empty): {}", m.take_waits);
    println!("  Duration: {:.2?}", duration);

    Ok(())
}

/// Write `samples` random samples. Returns early if the channel is closed.
fn generate_samples(producer: &Producer<i16>, samples: usize) -> usize {
    let mut rng = rand::thread_rng();
    let mut sent = 0;

    for _ in 0..samples {
        let sample = rng.gen_range(0..=i16::MAX);
        if producer.put(sample).is_err() {
            break;
        }
        sent += 1;
    }

    sent
}

/// Read until the channel is closed and drained; returns (count, peak).
fn play_samples(consumer: Consumer<i16>) -> (usize, i16) {
    let mut played = 0;
    let mut peak = 0;

    for sample in consumer {
        if played % LINE_WIDTH == 0 {
            println!();
        }
        print!("{:6} ", sample);
        peak = peak.max(sample);
        played += 1;

        // Playback runs at a fixed pace, slower than generation
        if played % BUFFER_SIZE == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }

    (played, peak)
}
