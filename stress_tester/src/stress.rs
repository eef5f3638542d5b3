use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail};
use hdrhistogram::Histogram;
use multiqueue::{ConcurrentPriorityQueue, Error};
use num_format::{Locale, ToFormattedString};
use rand::Rng;

/// Highest delete latency the histogram tracks precisely, in nanoseconds.
const MAX_TRACKED_LATENCY_NS: u64 = 60_000_000_000;
const LATENCY_PERCENTILES: [f64; 4] = [50.0, 90.0, 99.0, 99.9];

#[derive(Debug, Clone, Copy)]
pub struct StressTestConfig {
    pub num_producers: usize,
    pub items_per_producer: usize,
    pub num_consumers: usize,
    /// Items are drawn from `0..value_max`.
    pub value_max: u64,
    pub run_duration_seconds: u64,
}

fn latency_histogram() -> anyhow::Result<Histogram<u64>> {
    Histogram::new_with_max(MAX_TRACKED_LATENCY_NS, 3)
        .map_err(|e| anyhow!("cannot create latency histogram: {e:?}"))
}

/// What a single consumer thread observed.
struct ConsumerStats {
    consumed: usize,
    empty_polls: usize,
    latency_ns: Histogram<u64>,
}

/// Runs producers and consumers against `queue` until the producers are done and the queue is
/// empty, or the configured duration has passed.
/// # Error
/// Fails if the items consumed plus those left in the queue differ from the items inserted.
pub fn run_stress_test<Q: ConcurrentPriorityQueue<u64>>(
    queue: Arc<Q>,
    config: StressTestConfig,
) -> anyhow::Result<TestResults> {
    if config.value_max == 0 {
        bail!("value_max must be > 0");
    }
    tracing::info!(
        producers = config.num_producers,
        items_per_producer = config.items_per_producer,
        consumers = config.num_consumers,
        "starting stress test"
    );
    let start_time = Instant::now();
    let test_end_time = start_time + Duration::from_secs(config.run_duration_seconds);

    let submitted_count = Arc::new(AtomicUsize::new(0));
    let producers_stopped = Arc::new(AtomicUsize::new(0));

    // region:    --- Producer threads
    let mut producer_handles = vec![];

    for producer_id in 1..=config.num_producers {
        let cloned_queue = Arc::clone(&queue);
        let cloned_submitted_count = Arc::clone(&submitted_count);
        let cloned_producers_stopped = Arc::clone(&producers_stopped);

        let handle = thread::spawn(move || {
            let mut rng = rand::rng();
            let mut local_submitted = 0;

            while Instant::now() < test_end_time && local_submitted < config.items_per_producer {
                cloned_queue.insert(rng.random_range(0..config.value_max));
                local_submitted += 1;
                cloned_submitted_count.fetch_add(1, Ordering::Relaxed);
            }

            cloned_producers_stopped.fetch_add(1, Ordering::SeqCst);
            tracing::info!(producer_id, local_submitted, "producer completed");
        });

        producer_handles.push(handle);
    }
    // endregion: --- Producer threads

    // region:    --- Consumer threads
    let mut consumer_handles = vec![];

    for consumer_id in 1..=config.num_consumers {
        let cloned_queue = Arc::clone(&queue);
        let cloned_producers_stopped = Arc::clone(&producers_stopped);
        let mut latency_ns = latency_histogram()?;

        let handle = thread::spawn(move || {
            let mut consumed = 0;
            let mut empty_polls = 0;

            while Instant::now() < test_end_time {
                let producers_done =
                    cloned_producers_stopped.load(Ordering::SeqCst) == config.num_producers;

                let delete_start = Instant::now();
                match cloned_queue.delete_min() {
                    Ok(_) => {
                        let elapsed_ns = delete_start.elapsed().as_nanos();
                        latency_ns.saturating_record(u64::try_from(elapsed_ns).unwrap_or(u64::MAX));
                        consumed += 1;
                    }
                    Err(Error::Empty) if producers_done => break,
                    Err(_) => {
                        empty_polls += 1;
                        thread::yield_now();
                    }
                }
            }

            tracing::info!(consumer_id, consumed, empty_polls, "consumer completed");
            ConsumerStats {
                consumed,
                empty_polls,
                latency_ns,
            }
        });
        consumer_handles.push(handle);
    }
    // endregion: --- Consumer threads

    for handle in producer_handles {
        handle
            .join()
            .map_err(|_| anyhow!("producer thread panicked"))?;
    }
    let mut total_consumed = 0;
    let mut total_empty_polls = 0;
    let mut latency_ns = latency_histogram()?;
    for handle in consumer_handles {
        let stats = handle
            .join()
            .map_err(|_| anyhow!("consumer thread panicked"))?;
        total_consumed += stats.consumed;
        total_empty_polls += stats.empty_polls;
        latency_ns
            .add(&stats.latency_ns)
            .map_err(|e| anyhow!("cannot merge latency histograms: {e:?}"))?;
    }
    let test_duration = start_time.elapsed();

    // Whatever the consumers left behind
    let remaining = std::iter::from_fn(|| queue.delete_min().ok()).count();

    let total_submitted = submitted_count.load(Ordering::Relaxed);
    if total_submitted != total_consumed + remaining {
        bail!(
            "lost items: submitted {total_submitted}, consumed {total_consumed}, left over {remaining}"
        );
    }

    let secs = test_duration.as_secs_f64().max(f64::EPSILON);
    Ok(TestResults {
        test_duration,
        total_submitted,
        total_consumed,
        remaining,
        total_empty_polls,
        inserts_per_second: total_submitted as f64 / secs,
        deletes_per_second: total_consumed as f64 / secs,
        latency_ns,
    })
}

#[derive(Debug)]
pub struct TestResults {
    pub test_duration: Duration,
    pub total_submitted: usize,
    pub total_consumed: usize,
    pub remaining: usize,
    pub total_empty_polls: usize,
    pub inserts_per_second: f64,
    pub deletes_per_second: f64,
    latency_ns: Histogram<u64>,
}

impl TestResults {
    pub fn print_summary(&self) {
        let locale = &Locale::en;
        println!("\n{:=^75}", " Stress Test Results ");
        println!("Test duration: {:?}", self.test_duration);
        println!(
            "Items inserted: {}",
            self.total_submitted.to_formatted_string(locale)
        );
        println!(
            "Items deleted: {} (+{} drained afterwards)",
            self.total_consumed.to_formatted_string(locale),
            self.remaining.to_formatted_string(locale)
        );
        println!(
            "Empty polls: {}",
            self.total_empty_polls.to_formatted_string(locale)
        );
        println!("Inserts per second: {:.2}", self.inserts_per_second);
        println!("Deletes per second: {:.2}", self.deletes_per_second);

        if !self.latency_ns.is_empty() {
            println!(
                "\ndelete_min latency: avg {} ns, max {} ns",
                (self.latency_ns.mean() as u64).to_formatted_string(locale),
                self.latency_ns.max().to_formatted_string(locale)
            );
            for p in LATENCY_PERCENTILES {
                println!(
                    "  - P{:.1}: {} ns",
                    p,
                    self.latency_ns
                        .value_at_quantile(p / 100.0)
                        .to_formatted_string(locale)
                );
            }
        }
    }
}
