#[derive(Debug, Clone, clap::Parser)]
pub struct Cfg {
    /// The priority queue implementation to test.
    pub implementation: Implementation,
    /// What to measure.
    #[arg(short, long, value_enum, default_value_t = Mode::Throughput)]
    pub mode: Mode,
    /// Number of producers that insert items into the queue.
    #[arg(short, long, default_value_t = 4)]
    pub producer_num: usize,
    /// Number of items each producer inserts during the test.
    #[arg(short, long, default_value_t = 100_000)]
    pub item_num: usize,
    /// Number of consumers that delete items from the queue.
    #[arg(short, long, default_value_t = 4)]
    pub consumer_num: usize,
    /// Expected number of parallel callers the multiqueue is sized for.
    /// Defaults to producers + consumers.
    #[arg(long)]
    pub parallelism: Option<usize>,
    /// Sub-queues per expected parallel caller.
    #[arg(long, default_value_t = 2)]
    pub tuning: usize,
    /// Exclusive upper bound of the random item values.
    #[arg(long, default_value_t = 1_000_000)]
    pub value_max: u64,
    // Hard cap on the test's execution time
    #[arg(long, default_value_t = 10)]
    pub run_duration_seconds: u64,
    /// Number of items held at the start of a rank measurement.
    #[arg(long, default_value_t = 10_000)]
    pub rank_items: u64,
}

impl Cfg {
    pub fn parallelism(&self) -> usize {
        self.parallelism
            .unwrap_or(self.producer_num + self.consumer_num)
    }
}

#[derive(Debug, Clone, Copy, strum::EnumString, strum::Display, clap::ValueEnum)]
pub enum Implementation {
    #[strum(ascii_case_insensitive)]
    MultiQueue,
    #[strum(ascii_case_insensitive)]
    Locked,
}

#[derive(Debug, Clone, Copy, strum::EnumString, strum::Display, clap::ValueEnum)]
pub enum Mode {
    /// Concurrent producers and consumers, reporting rates and delete latency.
    #[strum(ascii_case_insensitive)]
    Throughput,
    /// Single-threaded measurement of how far deleted items are from the true minimum.
    #[strum(ascii_case_insensitive)]
    Rank,
}
