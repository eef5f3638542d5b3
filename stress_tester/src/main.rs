use std::sync::Arc;

use anyhow::Context;
use cfg::{Cfg, Implementation, Mode};
use clap::Parser;
use multiqueue::{ConcurrentPriorityQueue, LockedQueue, MultiQueue};
use tracing_subscriber::EnvFilter;

pub mod cfg;
mod rank;
mod stress;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Cfg::parse();
    tracing::info!(?cfg, "running configuration");

    let res = match cfg.implementation {
        Implementation::MultiQueue => {
            let queue = MultiQueue::<u64>::new(cfg.parallelism(), cfg.tuning)
                .context("invalid multiqueue configuration")?;
            tracing::info!(
                sub_queues = queue.num_queues(),
                advisory = ?queue.advisory(),
                "multiqueue ready"
            );
            run(&cfg, queue)
        }
        Implementation::Locked => {
            let capacity = cfg
                .item_num
                .checked_mul(cfg.producer_num)
                .ok_or_else(|| anyhow::anyhow!("Overflow while calculating queue capacity"))?;
            run(&cfg, LockedQueue::new(capacity))
        }
    };
    res.with_context(|| format!("{} run against {} failed", cfg.mode, cfg.implementation))
}

fn run<Q: ConcurrentPriorityQueue<u64>>(cfg: &Cfg, queue: Q) -> anyhow::Result<()> {
    match cfg.mode {
        Mode::Throughput => {
            use stress::{StressTestConfig, run_stress_test};

            let config = StressTestConfig {
                num_producers: cfg.producer_num,
                items_per_producer: cfg.item_num,
                num_consumers: cfg.consumer_num,
                value_max: cfg.value_max,
                run_duration_seconds: cfg.run_duration_seconds,
            };
            let results = run_stress_test(Arc::new(queue), config)?;
            results.print_summary();
        }
        Mode::Rank => {
            let report = rank::measure_rank_error(&queue, cfg.rank_items)?;
            report.print_summary();
        }
    }
    Ok(())
}
