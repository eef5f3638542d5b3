use std::collections::BTreeSet;

use anyhow::{anyhow, bail};
use hdrhistogram::Histogram;
use multiqueue::ConcurrentPriorityQueue;

/// How far the deleted items were from the true minimum of the items held at the time.
#[derive(Debug)]
pub struct RankReport {
    pub deletions: u64,
    pub mean: f64,
    pub max: u64,
    /// Share of deletions that did not return the true minimum.
    pub inexact_share: f64,
    ranks: Histogram<u64>,
}

/// Inserts `0..n` in ascending order, then deletes everything again, recording for every deleted
/// item how many smaller items were still held.
/// # Error
/// Fails if the queue runs dry early or returns an item that was not held.
pub fn measure_rank_error<Q: ConcurrentPriorityQueue<u64>>(
    queue: &Q,
    n: u64,
) -> anyhow::Result<RankReport> {
    if n == 0 {
        bail!("rank measurement needs at least one item");
    }
    let mut ranks = Histogram::<u64>::new_with_max(n.max(2), 3)
        .map_err(|e| anyhow!("cannot create rank histogram: {e:?}"))?;

    for value in 0..n {
        queue.insert(value);
    }
    let mut held: BTreeSet<u64> = (0..n).collect();

    let mut inexact = 0;
    for deletion in 0..n {
        let value = queue
            .delete_min()
            .map_err(|e| anyhow!("deletion {deletion} of {n} failed: {e}"))?;
        let rank = held.range(..value).count() as u64;
        if !held.remove(&value) {
            bail!("queue returned {value}, which it did not hold");
        }
        if rank > 0 {
            inexact += 1;
        }
        ranks.saturating_record(rank);
    }
    tracing::debug!(n, inexact, "rank measurement done");

    Ok(RankReport {
        deletions: n,
        mean: ranks.mean(),
        max: ranks.max(),
        inexact_share: inexact as f64 / n as f64,
        ranks,
    })
}

impl RankReport {
    pub fn print_summary(&self) {
        println!("\n{:=^75}", " Rank Error Results ");
        println!("Deletions: {}", self.deletions);
        println!("Mean rank: {:.2}", self.mean);
        println!("Max rank: {}", self.max);
        println!("Inexact deletions: {:.1}%", self.inexact_share * 100.0);
        for p in [50.0, 90.0, 99.0] {
            println!(
                "  - P{:.0}: {}",
                p,
                self.ranks.value_at_quantile(p / 100.0)
            );
        }
    }
}
