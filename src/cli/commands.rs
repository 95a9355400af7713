use tokio::sync::mpsc;

use crate::app::{AppContext, FeedsyncError, Result, SyncError};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::scheduler::{stop_on_shutdown_signal, StopSignal};
use crate::store::StateChange;

/// Add every URL, then poll until Ctrl-C.
pub async fn watch(ctx: &AppContext, urls: &[String], json: bool) -> Result<()> {
    let mut scheduler = ctx.scheduler();

    let (changes, mut received) = mpsc::unbounded_channel();
    scheduler.store_mut().subscribe(Box::new(changes));

    let printer = tokio::spawn(async move {
        while let Some(change) = received.recv().await {
            match change {
                StateChange::FeedAdded { feed, entries } => {
                    println!("Added feed: {} ({} entries)", feed.display_title(), entries.len());
                }
                StateChange::EntriesAdded(entries) => {
                    for entry in entries {
                        println!("+ [{}] {}  {}", entry.feed_id, entry.display_title(), entry.link);
                    }
                }
                _ => {}
            }
        }
    });

    let (handle, task) = scheduler.spawn(StopSignal::new());
    stop_on_shutdown_signal(handle.stop_signal().clone());

    let mut added = 0;
    for url in urls {
        match handle.add_feed(url).await {
            Ok(_) => added += 1,
            Err(e) => eprintln!("  ! {} - {}: {}", url, e.kind(), e),
        }
    }

    if added == 0 {
        eprintln!("No feeds could be added");
        handle.stop();
    }

    let scheduler = task
        .await
        .map_err(|e| FeedsyncError::Other(format!("Scheduler task failed: {}", e)))?;

    if json {
        let snapshot = serde_json::to_string_pretty(&scheduler.store().snapshot())
            .map_err(|e| FeedsyncError::Other(e.to_string()))?;
        println!("{}", snapshot);
    }

    // Dropping the scheduler closes the change channel and ends the printer.
    drop(scheduler);
    let _ = printer.await;

    Ok(())
}

/// Fetch one feed and print what it contains.
pub async fn fetch(ctx: &AppContext, url: &str) -> Result<()> {
    let raw = ctx
        .fetcher
        .fetch_raw(url)
        .await
        .map_err(SyncError::from)?;
    let parsed = Normalizer::new()
        .parse(&raw)
        .map_err(SyncError::from)?;

    println!("{}", parsed.feed.title);
    if !parsed.feed.description.is_empty() {
        println!("  {}", parsed.feed.description);
    }
    for entry in &parsed.entries {
        println!("- {}\n  {}", entry.title, entry.link);
    }
    println!("{} entries", parsed.entries.len());

    Ok(())
}
