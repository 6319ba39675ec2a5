use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::events::BuildEvent;
use crate::pipeline::Builder;

pub async fn cmd_build(config: &Config) -> anyhow::Result<()> {
    let builder = Builder::new(config);
    let reporter = tokio::spawn(report_events(builder.events().subscribe()));

    let result = builder.run().await;
    drop(builder);
    let _ = reporter.await;

    let summary = result.map_err(|e| {
        if e.is_precondition() {
            anyhow::Error::from(e).context("Build did not start; no output was written")
        } else {
            anyhow::Error::from(e)
        }
    })?;

    println!("Catalog written to {}", summary.path.display());
    println!("{:-<60}", "");
    println!("  Movies:          {}", summary.load.movies);
    println!("  Actors:          {}", summary.load.actors);
    println!("  Links:           {}", summary.load.links);
    println!(
        "  Skipped rows:    {}",
        summary.extraction.ratings.skipped
            + summary.extraction.movies.skipped
            + summary.extraction.people.skipped
            + summary.extraction.links.skipped
    );

    if let Some(report) = &summary.verification {
        println!();
        print!("{}", super::verify::render(report));
    }

    Ok(())
}

/// Logs build events until every sender is dropped.
async fn report_events(mut rx: broadcast::Receiver<BuildEvent>) {
    loop {
        match rx.recv().await {
            Ok(BuildEvent::StageProgress { stage, rows }) => {
                info!(stage = %stage, rows, "Reading");
            }
            Ok(BuildEvent::VerificationFailed { message }) => {
                warn!(message = %message, "Verification reported problems");
            }
            Ok(event) => debug!(?event, "Build event"),
            Err(RecvError::Lagged(n)) => debug!(missed = n, "Event reporter lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}
