use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use dialtidy_core::reconcile::{reconcile, MemoryStore, ReconcileReport, RecordOutcome};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Report what a pass would do without writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct ReconcileDto {
    dry_run: bool,
    scanned: usize,
    updated: usize,
    deleted: usize,
    unchanged: usize,
    outcomes: Vec<RecordOutcome>,
}

pub fn reconcile_numbers(ctx: &Context<'_>, args: ReconcileArgs) -> Result<()> {
    let report = execute(ctx, args.dry_run)?;
    render(ctx, report, args.dry_run)
}

pub(crate) fn execute(ctx: &Context<'_>, dry_run: bool) -> Result<ReconcileReport> {
    let report = if dry_run {
        // The pass runs against an in-memory snapshot; the database is
        // never written.
        let snapshot = ctx.store.phones().list_all()?;
        let memory = MemoryStore::from_records(snapshot);
        reconcile(&memory).expect("in-memory pass is infallible")
    } else {
        reconcile(&ctx.store.phones())?
    };
    debug!(
        scanned = report.scanned(),
        updated = report.updated(),
        deleted = report.deleted(),
        dry_run,
        "reconcile pass complete"
    );
    Ok(report)
}

pub(crate) fn render(ctx: &Context<'_>, report: ReconcileReport, dry_run: bool) -> Result<()> {
    if ctx.json {
        return print_json(&ReconcileDto {
            dry_run,
            scanned: report.scanned(),
            updated: report.updated(),
            deleted: report.deleted(),
            unchanged: report.unchanged(),
            outcomes: report.outcomes,
        });
    }

    for outcome in &report.outcomes {
        match outcome {
            RecordOutcome::Unchanged { id, value } => {
                println!("unchanged {} {}", id, value);
            }
            RecordOutcome::Updated {
                id,
                old_value,
                new_value,
            } => {
                println!("updated {} {} -> {}", id, old_value, new_value);
            }
            RecordOutcome::Deleted { id, value, kept_id } => {
                println!("deleted {} {} (kept {})", id, value, kept_id);
            }
        }
    }
    let prefix = if dry_run { "dry run: " } else { "" };
    println!(
        "{}{} scanned, {} updated, {} deleted, {} unchanged",
        prefix,
        report.scanned(),
        report.updated(),
        report.deleted(),
        report.unchanged()
    );
    Ok(())
}
