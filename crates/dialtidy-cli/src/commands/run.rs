use crate::commands::{reconcile, seed, Context};
use anyhow::Result;
use clap::Args;

/// The whole pipeline in one invocation: start from a clean table, seed the
/// configured sample values, then normalize and deduplicate them.
#[derive(Debug, Args)]
pub struct RunArgs {}

pub fn run_all(ctx: &Context<'_>, _args: RunArgs) -> Result<()> {
    ctx.store.phones().delete_all()?;
    let records = seed::insert_seed_values(ctx)?;
    if !ctx.json {
        println!("seeded {} numbers", records.len());
    }
    let report = reconcile::execute(ctx, false)?;
    reconcile::render(ctx, report, false)
}
