use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use dialtidy_core::PhoneRecord;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Delete existing records before seeding
    #[arg(long)]
    pub reset: bool,
}

#[derive(Debug, Args)]
pub struct ResetArgs {}

#[derive(Debug, Serialize)]
struct SeedDto {
    seeded: usize,
    records: Vec<PhoneRecord>,
}

pub fn seed_numbers(ctx: &Context<'_>, args: SeedArgs) -> Result<()> {
    if args.reset {
        ctx.store.phones().delete_all()?;
    }
    let records = insert_seed_values(ctx)?;
    if ctx.json {
        print_json(&SeedDto {
            seeded: records.len(),
            records,
        })
    } else {
        println!("seeded {} numbers", records.len());
        Ok(())
    }
}

pub fn reset_numbers(ctx: &Context<'_>, _args: ResetArgs) -> Result<()> {
    let removed = ctx.store.phones().delete_all()?;
    if ctx.json {
        print_json(&serde_json::json!({ "removed": removed }))
    } else {
        println!("removed {} numbers", removed);
        Ok(())
    }
}

pub(crate) fn insert_seed_values(ctx: &Context<'_>) -> Result<Vec<PhoneRecord>> {
    let phones = ctx.store.phones();
    let mut records = Vec::with_capacity(ctx.config.seed_values.len());
    for value in &ctx.config.seed_values {
        records.push(phones.insert(value)?);
    }
    debug!(seeded = records.len(), "seed values inserted");
    Ok(records)
}
