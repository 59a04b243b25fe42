use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Destination file for the backup copy
    pub path: PathBuf,
}

pub fn backup(ctx: &Context<'_>, args: BackupArgs) -> Result<()> {
    ctx.store.backup_to(&args.path)?;
    if ctx.json {
        print_json(&serde_json::json!({ "backup": args.path }))
    } else {
        println!("backup written to {}", args.path.display());
        Ok(())
    }
}
