use crate::commands::{print_json, Context};
use crate::util::parse_record_id;
use anyhow::Result;
use clap::Args;
use dialtidy_core::normalize_number;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Raw phone number in any format
    pub value: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    pub value: String,
}

#[derive(Debug, Serialize)]
struct NormalizeDto {
    value: String,
    normalized: String,
}

pub fn add_number(ctx: &Context<'_>, args: AddArgs) -> Result<()> {
    let record = ctx.store.phones().insert(&args.value)?;
    if ctx.json {
        print_json(&record)
    } else {
        println!("added {} {}", record.id, record.value);
        Ok(())
    }
}

pub fn list_numbers(ctx: &Context<'_>, _args: ListArgs) -> Result<()> {
    let records = ctx.store.phones().list_all()?;
    if ctx.json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("no phone numbers");
        return Ok(());
    }
    for record in records {
        println!("{:>4}  {}", record.id, record.value);
    }
    Ok(())
}

pub fn delete_number(ctx: &Context<'_>, args: DeleteArgs) -> Result<()> {
    let id = parse_record_id(&args.id)?;
    ctx.store.phones().delete(id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "deleted": id }))
    } else {
        println!("deleted {}", id);
        Ok(())
    }
}

pub fn normalize_value(args: NormalizeArgs, json: bool) -> Result<()> {
    let normalized = normalize_number(&args.value);
    if json {
        print_json(&NormalizeDto {
            value: args.value,
            normalized,
        })
    } else {
        println!("{}", normalized);
        Ok(())
    }
}
