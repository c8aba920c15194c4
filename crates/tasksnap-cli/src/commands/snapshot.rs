//! Snapshot commands: append, show latest, count

use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tasksnap_core::{Snapshot, DEFAULT_USER_ID};
use tasksnap_store::db::open_migrated;
use tasksnap_store::snapshot::{insert_revision, latest_revision, revision_count};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Append a snapshot read from a JSON file
    Save(SaveArgs),
    /// Print the latest revision as JSON
    Latest(DbArgs),
    /// Print the number of stored revisions
    Count(DbArgs),
}

#[derive(Debug, Args)]
pub struct DbArgs {
    #[arg(long, env = "TASKSNAP_DB", default_value = "snapshots.db")]
    pub db: PathBuf,
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Snapshot JSON file
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long, env = "TASKSNAP_USER_ID", default_value = DEFAULT_USER_ID)]
    pub user_id: String,

    #[command(flatten)]
    pub db: DbArgs,
}

pub fn execute(args: SnapshotArgs) -> anyhow::Result<()> {
    match args.command {
        SnapshotCommand::Save(save_args) => execute_save(save_args),
        SnapshotCommand::Latest(db_args) => execute_latest(db_args),
        SnapshotCommand::Count(db_args) => execute_count(db_args),
    }
}

fn execute_save(args: SaveArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let snapshot = Snapshot::from_json_slice(&bytes)
        .with_context(|| format!("{} is not a valid snapshot", args.file.display()))?;

    let mut conn = open_migrated(&args.db.db, BUSY_TIMEOUT)?;
    let revision = insert_revision(&mut conn, &args.user_id, snapshot)?;

    println!("Snapshot saved:");
    println!("  revision_id: {}", revision.id);
    println!("  tasks: {}", revision.tasks.len());
    println!("  created_at: {}", revision.created_at.to_rfc3339());
    Ok(())
}

fn execute_latest(args: DbArgs) -> anyhow::Result<()> {
    let conn = open_migrated(&args.db, BUSY_TIMEOUT)?;
    match latest_revision(&conn)? {
        Some(revision) => println!("{}", serde_json::to_string_pretty(&revision)?),
        None => println!("No snapshots stored"),
    }
    Ok(())
}

fn execute_count(args: DbArgs) -> anyhow::Result<()> {
    let conn = open_migrated(&args.db, BUSY_TIMEOUT)?;
    println!("{}", revision_count(&conn)?);
    Ok(())
}
