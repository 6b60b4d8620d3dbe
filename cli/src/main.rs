use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sqlkeeper_backup::{
    BackupInterval, BackupOutcome, BackupScheduler, DEFAULT_INTERVAL_SECS, stamp,
};
use sqlkeeper_core::{CellValue, ColumnType, ForeignKey, TableSchema, TabularData};
use sqlkeeper_sqlite::{
    Database, IfExists, catalog, clear_database, delete_rows, drop_table, migrate_table,
    rename_column, rename_table, retrieve, store,
};

mod config;

use config::Config;

const DEFAULT_DATABASE: &str = "sqlkeeper.db";
const DEFAULT_BACKUP_DIR: &str = "backup";

#[derive(Debug, Parser)]
#[command(name = "sqlkeeper")]
#[command(about = "SQLite import, table maintenance, schema migration, and interval backups")]
#[command(version)]
struct Cli {
    /// Database file to operate on.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML config file supplying defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log store operations to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List tables, optionally filtered by name.
    Tables(TablesArgs),
    /// Show a table's columns and contents.
    Show(ShowArgs),
    /// Import a JSON records file as a table.
    Import(ImportArgs),
    /// Rename a table.
    Rename(RenameArgs),
    /// Rename a column within a table.
    RenameColumn(RenameColumnArgs),
    /// Drop a table.
    Drop(DropArgs),
    /// Delete rows whose first column matches the given keys.
    DeleteRows(DeleteRowsArgs),
    /// Drop every table in the database.
    Clear(ClearArgs),
    /// Rebuild a table into a new column set, keeping common data.
    Migrate(MigrateArgs),
    /// Interval-driven backups.
    Backup(BackupArgs),
    /// Create the backup checkpoint (with a first backup).
    Checkpoint(CheckpointArgs),
    /// List backup artifacts for the database.
    Artifacts(ArtifactsArgs),
    /// Replace the database with a backup artifact.
    Restore(RestoreArgs),
}

#[derive(Debug, Args)]
struct TablesArgs {
    /// Substring (or, failing that, prefix) to filter table names.
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Table to display.
    table: String,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// JSON file containing an array of flat records.
    file: PathBuf,

    /// Table name; defaults to the file stem.
    #[arg(long)]
    table: Option<String>,

    /// Replace the table if it already exists.
    #[arg(long)]
    replace: bool,
}

#[derive(Debug, Args)]
struct RenameArgs {
    old: String,
    new: String,
}

#[derive(Debug, Args)]
struct RenameColumnArgs {
    table: String,
    old: String,
    new: String,
}

#[derive(Debug, Args)]
struct DropArgs {
    table: String,

    /// Confirm the drop; without it the command refuses to run.
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Args)]
struct DeleteRowsArgs {
    table: String,

    /// Values matched against the table's first column.
    #[arg(required = true)]
    keys: Vec<String>,

    /// Confirm the deletion.
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Args)]
struct ClearArgs {
    /// Confirm dropping every table.
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    /// Table to migrate.
    table: String,

    /// Target columns, comma-separated, in the desired order.
    #[arg(long)]
    columns: String,

    /// Optional comma-separated types parallel to --columns.
    #[arg(long)]
    types: Option<String>,

    /// Column to declare a foreign key on.
    #[arg(long)]
    foreign_key: Option<String>,

    /// Exact referenced table; without it the target is guessed from the
    /// column name (author_id -> authors).
    #[arg(long)]
    references: Option<String>,
}

#[derive(Debug, Args)]
struct BackupArgs {
    #[command(subcommand)]
    action: BackupAction,
}

#[derive(Debug, Subcommand)]
enum BackupAction {
    /// Back up only if the interval has elapsed since the checkpoint.
    Check(BackupOptions),
    /// Back up now, regardless of elapsed time.
    Force(BackupOptions),
}

#[derive(Debug, Args)]
struct BackupOptions {
    /// Backup directory holding artifacts and checkpoints.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Interval in seconds; -1 disables automatic backups.
    #[arg(long)]
    interval: Option<i64>,
}

#[derive(Debug, Args)]
struct CheckpointArgs {
    #[command(flatten)]
    backup: BackupOptions,

    /// Overwrite an existing checkpoint.
    #[arg(long)]
    overwrite: bool,
}

#[derive(Debug, Args)]
struct ArtifactsArgs {
    #[command(flatten)]
    backup: BackupOptions,
}

#[derive(Debug, Args)]
struct RestoreArgs {
    /// Artifact file name inside the backup directory.
    artifact: String,

    #[command(flatten)]
    backup: BackupOptions,

    /// Confirm overwriting the live database.
    #[arg(long)]
    yes: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    let db_path = resolve_db_path(cli.db, &config);

    match cli.command {
        Command::Tables(args) => run_tables(&db_path, args),
        Command::Show(args) => run_show(&db_path, args),
        Command::Import(args) => run_import(&db_path, args),
        Command::Rename(args) => run_rename(&db_path, args),
        Command::RenameColumn(args) => run_rename_column(&db_path, args),
        Command::Drop(args) => run_drop(&db_path, args),
        Command::DeleteRows(args) => run_delete_rows(&db_path, args),
        Command::Clear(args) => run_clear(&db_path, args),
        Command::Migrate(args) => run_migrate(&db_path, args),
        Command::Backup(args) => match args.action {
            BackupAction::Check(opts) => run_backup_check(&db_path, opts, &config),
            BackupAction::Force(opts) => run_backup_force(&db_path, opts, &config),
        },
        Command::Checkpoint(args) => run_checkpoint(&db_path, args, &config),
        Command::Artifacts(args) => run_artifacts(&db_path, args, &config),
        Command::Restore(args) => run_restore(&db_path, args, &config),
    }
}

fn run_tables(db_path: &PathBuf, args: TablesArgs) -> Result<(), String> {
    let db = open(db_path)?;
    let tables = catalog::list_tables(&db, args.filter.as_deref()).map_err(stringify)?;
    if tables.is_empty() {
        println!("no tables");
        return Ok(());
    }
    for table in tables {
        // Row counts are advisory display only.
        match catalog::row_count(&db, &table) {
            Ok(rows) => println!("{table} ({rows} rows)"),
            Err(_) => println!("{table}"),
        }
    }
    Ok(())
}

fn run_show(db_path: &PathBuf, args: ShowArgs) -> Result<(), String> {
    let db = open(db_path)?;
    let summary = catalog::table_summary(&db, &args.table).map_err(stringify)?;
    println!(
        "{} ({} rows)\n{}",
        summary.name,
        summary.rows,
        summary.columns.join(" | ")
    );
    let data = retrieve(&db, &args.table).map_err(stringify)?;
    for row in &data.rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        println!("{}", cells.join(" | "));
    }
    Ok(())
}

fn run_import(db_path: &PathBuf, args: ImportArgs) -> Result<(), String> {
    let raw = std::fs::read_to_string(&args.file)
        .map_err(|err| format!("reading {}: {err}", args.file.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| format!("parsing {}: {err}", args.file.display()))?;
    let data = TabularData::from_json_records(&doc).map_err(stringify)?;

    let table = match args.table {
        Some(table) => table,
        None => args
            .file
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| format!("cannot derive a table name from {}", args.file.display()))?,
    };
    let if_exists = if args.replace {
        IfExists::Replace
    } else {
        IfExists::Fail
    };

    let mut db = open(db_path)?;
    let inserted = store(&mut db, &table, &data, if_exists).map_err(stringify)?;
    println!("imported {inserted} rows into {table}");
    Ok(())
}

fn run_rename(db_path: &PathBuf, args: RenameArgs) -> Result<(), String> {
    let db = open(db_path)?;
    rename_table(&db, &args.old, &args.new).map_err(stringify)?;
    println!("renamed {} to {}", args.old, args.new);
    Ok(())
}

fn run_rename_column(db_path: &PathBuf, args: RenameColumnArgs) -> Result<(), String> {
    let db = open(db_path)?;
    rename_column(&db, &args.table, &args.old, &args.new).map_err(stringify)?;
    println!("renamed {}.{} to {}", args.table, args.old, args.new);
    Ok(())
}

fn run_drop(db_path: &PathBuf, args: DropArgs) -> Result<(), String> {
    let db = open(db_path)?;
    drop_table(&db, &args.table, args.yes).map_err(stringify)?;
    println!("dropped {}", args.table);
    Ok(())
}

fn run_delete_rows(db_path: &PathBuf, args: DeleteRowsArgs) -> Result<(), String> {
    let mut db = open(db_path)?;
    let deleted = delete_rows(&mut db, &args.table, &args.keys, args.yes).map_err(stringify)?;
    println!("deleted {deleted} rows from {}", args.table);
    Ok(())
}

fn run_clear(db_path: &PathBuf, args: ClearArgs) -> Result<(), String> {
    let mut db = open(db_path)?;
    let dropped = clear_database(&mut db, args.yes).map_err(stringify)?;
    println!("dropped {dropped} tables");
    Ok(())
}

fn run_migrate(db_path: &PathBuf, args: MigrateArgs) -> Result<(), String> {
    let columns = parse_list(&args.columns);
    if columns.is_empty() {
        return Err("--columns must name at least one column".to_string());
    }
    let types: Option<Vec<ColumnType>> = args
        .types
        .as_deref()
        .map(|raw| parse_list(raw).iter().map(|t| ColumnType::parse(t)).collect());

    let mut schema =
        TableSchema::from_parts(&columns, types.as_deref()).map_err(stringify)?;
    if let Some(column) = args.foreign_key {
        let mut fk = ForeignKey::new(column);
        if let Some(table) = args.references {
            fk = fk.to_table(table);
        }
        schema = schema.with_foreign_key(fk);
    }

    let mut db = open(db_path)?;
    let report = migrate_table(&mut db, &args.table, &schema).map_err(stringify)?;
    println!(
        "migrated {}: kept [{}], dropped [{}], added [{}], {} rows copied",
        args.table,
        report.common.join(", "),
        report.dropped.join(", "),
        report.added.join(", "),
        report.rows_copied
    );
    Ok(())
}

fn run_backup_check(
    db_path: &PathBuf,
    opts: BackupOptions,
    config: &Config,
) -> Result<(), String> {
    let scheduler = scheduler(&opts, config)?;
    let db = open(db_path)?;
    match scheduler.check_due(&db).map_err(stringify)? {
        BackupOutcome::BackupCreated(artifact) => {
            println!("backup created: {}", artifact.display());
        }
        BackupOutcome::NoActionNeeded { remaining_secs } => {
            println!("next backup due in {}", stamp::format_hms(remaining_secs));
        }
        BackupOutcome::Disabled => println!("automatic backups are disabled"),
    }
    Ok(())
}

fn run_backup_force(
    db_path: &PathBuf,
    opts: BackupOptions,
    config: &Config,
) -> Result<(), String> {
    let scheduler = scheduler(&opts, config)?;
    let db = open(db_path)?;
    let artifact = scheduler.force_backup(&db).map_err(stringify)?;
    println!("backup created: {}", artifact.display());
    Ok(())
}

fn run_checkpoint(
    db_path: &PathBuf,
    args: CheckpointArgs,
    config: &Config,
) -> Result<(), String> {
    let scheduler = scheduler(&args.backup, config)?;
    let db = open(db_path)?;
    let checkpoint = scheduler
        .create_checkpoint(&db, args.overwrite)
        .map_err(stringify)?;
    println!(
        "checkpoint for {} created at {}",
        checkpoint.database, checkpoint.date_format
    );
    Ok(())
}

fn run_artifacts(
    db_path: &PathBuf,
    args: ArtifactsArgs,
    config: &Config,
) -> Result<(), String> {
    let scheduler = scheduler(&args.backup, config)?;
    let db = open(db_path)?;
    let artifacts = scheduler.list_artifacts(&db).map_err(stringify)?;
    if artifacts.is_empty() {
        println!("no backups yet");
        return Ok(());
    }
    for name in artifacts {
        println!("{name}");
    }
    Ok(())
}

fn run_restore(db_path: &PathBuf, args: RestoreArgs, config: &Config) -> Result<(), String> {
    let scheduler = scheduler(&args.backup, config)?;
    let db = open(db_path)?;
    let db = scheduler
        .restore(db, &args.artifact, args.yes)
        .map_err(stringify)?;
    println!(
        "restored {} from {}",
        db.path().map(|p| p.display().to_string()).unwrap_or_default(),
        args.artifact
    );
    Ok(())
}

fn open(db_path: &PathBuf) -> Result<Database, String> {
    Database::open(db_path).map_err(stringify)
}

fn scheduler(opts: &BackupOptions, config: &Config) -> Result<BackupScheduler, String> {
    let dir = opts
        .dir
        .clone()
        .or_else(|| config.backup.dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));
    let interval = resolve_interval(opts.interval, config);
    BackupScheduler::new(dir, interval).map_err(stringify)
}

/// Flag over config over the built-in default.
fn resolve_db_path(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
}

fn resolve_interval(flag: Option<i64>, config: &Config) -> BackupInterval {
    BackupInterval::from(
        flag.or(config.backup.interval_secs)
            .unwrap_or(DEFAULT_INTERVAL_SECS as i64),
    )
}

/// Splits a comma-separated flag value into trimmed, non-empty items.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => "NULL".to_string(),
        CellValue::Integer(i) => i.to_string(),
        CellValue::Real(f) => f.to_string(),
        CellValue::Text(s) => s.clone(),
    }
}

fn stringify(err: impl std::fmt::Display) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_drops_empties() {
        assert_eq!(parse_list("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_resolve_db_path_precedence() {
        let mut config = Config::default();
        config.database = Some("from_config.db".to_string());

        assert_eq!(
            resolve_db_path(Some(PathBuf::from("from_flag.db")), &config),
            PathBuf::from("from_flag.db")
        );
        assert_eq!(
            resolve_db_path(None, &config),
            PathBuf::from("from_config.db")
        );
        assert_eq!(
            resolve_db_path(None, &Config::default()),
            PathBuf::from(DEFAULT_DATABASE)
        );
    }

    #[test]
    fn test_resolve_interval_sentinel_disables() {
        assert_eq!(
            resolve_interval(Some(-1), &Config::default()),
            BackupInterval::Disabled
        );
        let mut config = Config::default();
        config.backup.interval_secs = Some(60);
        assert_eq!(
            resolve_interval(None, &config),
            BackupInterval::Every(60)
        );
        assert_eq!(
            resolve_interval(None, &Config::default()),
            BackupInterval::Every(DEFAULT_INTERVAL_SECS)
        );
    }

    #[test]
    fn test_cell_text_formats() {
        assert_eq!(cell_text(&CellValue::Null), "NULL");
        assert_eq!(cell_text(&CellValue::Integer(7)), "7");
        assert_eq!(cell_text(&CellValue::Text("x".into())), "x");
    }

    #[test]
    fn test_cli_parses_migrate_command() {
        let cli = Cli::try_parse_from([
            "sqlkeeper",
            "--db",
            "x.db",
            "migrate",
            "books",
            "--columns",
            "title,author_id",
            "--foreign-key",
            "author_id",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        match cli.command {
            Command::Migrate(args) => {
                assert_eq!(args.table, "books");
                assert_eq!(args.columns, "title,author_id");
                assert_eq!(args.foreign_key.as_deref(), Some("author_id"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
