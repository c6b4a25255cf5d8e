//! `projdoc` - CLI for project documentation records
//!
//! This binary saves documentation records, manages the project and developer
//! registries, and writes compiled PDF reports to disk.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use projdoc::cli::{
    Cli, Command, ConfigCommand, DeliveryArgs, ListCommand, OutputFormat, RegistryCommand,
    ReportCommand, SaveCommand, ShowCommand,
};
use projdoc::config::StorageBackend;
use projdoc::record::{DocumentationRecord, Field, PartialRecord, Section};
use projdoc::report::CompiledReport;
use projdoc::storage::{
    MemoryStore, NameRegistry, RecordStore, RegistryEntry, RegistryKind, SqliteStore,
};
use projdoc::{init_logging, Config, DocumentationService};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    if let Command::Config(cmd) = &cli.command {
        return handle_config(cli.config.clone(), cmd);
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match config.storage.backend {
        StorageBackend::Sqlite => {
            let path = config.database_path();
            let store = SqliteStore::open(&path)
                .with_context(|| format!("failed to open database {}", path.display()))?;
            run(DocumentationService::new(store, &config.report), &config, cli.command)
        }
        StorageBackend::Memory => run(
            DocumentationService::new(MemoryStore::new(), &config.report),
            &config,
            cli.command,
        ),
    }
}

fn run<S>(mut service: DocumentationService<S>, config: &Config, command: Command) -> Result<()>
where
    S: RecordStore + NameRegistry,
{
    match command {
        Command::Project(cmd) => handle_registry(&mut service, RegistryKind::Project, cmd),
        Command::Developer(cmd) => handle_registry(&mut service, RegistryKind::Developer, cmd),
        Command::Save(cmd) => handle_save(&mut service, cmd),
        Command::Show(cmd) => handle_show(&service, config, &cmd),
        Command::List(cmd) => handle_list(&service, &cmd),
        Command::Report(cmd) => handle_report(&service, config, &cmd),
        Command::Status(cmd) => handle_status(&service, config, cmd.json),
        Command::Config(_) => {
            unreachable!("config commands are dispatched before a store is opened")
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_batch(path: Option<&Path>) -> Result<Vec<PartialRecord>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = read_input(path)?;
    let batch: Vec<PartialRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of records", path.display()))?;
    debug!(records = batch.len(), "Loaded client batch");
    Ok(batch)
}

fn handle_registry<S>(
    service: &mut DocumentationService<S>,
    kind: RegistryKind,
    cmd: RegistryCommand,
) -> Result<()>
where
    S: RecordStore + NameRegistry,
{
    match cmd {
        RegistryCommand::Add { name } => {
            let entry = match kind {
                RegistryKind::Project => service.register_project(&name)?,
                RegistryKind::Developer => service.register_developer(&name)?,
            };
            println!("{}", entry.id);
        }
        RegistryCommand::List { format } => {
            let entries = match kind {
                RegistryKind::Project => service.projects()?,
                RegistryKind::Developer => service.developers()?,
            };
            print_entries(&entries, format)?;
        }
    }
    Ok(())
}

fn print_entries(entries: &[RegistryEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entries)?),
        OutputFormat::Plain => {
            for entry in entries {
                println!("{}", entry.id);
            }
        }
        OutputFormat::Table => {
            for entry in entries {
                println!("{:<28} {}", entry.id, entry.name);
            }
        }
    }
    Ok(())
}

fn handle_save<S>(service: &mut DocumentationService<S>, cmd: SaveCommand) -> Result<()>
where
    S: RecordStore + NameRegistry,
{
    let raw = read_input(&cmd.input)?;
    let mut candidate: PartialRecord =
        serde_json::from_str(&raw).context("input is not a JSON record")?;
    if let Some(project) = cmd.project {
        candidate.project_id = Some(project);
    }
    if let Some(developer) = cmd.developer {
        candidate.developer_id = Some(developer);
    }

    let record = service.create_or_update_record(candidate)?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", record.id);
    }
    Ok(())
}

fn handle_show<S>(service: &DocumentationService<S>, config: &Config, cmd: &ShowCommand) -> Result<()>
where
    S: RecordStore + NameRegistry,
{
    let record = service.get_record(&cmd.project_id, &cmd.developer_id)?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("Record {}", record.id);
    println!(
        "Project:   {}",
        record.project_name.as_deref().unwrap_or(&record.project_id)
    );
    println!(
        "Developer: {}",
        record.developer_name.as_deref().unwrap_or(&record.developer_id)
    );
    println!("Updated:   {}", record.updated_at.to_rfc3339());
    for section in Section::ALL {
        println!();
        println!("[{section}]");
        for field in section.fields() {
            let value = record.content.get(*field).trim();
            let value = if value.is_empty() {
                config.report.placeholder.as_str()
            } else {
                value
            };
            println!("  {}: {value}", field.label());
        }
    }
    Ok(())
}

fn handle_list<S>(service: &DocumentationService<S>, cmd: &ListCommand) -> Result<()>
where
    S: RecordStore + NameRegistry,
{
    let records = service.list_records(cmd.project.as_deref())?;
    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Plain => {
            for record in &records {
                println!("{}", record.id);
            }
        }
        OutputFormat::Table => {
            for record in &records {
                print_record_row(record);
            }
        }
    }
    Ok(())
}

fn print_record_row(record: &DocumentationRecord) {
    println!(
        "{:<28} {:<20} {:<20} {:>2}/{} {}",
        record.id,
        record.project_name.as_deref().unwrap_or(&record.project_id),
        record
            .developer_name
            .as_deref()
            .unwrap_or(&record.developer_id),
        record.content.answered(),
        Field::ALL.len(),
        record.updated_at.format("%Y-%m-%d %H:%M"),
    );
}

fn handle_report<S>(
    service: &DocumentationService<S>,
    config: &Config,
    cmd: &ReportCommand,
) -> Result<()>
where
    S: RecordStore + NameRegistry,
{
    let delivery = cmd.delivery();
    let batch = read_batch(delivery.batch.as_deref())?;
    let report = match cmd {
        ReportCommand::Project {
            project_id, name, ..
        } => service.compile_single_project_report(project_id, name.as_deref(), batch)?,
        ReportCommand::Global { .. } => service.compile_global_report(batch)?,
    };
    let path = write_report(&report, delivery, config)?;
    println!("{}", path.display());
    Ok(())
}

fn write_report(report: &CompiledReport, delivery: &DeliveryArgs, config: &Config) -> Result<PathBuf> {
    let path = match &delivery.output {
        Some(path) if path.is_dir() => path.join(&report.file_name),
        Some(path) => path.clone(),
        None => config.report.output_dir().join(&report.file_name),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, &report.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn handle_status<S>(service: &DocumentationService<S>, config: &Config, json: bool) -> Result<()>
where
    S: RecordStore + NameRegistry,
{
    let records = service.store().count()?;
    let projects = service.projects()?.len();
    let developers = service.developers()?.len();
    let backend = match config.storage.backend {
        StorageBackend::Sqlite => "sqlite",
        StorageBackend::Memory => "memory",
    };

    if json {
        let status = serde_json::json!({
            "backend": backend,
            "database_path": config.database_path(),
            "records": records,
            "projects": projects,
            "developers": developers,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("projdoc status");
        println!("--------------");
        println!("Backend:     {backend}");
        if config.storage.backend == StorageBackend::Sqlite {
            println!("Database:    {}", config.database_path().display());
        }
        println!("Records:     {records}");
        println!("Projects:    {projects}");
        println!("Developers:  {developers}");
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("failed to load configuration")?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:        {:?}", config.storage.backend);
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Report]");
                println!("  Placeholder:    {}", config.report.placeholder);
                println!("  Output dir:     {}", config.report.output_dir().display());
                println!(
                    "  Page:           {} x {} pt, margin {} pt",
                    config.report.page_width, config.report.page_height, config.report.margin
                );
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .clone()
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => anyhow::bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
