//! CLI definition and dispatch.
//!
//! Every invocation is one session: records are loaded from the data
//! directory, the command runs against the in-memory copy, and changes are
//! written back only when persistence is enabled.

use chrono::NaiveDate;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{read_forecast_upload_file, write_forecasts, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report;
use crate::domain::config_validation::validate_config;
use crate::domain::dates::parse_date_lenient;
use crate::domain::deal::{DealHeader, DealKey, DealType, KNOWN_DELIVERY_POINTS, KNOWN_SUPPLIERS};
use crate::domain::error::GasbookError;
use crate::domain::forecast::ForecastRecord;
use crate::domain::session::{PersistOutcome, Session};
use crate::domain::units::VolumeUnit;
use crate::domain::weekly::GasWeek;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "gasbook", about = "Gas portfolio forecast and deal reconciliation")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding forecast.csv and deals.csv
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Write changes back to the data directory
    #[arg(
        long,
        global = true,
        env = "GASBOOK_PERSIST",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub persist: bool,

    /// Keep changes in memory; overrides --persist, GASBOOK_PERSIST and the config
    #[arg(long, global = true)]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Daily forecast vs executed deals with long/short status
    Reconcile {
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
    },
    /// Weekly buy/sell plan for a Saturday-to-Friday gas week
    Week {
        /// Saturday starting the week (default: the current week)
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        /// List selectable weeks instead of printing a plan
        #[arg(long)]
        list: bool,
    },
    /// Show or export the forecast
    Forecast {
        #[arg(long)]
        unit: Option<VolumeUnit>,
        /// Write the forecast CSV to this path
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Add or replace one forecast day
    AddForecast {
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// GJ
        #[arg(long)]
        consumption: f64,
    },
    /// Merge a forecast CSV with `Date` and `Forecast Consumption` columns
    Upload { file: PathBuf },
    /// Add an executed deal
    AddDeal {
        #[arg(long, value_parser = parse_date_arg)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date_arg)]
        end: NaiveDate,
        #[arg(long = "type")]
        deal_type: DealType,
        /// GJ/day; negative for a sale
        #[arg(long, allow_negative_numbers = true)]
        volume: f64,
        /// $/GJ
        #[arg(long)]
        price: f64,
        #[arg(long)]
        supplier: String,
        #[arg(long)]
        delivery_point: String,
    },
    /// List deals grouped by range and supplier
    Deals,
    /// Set volume and price on every day of a deal
    EditDeal {
        #[arg(long, value_parser = parse_date_arg)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date_arg)]
        end: NaiveDate,
        #[arg(long)]
        supplier: String,
        #[arg(long, allow_negative_numbers = true)]
        volume: f64,
        #[arg(long)]
        price: f64,
    },
}

/// Effective settings after merging defaults, config file and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub persist: bool,
    pub unit: VolumeUnit,
    pub preview_next_week: bool,
}

pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date_lenient(s).ok_or_else(|| format!("unrecognised date '{s}'"))
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, GasbookError> {
    FileConfigAdapter::from_file(path).map_err(|e| GasbookError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_settings(
    config: &dyn ConfigPort,
    data_dir: Option<&Path>,
    persist: bool,
    no_persist: bool,
) -> Result<Settings, GasbookError> {
    validate_config(config)?;

    let data_dir = match data_dir {
        Some(p) => p.to_path_buf(),
        None => config
            .get_string("data", "dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data")),
    };

    let persist = if no_persist {
        false
    } else if persist {
        true
    } else {
        config.get_bool_or("persistence", "enabled", false)
    };

    let unit = match config.get_string("report", "unit") {
        Some(u) => u.parse().map_err(|reason| GasbookError::ConfigInvalid {
            section: "report".into(),
            key: "unit".into(),
            reason,
        })?,
        None => VolumeUnit::default(),
    };

    Ok(Settings {
        data_dir,
        persist,
        unit,
        preview_next_week: config.get_bool_or("weekly", "preview_next_week", true),
    })
}

/// Run one command. Errors are returned unprinted.
pub fn execute(cli: Cli) -> Result<(), GasbookError> {
    let config = match &cli.config {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            load_config(path)?
        }
        None => FileConfigAdapter::empty(),
    };
    let settings = build_settings(&config, cli.data_dir.as_deref(), cli.persist, cli.no_persist)?;

    let port = CsvAdapter::new(settings.data_dir.clone());
    let (mut session, opened) = Session::open(&port, settings.persist)?;
    if opened.dropped_forecasts > 0 {
        eprintln!(
            "note: skipped {} forecast row(s) with unreadable dates or values",
            opened.dropped_forecasts
        );
    }
    if opened.dropped_deals > 0 {
        eprintln!(
            "note: skipped {} deal row(s) with unreadable dates or values",
            opened.dropped_deals
        );
    }

    match cli.command {
        Command::Reconcile { start, end } => run_reconcile(&session, start, end),
        Command::Week { start, list } => run_week(&session, &settings, start, list),
        Command::Forecast { unit, export } => {
            run_forecast(&session, unit.unwrap_or(settings.unit), export.as_deref())
        }
        Command::AddForecast { date, consumption } => {
            run_add_forecast(&mut session, date, consumption)
        }
        Command::Upload { file } => run_upload(&mut session, &file),
        Command::AddDeal {
            start,
            end,
            deal_type,
            volume,
            price,
            supplier,
            delivery_point,
        } => run_add_deal(
            &mut session,
            DealHeader {
                start_date: start,
                end_date: end,
                deal_type,
                volume_gj_per_day: volume,
                price,
                supplier,
                delivery_point,
            },
        ),
        Command::Deals => {
            print!("{}", text_report::format_deal_groups(&session.store().deal_groups()));
            Ok(())
        }
        Command::EditDeal {
            start,
            end,
            supplier,
            volume,
            price,
        } => run_edit_deal(
            &mut session,
            DealKey {
                start_date: start,
                end_date: end,
                supplier,
            },
            volume,
            price,
        ),
    }
}

fn run_reconcile(
    session: &Session<'_>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), GasbookError> {
    let window = match (start, end, session.store().forecast_range()) {
        (Some(s), Some(e), _) => Some((s, e)),
        (s, e, Some((first, last))) => Some((s.unwrap_or(first), e.unwrap_or(last))),
        (Some(s), None, None) => Some((s, s)),
        (None, Some(e), None) => Some((e, e)),
        (None, None, None) => None,
    };

    match session.reconcile(window) {
        Some(rec) => {
            if let Some((s, e)) = window {
                eprintln!("Reconciling {} to {}", s, e);
            }
            print!("{}", text_report::format_reconciliation(&rec));
        }
        None => println!("No forecast data; pass --start and --end to choose a range."),
    }
    Ok(())
}

fn run_week(
    session: &Session<'_>,
    settings: &Settings,
    start: Option<NaiveDate>,
    list: bool,
) -> Result<(), GasbookError> {
    let today = chrono::Local::now().date_naive();
    let selected = match start {
        Some(s) => GasWeek::starting(s)?,
        None => GasWeek::containing(today),
    };

    if list {
        let weeks = session.available_weeks(today, settings.preview_next_week);
        print!("{}", text_report::format_weeks(&weeks, selected));
        return Ok(());
    }

    print!("{}", text_report::format_weekly_plan(&session.weekly_plan(selected)));
    Ok(())
}

fn run_forecast(
    session: &Session<'_>,
    unit: VolumeUnit,
    export: Option<&Path>,
) -> Result<(), GasbookError> {
    let records = session.store().forecasts();
    match export {
        Some(path) => {
            write_forecasts(fs::File::create(path)?, &records)?;
            eprintln!("Forecast written to: {}", path.display());
        }
        None => print!("{}", text_report::format_forecasts(&records, unit)),
    }
    Ok(())
}

fn run_add_forecast(
    session: &mut Session<'_>,
    date: NaiveDate,
    consumption: f64,
) -> Result<(), GasbookError> {
    let update = session.add_forecast(ForecastRecord::new(date, consumption))?;
    match update.replaced {
        Some(old) => println!("Forecast for {date} replaced ({old:.1} -> {consumption:.1} GJ)."),
        None => println!("Forecast for {date} added ({consumption:.1} GJ)."),
    }
    report_persistence(&update.persistence);
    Ok(())
}

fn run_upload(session: &mut Session<'_>, file: &Path) -> Result<(), GasbookError> {
    eprintln!("Reading forecast upload {}", file.display());
    let upload = read_forecast_upload_file(file)?;
    let outcome = session.upload_forecasts(upload);
    println!(
        "Forecast file merged: {} added, {} replaced, {} skipped.",
        outcome.merge.added, outcome.merge.replaced, outcome.merge.dropped
    );
    report_persistence(&outcome.persistence);
    Ok(())
}

fn run_add_deal(session: &mut Session<'_>, header: DealHeader) -> Result<(), GasbookError> {
    if !KNOWN_SUPPLIERS.contains(&header.supplier.as_str()) {
        eprintln!("note: supplier '{}' is not one of {}", header.supplier, KNOWN_SUPPLIERS.join(", "));
    }
    if !KNOWN_DELIVERY_POINTS.contains(&header.delivery_point.as_str()) {
        eprintln!(
            "note: delivery point '{}' is not one of {}",
            header.delivery_point,
            KNOWN_DELIVERY_POINTS.join(", ")
        );
    }

    let outcome = session.add_deal(&header)?;
    println!("Deal {} added: {} day(s).", header.key(), outcome.rows.len());
    print!("{}", text_report::format_coverage(&outcome.coverage));
    report_persistence(&outcome.persistence);
    Ok(())
}

fn run_edit_deal(
    session: &mut Session<'_>,
    key: DealKey,
    volume: f64,
    price: f64,
) -> Result<(), GasbookError> {
    let outcome = session.edit_deal(&key, volume, price)?;
    println!("Deal {} updated: {} day(s).", key, outcome.rows_changed);
    report_persistence(&outcome.persistence);
    Ok(())
}

fn report_persistence(outcome: &PersistOutcome) {
    match outcome {
        PersistOutcome::Skipped => {
            eprintln!("note: persistence disabled; change kept in memory for this run only")
        }
        PersistOutcome::Saved => eprintln!("Changes saved."),
        PersistOutcome::Failed(reason) => eprintln!(
            "notice: changes could not be saved ({reason}); they remain in memory for this run"
        ),
    }
}
