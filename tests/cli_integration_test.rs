//! CLI integration tests for settings resolution and command flows.
//!
//! Tests cover:
//! - Config parsing and precedence (build_settings, load_config)
//! - Argument parsing (dates, negative volumes)
//! - Commands run against CSV files in a temporary data directory

mod common;

use clap::Parser;
use common::*;
use gasbook::adapters::csv_adapter::{CsvAdapter, DEALS_FILE, FORECAST_FILE};
use gasbook::adapters::file_config_adapter::FileConfigAdapter;
use gasbook::cli::{self, Cli, Command};
use gasbook::domain::error::GasbookError;
use gasbook::domain::session::Session;
use gasbook::domain::units::VolumeUnit;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn parse(args: &[&str]) -> Cli {
    let mut full = vec!["gasbook"];
    full.extend_from_slice(args);
    Cli::try_parse_from(full).unwrap()
}

fn dir_arg(dir: &Path) -> String {
    dir.display().to_string()
}

mod config_loading {
    use super::*;

    #[test]
    fn defaults_without_config() {
        let settings = cli::build_settings(&FileConfigAdapter::empty(), None, false, false).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert!(!settings.persist);
        assert_eq!(settings.unit, VolumeUnit::Gj);
        assert!(settings.preview_next_week);
    }

    #[test]
    fn values_from_file() {
        let ini = r#"
[data]
dir = /srv/gasbook

[persistence]
enabled = true

[report]
unit = m3

[weekly]
preview_next_week = false
"#;
        let file = write_temp_ini(ini);
        let adapter = cli::load_config(file.path()).unwrap();
        let settings = cli::build_settings(&adapter, None, false, false).unwrap();

        assert_eq!(settings.data_dir, PathBuf::from("/srv/gasbook"));
        assert!(settings.persist);
        assert_eq!(settings.unit, VolumeUnit::CubicMetres);
        assert!(!settings.preview_next_week);
    }

    #[test]
    fn flags_override_file() {
        let adapter =
            FileConfigAdapter::from_string("[data]\ndir = a\n[persistence]\nenabled = true\n").unwrap();
        let settings =
            cli::build_settings(&adapter, Some(Path::new("b")), false, true).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("b"));
        assert!(!settings.persist);

        let adapter = FileConfigAdapter::empty();
        assert!(cli::build_settings(&adapter, None, true, false).unwrap().persist);
    }

    #[test]
    fn invalid_boolean_is_rejected() {
        let adapter = FileConfigAdapter::from_string("[persistence]\nenabled = sometimes\n").unwrap();
        let err = cli::build_settings(&adapter, None, false, false).unwrap_err();
        assert!(matches!(err, GasbookError::ConfigInvalid { key, .. } if key == "enabled"));
    }

    #[test]
    fn invalid_unit_is_rejected() {
        let adapter = FileConfigAdapter::from_string("[report]\nunit = litres\n").unwrap();
        let err = cli::build_settings(&adapter, None, false, false).unwrap_err();
        assert!(matches!(err, GasbookError::ConfigInvalid { key, .. } if key == "unit"));
    }

    #[test]
    fn missing_config_file_is_config_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/gasbook.ini")).unwrap_err();
        assert!(matches!(err, GasbookError::ConfigParse { .. }));
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn lenient_dates() {
        assert_eq!(cli::parse_date_arg("2025-08-02").unwrap(), date(2025, 8, 2));
        assert_eq!(cli::parse_date_arg("08/02/2025").unwrap(), date(2025, 8, 2));
        assert!(cli::parse_date_arg("someday").is_err());
    }

    #[test]
    fn add_deal_accepts_negative_volume() {
        let cli = parse(&[
            "add-deal",
            "--start",
            "2025-08-02",
            "--end",
            "2025-08-03",
            "--type",
            "index",
            "--volume",
            "-250",
            "--price",
            "3.1",
            "--supplier",
            "BP",
            "--delivery-point",
            "DAWN",
        ]);
        match cli.command {
            Command::AddDeal { volume, start, .. } => {
                assert_eq!(volume, -250.0);
                assert_eq!(start, date(2025, 8, 2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn no_persist_beats_persist() {
        let cli = parse(&["--persist", "--no-persist", "deals"]);
        assert!(cli.persist && cli.no_persist);

        let adapter = FileConfigAdapter::from_string("[persistence]\nenabled = true\n").unwrap();
        let settings = cli::build_settings(&adapter, None, cli.persist, cli.no_persist).unwrap();
        assert!(!settings.persist);
    }
}

mod command_flows {
    use super::*;

    #[test]
    fn add_deal_without_persistence_leaves_disk_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir_arg(dir.path());
        let cli = parse(&[
            "--data-dir", &data, "add-deal", "--start", "2025-08-02", "--end", "2025-08-04",
            "--type", "fixed", "--volume", "600", "--price", "3.25", "--supplier", "Shell",
            "--delivery-point", "DAWN",
        ]);
        cli::execute(cli).unwrap();
        assert!(!dir.path().join(DEALS_FILE).exists());
    }

    #[test]
    fn persisted_deal_and_forecast_reload() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir_arg(dir.path());

        cli::execute(parse(&[
            "--data-dir", &data, "--persist", "add-deal", "--start", "2025-08-02", "--end",
            "2025-08-04", "--type", "fixed", "--volume", "600", "--price", "3.25", "--supplier",
            "Shell", "--delivery-point", "DAWN",
        ]))
        .unwrap();
        cli::execute(parse(&[
            "--data-dir", &data, "--persist", "add-forecast", "--date", "2025-08-02",
            "--consumption", "1000",
        ]))
        .unwrap();

        let port = CsvAdapter::new(dir.path().to_path_buf());
        let (session, report) = Session::open(&port, false).unwrap();
        assert_eq!(report.dropped_deals, 0);
        assert_eq!(session.store().deal_count(), 3);
        assert_eq!(session.store().forecast_on(date(2025, 8, 2)), Some(1000.0));
        assert_eq!(session.store().deal_groups().len(), 1);
    }

    #[test]
    fn config_file_enables_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let ini = format!("[data]\ndir = {}\n[persistence]\nenabled = yes\n", dir.path().display());
        let file = write_temp_ini(&ini);
        let config = file.path().display().to_string();

        cli::execute(parse(&[
            "-c", &config, "add-forecast", "--date", "2025-08-09", "--consumption", "250",
        ]))
        .unwrap();
        let saved = fs::read_to_string(dir.path().join(FORECAST_FILE)).unwrap();
        assert!(saved.starts_with("date,year,month,day,forecast_consumption"));
        assert!(saved.contains("2025-08-09,2025,8,9,250"));
    }

    #[test]
    fn upload_merges_file_and_rejects_bad_schema() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir_arg(dir.path());

        let good = dir.path().join("upload.csv");
        fs::write(&good, "Date,Forecast Consumption\n2025-08-02,900\n2025-08-03,950\n").unwrap();
        cli::execute(parse(&["--data-dir", &data, "--persist", "upload", &good.display().to_string()]))
            .unwrap();

        let bad = dir.path().join("bad.csv");
        fs::write(&bad, "Day,Forecast\n2025-08-04,1\n").unwrap();
        let err = cli::execute(parse(&[
            "--data-dir", &data, "--persist", "upload", &bad.display().to_string(),
        ]))
        .unwrap_err();
        assert!(matches!(err, GasbookError::Schema { .. }));

        let port = CsvAdapter::new(dir.path().to_path_buf());
        let (session, _) = Session::open(&port, false).unwrap();
        assert_eq!(session.store().forecast_count(), 2);
    }

    #[test]
    fn reversed_deal_range_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir_arg(dir.path());
        let err = cli::execute(parse(&[
            "--data-dir", &data, "--persist", "add-deal", "--start", "2025-08-04", "--end",
            "2025-08-02", "--type", "fixed", "--volume", "1", "--price", "1", "--supplier",
            "Shell", "--delivery-point", "DAWN",
        ]))
        .unwrap_err();
        assert!(matches!(err, GasbookError::Validation { .. }));
        assert!(!dir.path().join(DEALS_FILE).exists());
    }

    #[test]
    fn negative_forecast_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir_arg(dir.path());
        let result = Cli::try_parse_from([
            "gasbook", "--data-dir", &data, "add-forecast", "--date", "2025-08-02",
            "--consumption=-5",
        ]);
        let err = cli::execute(result.unwrap()).unwrap_err();
        assert!(matches!(err, GasbookError::Validation { .. }));
    }

    #[test]
    fn editing_unknown_deal_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir_arg(dir.path());
        let err = cli::execute(parse(&[
            "--data-dir", &data, "edit-deal", "--start", "2025-08-02", "--end", "2025-08-04",
            "--supplier", "Shell", "--volume", "1", "--price", "1",
        ]))
        .unwrap_err();
        assert!(matches!(err, GasbookError::DealNotFound { .. }));
    }

    #[test]
    fn forecast_export_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(FORECAST_FILE),
            "date,year,month,day,forecast_consumption\n2025-08-02,2025,8,2,1000\n",
        )
        .unwrap();
        let out = dir.path().join("export.csv");
        cli::execute(parse(&[
            "--data-dir", &dir_arg(dir.path()), "forecast", "--export", &out.display().to_string(),
        ]))
        .unwrap();
        let exported = fs::read_to_string(out).unwrap();
        assert!(exported.contains("2025-08-02"));
    }

    #[test]
    fn week_with_non_saturday_start_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = cli::execute(parse(&[
            "--data-dir", &dir_arg(dir.path()), "week", "--start", "2025-08-04",
        ]))
        .unwrap_err();
        assert!(matches!(err, GasbookError::Validation { .. }));
    }
}
