// End-to-end runs of the pipeline against files on disk
use can_csv_decoder::{
    CollectingDiagnostics, DecoderConfig, DecoderError, DiagnosticKind, FileNaming, Pipeline,
    TemperatureBias,
};
use chrono::{Local, TimeZone};
use std::fs;
use std::path::Path;

fn write_log(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("logFile.can");
    fs::write(&path, contents).unwrap();
    path
}

fn read_rows(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

fn plain(config: DecoderConfig) -> DecoderConfig {
    config.with_file_naming(FileNaming::Plain).with_id_column(false)
}

#[test]
fn motor_reference_frame() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "0.500;X;0x400;8;0A;00;64;00;E8;03;00;00\n");
    let out = dir.path().join("out");

    let config = plain(DecoderConfig::extended()).with_output_dir(&out);
    let summary = Pipeline::new(config).unwrap().run(&input).unwrap();

    assert_eq!(summary.time_base, Some(0.5));
    assert_eq!(summary.rows_written, 1);
    assert_eq!(
        read_rows(&out.join("400.csv")),
        vec![
            "time,motor_current,vehicle_speed_kph,odometer_km",
            "0.000,1.0,10.0,10.00",
        ]
    );
}

#[test]
fn temperature_subtract_bias() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "1.000;X;0x402;2;28;32\n");

    let config = plain(DecoderConfig::extended())
        .with_temperature_bias(TemperatureBias::Subtract)
        .with_output_dir(dir.path());
    Pipeline::new(config).unwrap().run(&input).unwrap();

    // 0 C and 10 C
    assert_eq!(
        read_rows(&dir.path().join("402.csv")),
        vec!["time,inverter_temp_F,motor_temp_F", "0.000,32.0,50.0"]
    );
}

#[test]
fn temperature_add_bias() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "1.000;X;0x403;2;28;32\n");

    let config = DecoderConfig::legacy().with_output_dir(dir.path());
    Pipeline::new(config).unwrap().run(&input).unwrap();

    // 80 C and 90 C
    assert_eq!(
        read_rows(&dir.path().join("403.csv")),
        vec![
            "time,id,inverter_temp_F,motor_temp_F",
            "0.000,0x403,176.0,194.0",
        ]
    );
}

#[test]
fn fault_column_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "5.0;X;0x405;3;64;01;2A\n");

    let config = plain(DecoderConfig::extended()).with_output_dir(dir.path());
    Pipeline::new(config).unwrap().run(&input).unwrap();

    // soc = byte0, fault_code = byte2, fault_level = byte1
    assert_eq!(
        read_rows(&dir.path().join("405.csv")),
        vec!["time,state_of_charge,fault_code,fault_level", "0.000,100,42,1"]
    );
}

#[test]
fn relative_time_shared_across_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(
        dir.path(),
        "\
0.100;X;0x7FF;1;00
0.250;X;0x401;8;00;00;00;00;00;00;00;00
0.500;X;0x404;3;10;00;00
1.250;X;0x401;8;00;00;00;00;00;00;00;00
",
    );

    let config = plain(DecoderConfig::extended()).with_output_dir(dir.path());
    Pipeline::new(config).unwrap().run(&input).unwrap();

    let motor = read_rows(&dir.path().join("401.csv"));
    assert_eq!(motor[1], "0.000,0.0,0.0,0.00");
    assert_eq!(motor[2], "1.000,0.0,0.0,0.00");

    let fault = read_rows(&dir.path().join("404.csv"));
    assert_eq!(fault[1], "0.250,16,0,0");
}

#[test]
fn short_payload_is_zero_padded() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "2.0;X;0x400;2;0A;00\n");

    let config = plain(DecoderConfig::extended()).with_output_dir(dir.path());
    let summary = Pipeline::new(config).unwrap().run(&input).unwrap();

    assert_eq!(summary.decode_errors, 0);
    assert_eq!(read_rows(&dir.path().join("400.csv"))[1], "0.000,1.0,0.0,0.00");
}

#[test]
fn malformed_lines_produce_no_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(
        dir.path(),
        "\
Time;Channel;ID;DLC;Data
0.1;X;0x400
;;;
garbage
",
    );

    let config = plain(DecoderConfig::extended()).with_output_dir(dir.path());
    let mut pipeline = Pipeline::with_diagnostics(config, CollectingDiagnostics::new()).unwrap();
    let summary = pipeline.run(&input).unwrap();

    // The header line has 5 fields, so it is reported as a parse error
    assert_eq!(summary.lines_processed, 4);
    assert_eq!(summary.rows_written, 0);
    assert_eq!(summary.parse_errors, 1);
    assert_eq!(pipeline.diagnostics().lines(), vec![1]);
    assert_eq!(
        pipeline.diagnostics().count(DiagnosticKind::FieldParse),
        1
    );
}

#[test]
fn decode_error_does_not_stop_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(
        dir.path(),
        "\
1.0;X;0x402;2;XX;00
2.0;X;0x402;2;28;28
3.0;X;0x400;8;0A;00;00;00;00;00;00;00
",
    );

    let config = plain(DecoderConfig::extended()).with_output_dir(dir.path());
    let mut pipeline = Pipeline::with_diagnostics(config, CollectingDiagnostics::new()).unwrap();
    let summary = pipeline.run(&input).unwrap();

    assert_eq!(summary.decode_errors, 1);
    assert_eq!(summary.rows_written, 2);
    assert_eq!(pipeline.diagnostics().lines(), vec![1]);

    // The failed record still set the time base
    assert_eq!(read_rows(&dir.path().join("402.csv"))[1], "1.000,32.0,32.0");
    assert_eq!(read_rows(&dir.path().join("400.csv"))[1], "2.000,1.0,0.0,0.00");
}

#[test]
fn no_tracked_records_gives_header_only_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "0.1;X;0x123;1;00\n0.2;X;0x124;1;00\n");
    let out = dir.path().join("out");

    let config = DecoderConfig::extended().with_output_dir(&out);
    let generated_at = Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
    let summary = Pipeline::new(config)
        .unwrap()
        .with_generated_at(generated_at)
        .run(&input)
        .unwrap();

    assert_eq!(summary.time_base, None);
    assert_eq!(summary.rows_written, 0);
    assert_eq!(summary.outputs.len(), 7);

    let names = [
        "400", "401", "402", "403", "404", "405", "500",
    ];
    for name in names {
        let path = out.join(format!("{}-2024-12-31-23-59.csv", name));
        assert_eq!(read_rows(&path).len(), 1, "{:?}", path);
    }
    assert_eq!(
        read_rows(&out.join("500-2024-12-31-23-59.csv"))[0],
        "time,byte0,byte1,byte2,byte3,byte4,byte5,byte6,byte7"
    );
}

#[test]
fn raw_passthrough_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "0.0;X;0x500;3;DE;AD;BE\n0.5;X;0x500;0;\n");

    let config = plain(DecoderConfig::extended()).with_output_dir(dir.path());
    Pipeline::new(config).unwrap().run(&input).unwrap();

    let rows = read_rows(&dir.path().join("500.csv"));
    assert_eq!(rows[1], "0.000,DE,AD,BE,,,,,");
    assert_eq!(rows[2], "0.500,,,,,,,,");
}

#[test]
fn missing_input_creates_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let config = DecoderConfig::extended().with_output_dir(&out);
    let result = Pipeline::new(config)
        .unwrap()
        .run(&dir.path().join("logFile.can"));

    assert!(matches!(result, Err(DecoderError::InputMissing(_))));
    assert!(!out.exists());
}

#[test]
fn sink_open_failure_aborts_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "0.500;X;0x400;8;0A;00;64;00;E8;03;00;00\n");
    let out = dir.path().join("out");
    fs::create_dir_all(out.join("402.csv")).unwrap();

    let config = plain(DecoderConfig::extended()).with_output_dir(&out);
    let mut pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.run(&input);

    match result {
        Err(DecoderError::SinkOpen { path, .. }) => assert!(path.ends_with("402.csv")),
        other => panic!("expected SinkOpen, got {:?}", other.map(|s| s.rows_written)),
    }
    assert_eq!(read_rows(&out.join("400.csv")).len(), 1);
}

#[test]
fn directory_input_creates_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("logs");
    fs::create_dir(&input).unwrap();
    let out = dir.path().join("out");

    let config = DecoderConfig::extended().with_output_dir(&out);
    let result = Pipeline::new(config).unwrap().run(&input);

    assert!(matches!(result, Err(DecoderError::InputMissing(_))));
    assert!(!out.exists());
}

#[test]
fn colliding_file_names_rejected_up_front() {
    let config = DecoderConfig::legacy().with_raw_ids(vec!["0X400".to_string()]);
    assert!(matches!(
        Pipeline::new(config),
        Err(DecoderError::InvalidConfig(_))
    ));
}

#[test]
fn rows_end_in_bare_newline_and_wide_tokens_fail() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "0.0;X;0x404;3;100;00;00\r\n0.5;X;0x404;3;10;00;00\r\n");

    let config = plain(DecoderConfig::extended()).with_output_dir(dir.path());
    let summary = Pipeline::new(config).unwrap().run(&input).unwrap();

    assert_eq!(summary.decode_errors, 1);
    let content = fs::read_to_string(dir.path().join("404.csv")).unwrap();
    assert_eq!(
        content,
        "time,state_of_charge,fault_code,fault_level\n0.500,16,0,0\n"
    );
}
