use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, TimeDelta};
use eclio_dtype::{ArrayData, ElementType};
use eclio_error::{EclError, EclResult};
use eclio_metrics::{EclMetrics, STORE_DECODE_TIME, STORE_DECODES, WRITER_ARRAYS};

use crate::summary::{LegacyOptions, SummaryStore, SummaryWriter, convert_legacy, read_legacy};
use crate::{
    ArrayStore, ArrayWriter, Format, OpenOptions, RestartFile, RftFile, WriteOptions,
};

fn written(format: Format, build: impl FnOnce(&mut ArrayWriter<Vec<u8>>) -> EclResult<()>) -> Vec<u8> {
    let mut writer = ArrayWriter::new(Vec::new(), format);
    build(&mut writer).unwrap();
    writer.finish().unwrap()
}

fn store_of(bytes: Vec<u8>, format: Format) -> EclResult<ArrayStore<Cursor<Vec<u8>>>> {
    ArrayStore::from_reader(Cursor::new(bytes), format)
}

fn two_step_restart<W: Write>(w: &mut ArrayWriter<W>) -> EclResult<()> {
    w.write("SEQNUM", &[0])?;
    w.write("PRESSURE", &[1.0f32, 2.0])?;
    w.write("SEQNUM", &[1])?;
    w.write("PRESSURE", &[3.0f32, 4.0])?;
    Ok(())
}

#[test]
fn restart_steps_partition_the_directory() {
    for format in [Format::Binary, Format::Formatted] {
        let store = store_of(written(format, |w| two_step_restart(w)), format).unwrap();
        let file = RestartFile::new(store).unwrap();

        assert_eq!(file.list_steps(), vec![0, 1]);
        assert_eq!(file.get::<f32>("PRESSURE", 1).unwrap(), &[3.0, 4.0]);
        assert_eq!(file.get::<f32>("PRESSURE", 0).unwrap(), &[1.0, 2.0]);
        assert!(!file.has_step(2));
        assert!(matches!(
            file.get::<f32>("PRESSURE", 2),
            Err(EclError::StepNotFound(2))
        ));
        assert!(matches!(
            file.get::<f32>("SWAT", 1),
            Err(EclError::ArrayNotFoundInStep { step: 1, .. })
        ));

        let mut covered: Vec<usize> = file
            .list_steps()
            .into_iter()
            .flat_map(|step| file.step_range(step).unwrap())
            .collect();
        covered.extend(file.store().positions("SEQNUM"));
        covered.sort_unstable();
        assert_eq!(covered, (0..file.store().len()).collect::<Vec<_>>());
    }
}

#[test]
fn arrays_before_first_marker_form_step_zero() {
    let bytes = written(Format::Binary, |w| {
        w.write("INTEHEAD", &[1, 2, 3])?;
        w.write("SEQNUM", &[5])?;
        w.write("SGAS", &[0.1f32])
    });
    let file = RestartFile::new(store_of(bytes, Format::Binary).unwrap()).unwrap();

    assert_eq!(file.list_steps(), vec![0, 5]);
    assert!(file.has_array("INTEHEAD", 0));
    assert!(!file.has_array("INTEHEAD", 5));
    let names: Vec<&str> = file
        .list_arrays_for_step(5)
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, vec!["SGAS"]);

    file.load_step(5).unwrap();
    let arrays = file.step_arrays(5).unwrap();
    assert_eq!(arrays, vec![("SGAS", &ArrayData::Real(vec![0.1]))]);
}

#[test]
fn values_decode_once_and_are_cached() {
    let metrics = EclMetrics::default();
    let bytes = written(Format::Binary, |w| {
        w.write("PORO", &[0.2f32; 1500])?;
        w.write("ACTNUM", &[1; 1500])
    });
    let store =
        ArrayStore::try_new(Cursor::new(bytes), Format::Binary, metrics.clone()).unwrap();
    let decodes = metrics.counter(STORE_DECODES);
    let decode_time = metrics.timer(STORE_DECODE_TIME);

    assert!(!store.is_loaded(0));
    let first = store.get::<f32>(0).unwrap();
    let second = store.get::<f32>(0).unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(decodes.count(), 1);
    assert_eq!(decode_time.count(), 1);
    assert!(store.is_loaded(0));
    assert!(!store.is_loaded(1));

    store.load_all().unwrap();
    store.load_all().unwrap();
    assert_eq!(decodes.count(), 2);
    assert_eq!(decode_time.count(), 2);
}

#[test]
fn directory_keeps_file_order_and_repeats() {
    let bytes = written(Format::Binary, |w| {
        w.write("B", &[1])?;
        w.write("A", &[2])?;
        w.write("B", &[3])?;
        w.write_message("ENDSOL")
    });
    let store = store_of(bytes, Format::Binary).unwrap();

    let names: Vec<&str> = store.get_list().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["B", "A", "B", "ENDSOL"]);
    assert_eq!(store.positions("B"), &[0, 2]);
    assert_eq!(store.get_by_name::<i32>("B").unwrap(), &[1]);
    assert_eq!(store.get_occurrence::<i32>("B", 1).unwrap(), &[3]);
    assert_eq!(store.occurrence_count("A"), 1);
    assert_eq!(store.descriptor(3).unwrap().element_type, ElementType::Mess);
    assert!(store.get_data(3).unwrap().is_empty());
    assert!(matches!(
        store.index_of("C"),
        Err(EclError::ArrayNotFound(_))
    ));
    assert!(matches!(
        store.get::<i32>(4),
        Err(EclError::IndexOutOfRange { index: 4, len: 4 })
    ));
}

#[test]
fn typed_access_does_not_convert() {
    let bytes = written(Format::Binary, |w| w.write("PRESSURE", &[1.0f32]));
    let store = store_of(bytes, Format::Binary).unwrap();

    let err = store.get::<f64>(0).unwrap_err();
    assert!(matches!(err, EclError::TypeMismatch { .. }));
    assert!(!store.is_loaded(0));
}

#[test]
fn truncated_file_fails_to_open() {
    let mut bytes = written(Format::Binary, |w| w.write("PORO", &[0.3f32; 10]));
    bytes.truncate(bytes.len() - 8);
    assert!(matches!(
        store_of(bytes, Format::Binary),
        Err(EclError::MalformedFile(_))
    ));
}

#[test]
fn files_on_disk_follow_their_names() {
    let dir = tempfile::tempdir().unwrap();
    for (name, format) in [("CASE.UNRST", Format::Binary), ("CASE.FUNRST", Format::Formatted)] {
        let path = dir.path().join(name);
        let metrics = EclMetrics::default();
        let mut writer = WriteOptions::new()
            .with_metrics(metrics.clone())
            .create(&path)
            .unwrap();
        assert_eq!(writer.format(), format);
        two_step_restart(&mut writer).unwrap();
        writer.finish().unwrap();
        assert_eq!(metrics.counter(WRITER_ARRAYS).count(), 4);

        let file = RestartFile::open(&path).unwrap();
        assert_eq!(file.store().format(), format);
        assert_eq!(file.get::<f32>("PRESSURE", 1).unwrap(), &[3.0, 4.0]);
    }
}

#[test]
fn dropped_writer_keeps_complete_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CASE.INIT");
    {
        let mut writer = WriteOptions::new().create(&path).unwrap();
        writer.write("PORO", &[0.25f32; 1200]).unwrap();
        writer.write("NAMES", &strings(&["W1", "W2"])).unwrap();
        let err = writer.write("TOOLONGNAME", &[1]).unwrap_err();
        assert!(matches!(err, EclError::InvalidArgument(_)));
    }

    let store = ArrayStore::open(&path).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get_by_name::<f32>("PORO").unwrap(), &[0.25; 1200]);
    assert_eq!(store.get_by_name::<String>("NAMES").unwrap(), &["W1", "W2"]);
}

#[test]
fn format_override_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.txt");
    let mut writer = WriteOptions::new()
        .with_format(Format::Formatted)
        .create(&path)
        .unwrap();
    writer.write("NAMES", &["W1".to_string(), "W2".to_string()]).unwrap();
    writer.finish().unwrap();

    let store = OpenOptions::new()
        .with_format(Format::Formatted)
        .open(&path)
        .unwrap();
    assert_eq!(store.get_by_name::<String>("NAMES").unwrap(), &["W1", "W2"]);
    assert!(OpenOptions::new().open(&path).is_err());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ArrayStore::open(dir.path().join("NOPE.INIT")).err().unwrap();
    assert!(matches!(err.root(), EclError::Io(_)));
}

fn rft_entry(
    w: &mut ArrayWriter<Vec<u8>>,
    time: f32,
    [day, month, year]: [i32; 3],
    well: &str,
) -> EclResult<()> {
    w.write("TIME", &[time])?;
    w.write("DATE", &[day, month, year])?;
    w.write(
        "WELLETC",
        &["BARSA", well, "", "METRES"].map(str::to_string),
    )?;
    w.write("PRESSURE", &[200.0f32 + time, 201.0 + time])
}

#[test]
fn rft_entries_by_well_and_date() {
    let bytes = written(Format::Binary, |w| {
        rft_entry(w, 0.0, [1, 1, 2020], "B-2H")?;
        rft_entry(w, 0.0, [1, 1, 2020], "A-1H")?;
        rft_entry(w, 31.0, [1, 2, 2020], "A-1H")
    });
    let file = RftFile::new(store_of(bytes, Format::Binary).unwrap()).unwrap();
    let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let feb = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();

    assert_eq!(
        file.list_entries(),
        vec![("B-2H", jan), ("A-1H", jan), ("A-1H", feb)]
    );
    assert_eq!(file.list_wells(), vec!["A-1H", "B-2H"]);
    assert_eq!(file.list_dates(), vec![jan, feb]);
    assert!(file.has_entry("A-1H", feb));
    assert!(!file.has_entry("B-2H", feb));
    assert_eq!(file.entry_time("A-1H", feb).unwrap(), 31.0);
    assert_eq!(file.entry_range("A-1H", feb).unwrap(), 8..12);
    assert_eq!(file.list_arrays_for_entry("A-1H", jan).unwrap().len(), 4);
    assert_eq!(
        file.get::<f32>("PRESSURE", "A-1H", feb).unwrap(),
        &[231.0, 232.0]
    );
    assert!(file.has_array("PRESSURE", "B-2H", jan));
    assert!(!file.has_array("SWAT", "B-2H", jan));
    assert!(matches!(
        file.get::<f32>("PRESSURE", "B-2H", feb),
        Err(EclError::EntryNotFound { .. })
    ));
    assert!(matches!(
        file.get::<f32>("SWAT", "B-2H", jan),
        Err(EclError::ArrayNotFound(_))
    ));
    file.load_entry("B-2H", jan).unwrap();
    assert!(file.store().is_loaded(3));
}

#[test]
fn rft_lookups_across_many_entries() {
    let date = [1, 1, 2020];
    let bytes = written(Format::Binary, |w| {
        (0u16..2000).try_for_each(|i| rft_entry(w, f32::from(i), date, &format!("W{i:04}")))
    });
    let file = RftFile::new(store_of(bytes, Format::Binary).unwrap()).unwrap();
    let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

    assert_eq!(file.list_entries().len(), 2000);
    assert_eq!(file.store().occurrence_count("PRESSURE"), 2000);
    for i in (0u16..2000).step_by(333) {
        let well = format!("W{i:04}");
        let start = usize::from(i) * 4;
        assert_eq!(file.entry_range(&well, jan).unwrap(), start..start + 4);
        assert_eq!(
            file.store().positions_in("PRESSURE", &(start..start + 4)),
            &[start + 3]
        );
        assert_eq!(
            file.get::<f32>("PRESSURE", &well, jan).unwrap(),
            &[200.0 + f32::from(i), 201.0 + f32::from(i)]
        );
    }
    assert!(file.has_array("PRESSURE", "W1999", jan));
    assert!(!file.has_array("SWAT", "W1999", jan));
    assert!(file.store().positions_in("PRESSURE", &(0..3)).is_empty());
}

#[test]
fn duplicate_rft_entries_are_malformed() {
    let bytes = written(Format::Binary, |w| {
        rft_entry(w, 0.0, [1, 1, 2020], "A-1H")?;
        rft_entry(w, 0.0, [1, 1, 2020], "A-1H")
    });
    assert!(matches!(
        RftFile::new(store_of(bytes, Format::Binary).unwrap()),
        Err(EclError::MalformedFile(_))
    ));
}

#[test]
fn rft_arrays_before_first_time_are_malformed() {
    let bytes = written(Format::Binary, |w| {
        w.write("DATE", &[1, 1, 2020])?;
        rft_entry(w, 0.0, [1, 1, 2020], "A-1H")
    });
    assert!(matches!(
        RftFile::new(store_of(bytes, Format::Binary).unwrap()),
        Err(EclError::MalformedFile(_))
    ));
}

fn hundred_row_summary() -> SummaryWriter {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut writer = SummaryWriter::new(
        vec!["TIME".to_string(), "WBHP:W1".to_string(), "FOPT".to_string()],
        vec!["DAYS".to_string(), "BARSA".to_string(), "SM3".to_string()],
        start,
    )
    .unwrap();
    for row in 0..100u16 {
        let t = f32::from(row);
        let is_report = [0, 10, 55, 99].contains(&row);
        writer.push_row(&[t, 250.0 - t, 10.0 * t], is_report).unwrap();
    }
    writer
}

#[test]
fn summary_report_steps() {
    let bytes = hundred_row_summary()
        .write_to(Vec::new(), Format::Binary)
        .unwrap();
    let summary = SummaryStore::new(store_of(bytes, Format::Binary).unwrap()).unwrap();

    assert_eq!(summary.row_count(), 100);
    assert_eq!(summary.report_step_rows(), &[0, 10, 55, 99]);
    assert_eq!(summary.number_of_report_steps(), 4);
    assert_eq!(summary.get("WBHP:W1").unwrap().len(), 100);
    assert_eq!(
        summary.get_at_report_steps("WBHP:W1").unwrap(),
        vec![250.0, 240.0, 195.0, 151.0]
    );
    assert_eq!(summary.timestep_index_at_report_step_start(1).unwrap(), 0);
    assert_eq!(summary.timestep_index_at_report_step_start(4).unwrap(), 99);
    assert!(matches!(
        summary.timestep_index_at_report_step_start(0),
        Err(EclError::InvalidArgument(_))
    ));
    assert!(matches!(
        summary.timestep_index_at_report_step_start(5),
        Err(EclError::InvalidArgument(_))
    ));
    assert_eq!(summary.unit_of("FOPT").unwrap(), "SM3");
    assert!(matches!(
        summary.get("WOPR:W1"),
        Err(EclError::ArrayNotFound(_))
    ));
}

#[test]
fn summary_columns_load_on_demand() {
    let bytes = hundred_row_summary()
        .write_to(Vec::new(), Format::Binary)
        .unwrap();
    let summary = SummaryStore::new(store_of(bytes, Format::Binary).unwrap()).unwrap();
    let column = summary.store().index_of("V2").unwrap();

    assert!(!summary.store().is_loaded(column));
    summary.load(&["FOPT"]).unwrap();
    assert!(summary.store().is_loaded(column));
    assert!(!summary.store().is_loaded(column - 1));
    summary.load_all().unwrap();
    assert!(summary.store().is_loaded(column - 1));
}

#[test]
fn summary_dates_and_patterns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CASE.ESMRY");
    hundred_row_summary().write(&path).unwrap();
    let summary = SummaryStore::open(&path).unwrap();

    let start = summary.start_date();
    let dates = summary.dates_at_report_steps().unwrap();
    assert_eq!(
        dates,
        [0, 10, 55, 99].map(|d| start + TimeDelta::days(d)).to_vec()
    );
    assert_eq!(summary.dates().unwrap().len(), 100);
    assert_eq!(summary.keyword_list_matching("W*").unwrap(), vec!["WBHP:W1"]);
    assert_eq!(
        summary.keyword_list_matching("?OPT").unwrap(),
        vec!["FOPT"]
    );
    assert!(summary.keyword_list_matching("X*").unwrap().is_empty());
}

#[test]
fn summary_without_report_flags_is_malformed() {
    let bytes = written(Format::Binary, |w| w.write("START", &[1, 1, 2020]));
    assert!(matches!(
        SummaryStore::new(store_of(bytes, Format::Binary).unwrap()),
        Err(EclError::MalformedFile(_))
    ));
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn write_smspec(path: &Path) -> EclResult<()> {
    let mut w = ArrayWriter::create(path)?;
    w.write("DIMENS", &[4, 2, 2, 1, 0, -1])?;
    w.write(
        "KEYWORDS",
        &strings(&["TIME", "WBHP", "FOPT", "WBHP", "BPR"]),
    )?;
    w.write(
        "WGNAMES",
        &strings(&[":+:+:+:+", "W1", ":+:+:+:+", ":+:+:+:+", ":+:+:+:+"]),
    )?;
    w.write("NUMS", &[0, 0, 0, 0, 3])?;
    w.write(
        "UNITS",
        &strings(&["DAYS", "BARSA", "SM3", "BARSA", "BARSA"]),
    )?;
    w.write("STARTDAT", &[1, 1, 2020])?;
    w.finish()?;
    Ok(())
}

fn write_step(w: &mut ArrayWriter<impl Write>, rows: &[[f32; 5]]) -> EclResult<()> {
    w.write("SEQHDR", &[0])?;
    for (i, row) in rows.iter().enumerate() {
        w.write("MINISTEP", &[i32::try_from(i).unwrap()])?;
        w.write("PARAMS", row)?;
    }
    Ok(())
}

const STEP_ONE: [[f32; 5]; 2] = [[0.0, 100.0, 0.0, -1.0, 50.0], [10.0, 110.0, 5.0, -1.0, 51.0]];
const STEP_TWO: [[f32; 5]; 2] = [[20.0, 120.0, 10.0, -1.0, 52.0], [30.0, 130.0, 15.0, -1.0, 53.0]];

#[test]
fn legacy_unified_summary() {
    let dir = tempfile::tempdir().unwrap();
    let smspec = dir.path().join("CASE.SMSPEC");
    write_smspec(&smspec).unwrap();
    let mut w = ArrayWriter::create(dir.path().join("CASE.UNSMRY")).unwrap();
    write_step(&mut w, &STEP_ONE).unwrap();
    write_step(&mut w, &STEP_TWO).unwrap();
    w.finish().unwrap();

    let legacy = read_legacy(dir.path().join("CASE")).unwrap();
    assert_eq!(legacy.keys(), &["BPR:1,2,1", "FOPT", "TIME", "WBHP:W1"]);
    assert_eq!(legacy.row_count(), 4);

    let output = dir.path().join("CASE.ESMRY");
    convert_legacy(&smspec, &output).unwrap();
    let summary = SummaryStore::open(&output).unwrap();
    assert_eq!(summary.report_step_rows(), &[0, 1, 3]);
    assert_eq!(summary.get("WBHP:W1").unwrap(), &[100.0, 110.0, 120.0, 130.0]);
    assert_eq!(summary.get("BPR:1,2,1").unwrap(), &[50.0, 51.0, 52.0, 53.0]);
    assert_eq!(summary.unit_of("TIME").unwrap(), "DAYS");
}

#[test]
fn legacy_per_step_summary() {
    let dir = tempfile::tempdir().unwrap();
    let smspec = dir.path().join("CASE.SMSPEC");
    write_smspec(&smspec).unwrap();
    for (name, rows) in [("CASE.S0001", &STEP_ONE), ("CASE.S0002", &STEP_TWO)] {
        let mut w = ArrayWriter::create(dir.path().join(name)).unwrap();
        write_step(&mut w, rows).unwrap();
        w.finish().unwrap();
    }

    let summary = SummaryStore::from_legacy(&smspec).unwrap();
    assert_eq!(summary.row_count(), 4);
    assert_eq!(summary.get("TIME").unwrap(), &[0.0, 10.0, 20.0, 30.0]);
    assert_eq!(summary.report_step_rows(), &[0, 1, 3]);
}

#[test]
fn legacy_results_out_of_order_are_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let smspec = dir.path().join("CASE.SMSPEC");
    write_smspec(&smspec).unwrap();
    let mut w = ArrayWriter::create(dir.path().join("CASE.UNSMRY")).unwrap();
    w.write("PARAMS", &STEP_ONE[0]).unwrap();
    w.finish().unwrap();

    assert!(matches!(
        read_legacy(&smspec),
        Err(EclError::MalformedFile(_))
    ));
}

#[test]
fn legacy_without_results_fails() {
    let dir = tempfile::tempdir().unwrap();
    let smspec = dir.path().join("CASE.SMSPEC");
    write_smspec(&smspec).unwrap();
    assert!(matches!(read_legacy(&smspec).unwrap_err().root(), EclError::Io(_)));
}

#[test]
fn pressure_before_and_after_first_marker() {
    let bytes = written(Format::Binary, |w| {
        w.write("PRESSURE", &[100.0f64, 200.5, 300.25])?;
        w.write("SEQNUM", &[1])?;
        w.write("PRESSURE", &[110.0f64, 210.5, 310.25])
    });
    let file = RestartFile::new(store_of(bytes, Format::Binary).unwrap()).unwrap();

    assert_eq!(file.list_steps(), vec![0, 1]);
    assert_eq!(file.get::<f64>("PRESSURE", 0).unwrap(), &[100.0, 200.5, 300.25]);
    assert_eq!(file.get::<f64>("PRESSURE", 1).unwrap(), &[110.0, 210.5, 310.25]);
    assert_eq!(file.step_range(1).unwrap(), 2..3);
}

fn write_run_smspec(
    path: &Path,
    keywords: &[&str],
    units: &[&str],
    restart: &[&str],
    restart_step: i32,
    start: [i32; 3],
) -> EclResult<()> {
    let mut w = ArrayWriter::create(path)?;
    w.write("RESTART", &strings(restart))?;
    w.write("DIMENS", &[3, 2, 2, 1, 0, restart_step])?;
    w.write("KEYWORDS", &strings(keywords))?;
    w.write("WGNAMES", &strings(&[":+:+:+:+", ":+:+:+:+", "W1"]))?;
    w.write("NUMS", &[0, 0, 0])?;
    w.write("UNITS", &strings(units))?;
    w.write("STARTDAT", &start)?;
    w.finish()?;
    Ok(())
}

fn write_row(w: &mut ArrayWriter<impl Write>, step: i32, row: [f32; 3]) -> EclResult<()> {
    w.write("MINISTEP", &[step])?;
    w.write("PARAMS", &row)
}

fn base_and_restarted_run(dir: &Path) -> EclResult<PathBuf> {
    std::fs::create_dir(dir.join("base"))?;
    write_run_smspec(
        &dir.join("base/BASE.FSMSPEC"),
        &["TIME", "FOPT", "WBHP"],
        &["DAYS", "SM3", "BARSA"],
        &["", ""],
        0,
        [1, 1, 2020],
    )?;
    let mut w = ArrayWriter::create(dir.join("base/BASE.FUNSMRY"))?;
    for (step, row) in [[0.0, 0.0, 100.0], [10.0, 5.0, 110.0], [20.0, 10.0, 120.0], [30.0, 15.0, 130.0]]
        .into_iter()
        .enumerate()
    {
        let step = i32::try_from(step).unwrap();
        w.write("SEQHDR", &[step])?;
        write_row(&mut w, step, row)?;
    }
    w.finish()?;

    let smspec = dir.join("RST.SMSPEC");
    write_run_smspec(
        &smspec,
        &["TIME", "FOPT", "WOPR"],
        &["DAYS", "STB", "SM3/DAY"],
        &["base/BAS", "E"],
        2,
        [21, 1, 2020],
    )?;
    let mut w = ArrayWriter::create(dir.join("RST.UNSMRY"))?;
    w.write("SEQHDR", &[2])?;
    write_row(&mut w, 0, [20.0, 10.0, 7.0])?;
    write_row(&mut w, 1, [25.0, 12.0, 8.0])?;
    w.write("SEQHDR", &[3])?;
    write_row(&mut w, 2, [30.0, 15.0, 9.0])?;
    w.finish()?;
    Ok(smspec)
}

#[test]
fn legacy_restart_continues_base_run() {
    let dir = tempfile::tempdir().unwrap();
    let smspec = base_and_restarted_run(dir.path()).unwrap();
    let output = dir.path().join("RST.ESMRY");
    convert_legacy(&smspec, &output).unwrap();
    let summary = SummaryStore::open(&output).unwrap();

    assert_eq!(summary.keyword_list(), &["FOPT", "TIME", "WBHP:W1", "WOPR:W1"]);
    assert_eq!(summary.get("TIME").unwrap(), &[0.0, 10.0, 20.0, 25.0, 30.0]);
    assert_eq!(summary.get("FOPT").unwrap(), &[0.0, 5.0, 10.0, 12.0, 15.0]);
    assert_eq!(summary.get("WBHP:W1").unwrap(), &[100.0, 110.0, 0.0, 0.0, 0.0]);
    assert_eq!(summary.get("WOPR:W1").unwrap(), &[0.0, 0.0, 7.0, 8.0, 9.0]);
    assert_eq!(summary.report_step_rows(), &[0, 1, 3, 4]);
    assert_eq!(summary.unit_of("FOPT").unwrap(), "SM3");
    assert_eq!(
        summary.start_date(),
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );
}

#[test]
fn legacy_restart_without_base_runs() {
    let dir = tempfile::tempdir().unwrap();
    let smspec = base_and_restarted_run(dir.path()).unwrap();
    let legacy = LegacyOptions::new()
        .with_base_runs(false)
        .read(&smspec)
        .unwrap();

    assert_eq!(legacy.keys(), &["FOPT", "TIME", "WOPR:W1"]);
    assert_eq!(legacy.row_count(), 3);
}

#[test]
fn legacy_restart_loop_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let smspec = dir.path().join("LOOP.SMSPEC");
    write_run_smspec(
        &smspec,
        &["TIME", "FOPT", "WOPR"],
        &["DAYS", "SM3", "SM3/DAY"],
        &["LOOP"],
        1,
        [1, 1, 2020],
    )
    .unwrap();

    assert!(matches!(
        read_legacy(&smspec),
        Err(EclError::MalformedFile(_))
    ));
}
