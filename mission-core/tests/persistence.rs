use mission_core::library::{LibraryError, ScreenLibrary};
use mission_core::persistence::PersistenceAdapter;
use mission_core::store::{ConfigStore, SettingsPatch};
use screen::{LoadError, ParseError, Settings, ShapeError, TemperatureUnit, WidgetKind};
use std::fs;
use tempfile::tempdir;

#[test]
fn serialized_store_loads_back_into_a_fresh_store() {
    let mut store = ConfigStore::new();
    store.add_widget(WidgetKind::Chart);
    let snapshot = store.snapshot();

    let mut buffer = Vec::new();
    PersistenceAdapter::serialize(&snapshot, &mut buffer).expect("serialize");
    let value: serde_json::Value = serde_json::from_slice(&buffer).expect("json");
    let keys: Vec<&String> = value.as_object().expect("object").keys().collect();
    assert_eq!(keys.len(), 2);

    let mut other = ConfigStore::new();
    PersistenceAdapter::load_into(&mut other, buffer.as_slice()).expect("load");
    assert_eq!(other.widgets(), store.widgets());
    assert_eq!(other.layout(), store.layout());
}

#[test]
fn missing_components_leaves_store_unchanged() {
    let mut store = ConfigStore::new();
    let before = store.snapshot();

    let err = PersistenceAdapter::load_into(&mut store, &br#"{"layout": []}"#[..]).unwrap_err();

    assert!(matches!(
        err,
        LoadError::Shape(ShapeError::MissingKey("components"))
    ));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = PersistenceAdapter::deserialize(&b"{\"layout\": ["[..]).unwrap_err();
    assert!(matches!(err, LoadError::Parse(ParseError::Json(_))));
}

#[test]
fn wrong_shapes_are_shape_errors() {
    let cases: [(&str, ShapeError); 3] = [
        ("[]", ShapeError::NotAnObject),
        (
            r#"{"layout": {}, "components": []}"#,
            ShapeError::NotAnArray("layout"),
        ),
        (
            r#"{"layout": [], "components": [], "theme": "dark"}"#,
            ShapeError::UnexpectedKey("theme".to_string()),
        ),
    ];
    for (input, expected) in cases {
        match PersistenceAdapter::deserialize(input.as_bytes()) {
            Err(LoadError::Shape(shape)) => assert_eq!(shape, expected, "input {input}"),
            other => panic!("expected shape error for {input}, got {other:?}"),
        }
    }
}

#[test]
fn document_settings_stay_with_the_store() {
    let mut store = ConfigStore::new();
    store.update_settings(SettingsPatch {
        unit: Some(TemperatureUnit::Celsius),
        ..SettingsPatch::default()
    });
    let settings = store.settings().clone();
    let doc = br#"{
        "layout": [{"i": "telemetry-7", "x": 2, "y": 3, "w": 8, "h": 16, "static": false}],
        "components": [{"id": "telemetry-7", "type": "TelemetryBox", "props": {}}]
    }"#;

    PersistenceAdapter::load_into(&mut store, &doc[..]).expect("load");

    assert_eq!(store.settings(), &settings);
    assert_eq!(store.widgets().len(), 1);
    assert_eq!((store.layout()[0].x, store.layout()[0].y), (2, 3));
}

#[test]
fn library_save_scan_load_delete() {
    let dir = tempdir().expect("tempdir");
    let mut library = ScreenLibrary::new(dir.path());
    let mut store = ConfigStore::new();
    store.add_widget(WidgetKind::Readout);

    let path = library
        .save_as("launch pad", &store.snapshot())
        .expect("save");
    assert_eq!(path, dir.path().join("launch_pad.json"));
    library.save_as("bench", &ConfigStore::new().snapshot()).expect("save");
    fs::write(dir.path().join("broken.json"), b"{ not json").expect("write");

    let names: Vec<String> = library.scan().iter().map(|e| e.name.clone()).collect();
    assert_eq!(names, vec!["bench".to_string(), "launch_pad".to_string()]);
    assert_eq!(library.entries()[1].widgets, 4);

    let document = library.load("launch pad").expect("load");
    assert_eq!(document.components, store.widgets());

    library.delete("bench").expect("delete");
    assert_eq!(library.entries().len(), 1);
    assert!(matches!(
        library.load("bench"),
        Err(LibraryError::NotFound(_))
    ));
}

#[test]
fn settings_defaults_are_created_and_reused() {
    let dir = tempdir().expect("tempdir");
    let library = ScreenLibrary::new(dir.path());

    assert_eq!(library.load_settings_defaults(), Settings::default());
    assert!(dir.path().join("settings.defaults.json").exists());

    let mut custom = Settings::default();
    custom.unit = TemperatureUnit::Celsius;
    custom.temp_threshold_high = 24.0;
    library.save_settings_defaults(&custom).expect("save defaults");

    let store = library.open_store();
    assert_eq!(store.settings(), &custom);
    assert_eq!(store.default_settings(), &custom);
}

#[test]
fn settings_defaults_file_is_normalized_on_load() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("settings.defaults.json"),
        br#"{"staleTimeout": -3, "timeRange": 0, "unit": "C"}"#,
    )
    .expect("write");

    let settings = ScreenLibrary::new(dir.path()).load_settings_defaults();

    assert_eq!(settings.stale_timeout_seconds, 0.0);
    assert_eq!(settings.time_range_minutes, 1.0);
    assert_eq!(settings.unit, TemperatureUnit::Celsius);
}
