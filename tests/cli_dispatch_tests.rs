use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_dexdata")
}

/// Command with the data root pointed at `data_root` so nothing touches ./data.
fn command(data_root: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(bin());
    command
        .args(args)
        .env("DEXDATA_DATA_ROOT", data_root)
        .env_remove("DEXDATA_CONFIG")
        .env_remove("DEXDATA_DESCRIPTION_KEY")
        .env_remove("DEXDATA_FAIL_FAST")
        .env_remove("DEXDATA_LOCALE")
        .env("RUST_LOG", "off");
    command
}

fn run(data_root: &Path, args: &[&str]) -> Output {
    command(data_root, args)
        .output()
        .expect("dexdata should run")
}

fn potion() -> serde_json::Value {
    json!({
        "name": "Potion",
        "sell_price": 300,
        "holdable": true,
        "battle": true,
        "category": "Medicine",
        "subcategory": "HP Recovery"
    })
}

fn write_json(dir: &Path, file_name: &str, value: serde_json::Value) {
    fs::create_dir_all(dir).expect("fixture dir should be created");
    fs::write(
        dir.join(file_name),
        serde_json::to_string_pretty(&value).unwrap(),
    )
    .expect("fixture should be written");
}

fn raw_move(index: u32, name: &str) -> serde_json::Value {
    json!({
        "index": index,
        "name": { "en": name },
        "type": "Normal",
        "category": "Physical",
        "pp": 35,
        "power": 40,
        "accuracy": 100,
        "priority": 0,
        "target": "normal",
        "flags": { "contact": true, "protect": true, "mirror_move": true },
        "description": { "sword-shield": "Charges and slams into the target." }
    })
}

#[test]
fn canonicalize_prints_one_file_name_per_argument() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["canonicalize", "Poké Ball", "King's Rock", "U-turn"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines, vec!["poke_ball.json", "king_s_rock.json", "u_turn.json"]);
}

#[test]
fn unknown_command_returns_usage_code() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["serve"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn normalize_requires_description_key_for_moves() {
    let temp = TempDir::new().unwrap();
    let raw = temp.path().join("raw");
    write_json(&raw, "33.json", raw_move(33, "Tackle"));

    let out = temp.path().join("moves");
    let output = run(
        temp.path(),
        &["normalize", raw.to_str().unwrap(), out.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--description-key"));
    assert!(!out.join("tackle.json").exists());
}

#[test]
fn normalize_writes_records_and_registers_dataset() {
    let temp = TempDir::new().unwrap();
    let raw = temp.path().join("upstream");
    write_json(&raw, "33.json", raw_move(33, "Tackle"));
    write_json(&raw, "369.json", raw_move(369, "U-turn"));

    let out = temp.path().join("moves");
    let output = run(
        temp.path(),
        &[
            "normalize",
            raw.to_str().unwrap(),
            out.to_str().unwrap(),
            "--description-key",
            "sword-shield",
        ],
    );
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("normalized 2 of 2 move records"));

    let tackle: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("tackle.json")).unwrap()).unwrap();
    assert_eq!(tackle["name"], json!("Tackle"));
    assert_eq!(tackle["description"], json!("Charges and slams into the target."));
    assert!(out.join("u_turn.json").exists());

    let registry: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("registry.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(registry["moves"]["kind"], json!("move"));
    assert_eq!(registry["moves"]["path"], json!("moves"));

    let output = run(temp.path(), &["validate"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed: moves"));
}

#[test]
fn normalize_reports_failed_records_with_non_zero_exit() {
    let temp = TempDir::new().unwrap();
    let raw = temp.path().join("raw");
    write_json(&raw, "33.json", raw_move(33, "Tackle"));
    let mut untranslated = raw_move(1, "Pound");
    untranslated["name"] = json!({ "ja": "はたく" });
    write_json(&raw, "1.json", untranslated);

    let out = temp.path().join("moves");
    let output = run(
        temp.path(),
        &[
            "normalize",
            raw.to_str().unwrap(),
            out.to_str().unwrap(),
            "--description-key",
            "sword-shield",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1.json: raw record is missing 'name.en'"));
    assert!(out.join("tackle.json").exists());
}

#[test]
fn validate_reports_every_violation_in_directory() {
    let temp = TempDir::new().unwrap();
    let items = temp.path().join("items");
    write_json(&items, "potion.json", potion());
    write_json(
        &items,
        "kings_rock.json",
        json!({
            "name": "King's Rock",
            "sell_price": "50",
            "holdable": true,
            "battle": false,
            "category": "Held items"
        }),
    );

    let output = run(temp.path(), &["validate", items.to_str().unwrap(), "--kind", "item"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("3 violation(s) in 2 records checked"));
    assert!(stderr.contains("kings_rock.json: file is named 'kings_rock.json' but its name field maps to 'king_s_rock.json'"));
    assert!(stderr.contains("kings_rock.json: field 'sell_price' should be number or null"));
    assert!(stderr.contains("kings_rock.json: missing required field 'subcategory'"));

    let output = run(
        temp.path(),
        &["validate", items.to_str().unwrap(), "--kind", "item", "--fail-fast"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 violation(s)"));
}

#[test]
fn validate_without_registry_is_usage_error() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["validate"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no datasets registered"));
}

#[test]
fn validate_dir_without_kind_is_usage_error() {
    let temp = TempDir::new().unwrap();
    let moves = temp.path().join("moves");
    fs::create_dir_all(&moves).unwrap();
    let output = run(temp.path(), &["validate", moves.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn violations_are_printed_once_with_default_logging() {
    let temp = TempDir::new().unwrap();
    let items = temp.path().join("items");
    write_json(&items, "potions.json", potion());

    let output = command(temp.path(), &["validate", items.to_str().unwrap(), "--kind", "item"])
        .env_remove("RUST_LOG")
        .output()
        .expect("dexdata should run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("file is named 'potions.json'").count(), 1, "{stderr}");
}

#[test]
fn record_failures_are_printed_once_with_default_logging() {
    let temp = TempDir::new().unwrap();
    let raw = temp.path().join("raw");
    let mut untranslated = raw_move(1, "Pound");
    untranslated["name"] = json!({ "ja": "はたく" });
    write_json(&raw, "1.json", untranslated);

    let out = temp.path().join("moves");
    let output = command(
        temp.path(),
        &[
            "normalize",
            raw.to_str().unwrap(),
            out.to_str().unwrap(),
            "--description-key",
            "sword-shield",
        ],
    )
    .env_remove("RUST_LOG")
    .output()
    .expect("dexdata should run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("missing 'name.en'").count(), 1, "{stderr}");
}

#[test]
fn record_stored_as_registry_json_inside_collection_is_validated() {
    let temp = TempDir::new().unwrap();
    let items = temp.path().join("items");
    write_json(&items, "potion.json", potion());
    write_json(&items, "registry.json", json!({ "name": "Potion", "sell_price": "x" }));

    let output = run(temp.path(), &["validate", items.to_str().unwrap(), "--kind", "item"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("in 2 records checked"), "{stderr}");
    assert!(stderr.contains("registry.json: file is named 'registry.json'"));
}

#[test]
fn config_file_supplies_description_key_and_data_root() {
    let temp = TempDir::new().unwrap();
    let data_root = temp.path().join("store");
    let raw = temp.path().join("raw");
    write_json(&raw, "33.json", raw_move(33, "Tackle"));
    let config_path = temp.path().join("dexdata.yaml");
    fs::write(
        &config_path,
        format!(
            "data_root: {}\ndescription_key: sword-shield\ndata_version: test-1\n",
            data_root.display()
        ),
    )
    .unwrap();

    let out = data_root.join("moves");
    let mut normalize = command(
        temp.path(),
        &[
            "--config",
            config_path.to_str().unwrap(),
            "normalize",
            raw.to_str().unwrap(),
            out.to_str().unwrap(),
        ],
    );
    let output = normalize
        .env_remove("DEXDATA_DATA_ROOT")
        .output()
        .expect("dexdata should run");
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(out.join("tackle.json").exists());

    let registry: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data_root.join("registry.json")).unwrap())
            .unwrap();
    assert_eq!(registry["moves"]["data_version"], json!("test-1"));
    assert_eq!(registry["moves"]["path"], json!("moves"));

    let output = command(temp.path(), &["validate"])
        .env_remove("DEXDATA_DATA_ROOT")
        .env("DEXDATA_CONFIG", &config_path)
        .output()
        .expect("dexdata should run");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed: moves"));
}
