use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

const MEMBER_DIRS: [&str; 4] = ["apps", "crates/features", "crates/shared", "infra"];

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).parent().unwrap().to_path_buf()
}

fn read_manifest(path: &Path) -> Value {
    let text = fs::read_to_string(path).unwrap();
    toml::from_str(&text).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

fn member_manifests(root: &Path) -> Vec<PathBuf> {
    let mut manifests = vec![root.join("crates/ocrhub/Cargo.toml"), root.join("xtask/Cargo.toml")];
    for dir in MEMBER_DIRS {
        for entry in fs::read_dir(root.join(dir)).unwrap().flatten() {
            let manifest = entry.path().join("Cargo.toml");
            if manifest.is_file() {
                manifests.push(manifest);
            }
        }
    }
    manifests
}

fn dependency_tables(manifest: &Value) -> Vec<&toml::Table> {
    ["dependencies", "dev-dependencies", "build-dependencies"]
        .iter()
        .filter_map(|key| manifest.get(key).and_then(Value::as_table))
        .collect()
}

#[test]
fn inherited_dependencies_do_not_override_default_features() {
    let root = workspace_root();
    let workspace = read_manifest(&root.join("Cargo.toml"));
    let shared = workspace["workspace"]["dependencies"].as_table().unwrap();

    let mut offenders = Vec::new();
    for path in member_manifests(&root) {
        let manifest = read_manifest(&path);
        for table in dependency_tables(&manifest) {
            for (name, spec) in table {
                let inherits = spec.get("workspace").and_then(Value::as_bool) == Some(true);
                let wants_off = spec.get("default-features").and_then(Value::as_bool) == Some(false);
                if !(inherits && wants_off) {
                    continue;
                }
                let root_off = shared
                    .get(name)
                    .and_then(|s| s.get("default-features"))
                    .and_then(Value::as_bool)
                    == Some(false);
                if !root_off {
                    offenders.push(format!("{} -> {name}", path.display()));
                }
            }
        }
    }

    assert!(offenders.is_empty(), "default-features = false must be set in [workspace.dependencies]: {offenders:?}");
}

#[test]
fn facade_controls_the_recognition_server_feature() {
    let root = workspace_root();
    let workspace = read_manifest(&root.join("Cargo.toml"));
    let entry = &workspace["workspace"]["dependencies"]["ocrhub-recognition"];
    assert_eq!(entry.get("default-features").and_then(Value::as_bool), Some(false));

    let facade = read_manifest(&root.join("crates/ocrhub/Cargo.toml"));
    let server = facade["features"]["server"].as_array().unwrap();
    assert!(server.iter().any(|f| f.as_str() == Some("ocrhub-recognition/server")));
}
