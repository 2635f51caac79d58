use std::env;
use std::fs;
use std::path::Path;

// Кладёт config.toml из корня workspace рядом с бинарником stock_sync,
// где его ищет load_config(). Без файла используется встроенный конфиг.
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    // OUT_DIR: target/<profile>/build/stock-sync-xxx/out
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let profile = env::var("PROFILE").expect("PROFILE is set by cargo");
    let target_dir = Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .expect("Could not find target profile directory");

    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Could not find workspace root");

    let source = workspace_root.join("config.toml");
    if !source.exists() {
        return;
    }

    let dest = target_dir.join("config.toml");
    fs::copy(&source, &dest)
        .unwrap_or_else(|e| panic!("Failed to copy config.toml to {:?}: {}", dest, e));
    println!("cargo:warning=stock_sync will read {:?}", dest);
}
