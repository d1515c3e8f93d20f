use std::collections::HashSet;
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=assets/sources.txt");
    println!("cargo:rerun-if-env-changed=STARDUST_API_BASE");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("embedded_sources.rs");
    let mut f = fs::File::create(&dest_path).unwrap();

    let list_path = Path::new("assets").join("sources.txt");
    if !list_path.exists() {
        writeln!(f, "pub const EMBEDDED_SOURCES: &[&str] = &[];").unwrap();
        return;
    }

    let content = fs::read_to_string(&list_path).unwrap();

    // Same rules as the backend's training list loader: http(s) lines only,
    // comments and blanks skipped, first occurrence wins.
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !(line.starts_with("http://") || line.starts_with("https://")) {
            continue;
        }
        if seen.insert(line.to_string()) {
            urls.push(line.to_string());
        }
    }

    writeln!(f, "pub const EMBEDDED_SOURCES: &[&str] = &[").unwrap();
    for url in &urls {
        writeln!(f, "    {:?},", url).unwrap();
    }
    writeln!(f, "];").unwrap();
}
