use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The HTML fixtures, sorted so the generated file is stable.
fn fixtures(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut fixtures = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(false, |ext| ext == "html") {
            fixtures.push(path);
        }
    }
    fixtures.sort();
    Ok(fixtures)
}

fn test_name(fixture: &Path) -> String {
    let stem = fixture.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed");
    let ident = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect::<String>();
    format!("landmarks_{}", ident)
}

fn main() -> io::Result<()> {
    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR"));
    let tests_dir = manifest_dir.join("tests");
    let expectations = tests_dir.join("expectations");

    println!("cargo:rerun-if-changed=tests/html");

    let mut generated = fs::File::create(out_dir.join("tests.rs"))?;
    for fixture in fixtures(&tests_dir.join("html"))? {
        writeln!(
            generated,
            "test_doc!({}, {:?}, {:?});",
            test_name(&fixture),
            fixture,
            expectations
        )?;
    }
    Ok(())
}
