//! Reference tests: each `tests/html/*.html` is scanned with every option on,
//! and the printed landmark tree is compared to
//! `tests/expectations/<file>.landmarks.txt`.
//!
//! A mismatch rewrites the expectation, so a run followed by `git diff` shows
//! what changed.

use landmarks::dom;
use landmarks::{LandmarksFinder, ScanOptions};
use std::fs;
use std::path::Path;

fn print_diff(expected: &str, actual: &str) {
    println!("diff expected generated");
    for line in diff::lines(expected, actual) {
        match line {
            diff::Result::Left(l) => println!("-{}", l),
            diff::Result::Both(l, _) => println!(" {}", l),
            diff::Result::Right(r) => println!("+{}", r),
        }
    }
}

fn scan_fixture(html_file: &str) -> LandmarksFinder {
    let mut html = fs::File::open(html_file).unwrap();
    let document = dom::build_dom(&mut html).unwrap();
    let mut finder = LandmarksFinder::new(document, ScanOptions { heuristics: true, developer_mode: true });
    finder.scan();
    finder.landmark_tree().validate().unwrap();
    finder
}

fn check_against_expectation(html_file: &str, expectations_directory: &str) {
    let finder = scan_fixture(html_file);
    let mut printed = Vec::new();
    finder.print_to(&mut printed).unwrap();
    let actual = String::from_utf8(printed).unwrap();

    let file_name = Path::new(html_file).file_name().unwrap().to_str().unwrap();
    let expectation = Path::new(expectations_directory).join(format!("{}.landmarks.txt", file_name));
    let expected = fs::read_to_string(&expectation).unwrap_or_default();
    if actual == expected {
        return;
    }

    fs::write(&expectation, &actual).unwrap();
    println!("Landmarks of {} differed", file_name);
    print_diff(&expected, &actual);
    panic!("Expectation and test mismatch!");
}

macro_rules! test_doc {
    ($function:ident, $html_file:expr, $expectations_directory:expr) => {
        #[test]
        fn $function() {
            check_against_expectation($html_file, $expectations_directory);
        }
    };
}

include!(concat!(env!("OUT_DIR"), "/tests.rs"));
