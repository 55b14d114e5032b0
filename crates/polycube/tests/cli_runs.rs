//! Command-line runs end to end.

use clap::Parser;
use polycube::cli::{Cli, Outcome};
use polycube::format::open_source;
use polycube::prelude::*;
use polycube_test_utils::{distinct_shapes, KNOWN_COUNTS};

fn finished(args: &[&str]) -> DriverReport {
    let cli = Cli::try_parse_from(args).unwrap();
    match cli.run().unwrap() {
        Outcome::Finished(report) => report,
        Outcome::OutOfRange(message) => panic!("unexpected rejection: {message}"),
    }
}

#[test]
fn counts_small_sizes() {
    for n in 3..=6 {
        let arg = n.to_string();
        let report = finished(&["polycube", &arg, "-t", "2", "--no-progress"]);
        assert_eq!(report.count, KNOWN_COUNTS[n]);
    }
}

#[test]
fn output_file_feeds_a_later_run() {
    let dir = std::env::temp_dir().join(format!("polycube-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let cache = dir.join("cubes_5.pcube");
    let cache_arg = cache.to_str().unwrap();

    let report = finished(&["polycube", "5", "-o", cache_arg, "--no-progress"]);
    assert_eq!(report.count, KNOWN_COUNTS[5]);

    let mut source = open_source(Format::Pcube, &cache).unwrap();
    let mut keys = Vec::new();
    while source.read_batch(64, &mut keys).unwrap() > 0 {}
    assert_eq!(keys.len() as u64, KNOWN_COUNTS[5]);
    assert_eq!(distinct_shapes(&keys), keys.len());

    let out = dir.join("cubes_7.bin");
    let out_arg = out.to_str().unwrap();
    let report = finished(&[
        "polycube",
        "7",
        "-i",
        cache_arg,
        "-o",
        out_arg,
        "-t",
        "3",
        "--no-progress",
    ]);
    assert_eq!(report.count, KNOWN_COUNTS[7]);
    let source = open_source(Format::Bitface, &out).unwrap();
    assert_eq!(source.declared_count(), Some(KNOWN_COUNTS[7]));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn compressed_output_feeds_a_later_run() {
    let dir = std::env::temp_dir().join(format!("polycube-cli-gz-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let cache = dir.join("cubes_5.bin");
    let cache_arg = cache.to_str().unwrap();

    let report = finished(&["polycube", "5", "-o", cache_arg, "-z", "--no-progress"]);
    assert_eq!(report.count, KNOWN_COUNTS[5]);
    assert_eq!(std::fs::read(&cache).unwrap()[..2], [0x1Fu8, 0x8B]);

    let report = finished(&["polycube", "6", "-i", cache_arg, "-t", "2", "--no-progress"]);
    assert_eq!(report.count, KNOWN_COUNTS[6]);

    std::fs::remove_dir_all(&dir).unwrap();
}
