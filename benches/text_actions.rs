//! Benchmarks for text actions applied to a checkout on disk.
//!
//! Each iteration rewrites the same file, so the numbers include one read and
//! one write per action.

use std::fs;

use cannon::actions::{parse, Action, ActionConfig, Arguments};
use cannon::cancel::CancellationToken;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::TempDir;

/// A Cargo.toml-like file with `lines` dependency entries.
fn manifest(lines: usize) -> String {
    let mut content = String::from("[package]\nname = \"widgets\"\nversion = \"1.0.0\"\n\n[dependencies]\n");
    for i in 0..lines {
        content.push_str(&format!("dep{i} = \"0.{i}\"\n"));
    }
    content
}

fn action(t: &str, search: &str, apply: &str) -> Action {
    parse(&ActionConfig {
        r#type: t.to_string(),
        search_text: search.to_string(),
        apply_text: apply.to_string(),
        path: "Cargo.toml".to_string(),
        ..Default::default()
    })
    .unwrap()
}

fn bench_text_actions(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let content = manifest(2_000);
    let token = CancellationToken::new();
    let args = Arguments::for_repository("Acme/widgets");

    let cases = [
        ("replace_line", action("replaceLine", "^version = ", "version = \"2.0.0\"")),
        ("delete_line", action("deleteLine", "^dep1[0-9]* = ", "")),
        ("replace_text", action("replaceText", "\"0\\.(\\d+)\"", "\"1.$1\"")),
        ("append_text", action("appendText", "^name = .*", "\nrepository = \"${REPO_OWNER}/${REPO_NAME}\"")),
        ("delete_text", action("deleteText", " = \"0\\.\\d+\"", "")),
    ];

    let mut group = c.benchmark_group("text_actions");
    for (name, action) in &cases {
        group.bench_function(*name, |b| {
            b.iter(|| {
                fs::write(dir.path().join("Cargo.toml"), &content).unwrap();
                black_box(action.run(&token, dir.path(), &args).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_text_actions);
criterion_main!(benches);
