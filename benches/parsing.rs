//! Parsing benchmarks for YACS
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// csearch style output: `files` files with `lines` matches each, spread out
/// so every file renders a few gap markers
fn sample_results(files: usize, lines: u32) -> String {
    let mut out = String::new();
    for f in 0..files {
        for l in 0..lines {
            let line_number = l * 7 + 1;
            out.push_str(&format!(
                "src/module_{f}/file_{f}.rs:{line_number}:    let value_{l} = compute({l});\n"
            ));
        }
    }
    out
}

fn bench_query_parsing(c: &mut Criterion) {
    let queries = vec![
        "simple",
        "two words",
        "\"exact phrase\"",
        "foo file:.*rs$",
        "MyClass case:no",
        r#""Hello, World" printf file:.*c$ case:no"#,
        r#"\"escaped quote" path\\with\\backslashes"#,
        "Foo::bar::baz file:*",
    ];

    let mut group = c.benchmark_group("query_parsing");
    for query in queries {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, &q| {
            b.iter(|| yacs::parse_query(black_box(q)))
        });
    }
    group.finish();
}

fn bench_result_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("result_parsing");
    for (files, lines) in [(1, 10), (10, 10), (100, 20)] {
        let text = sample_results(files, lines);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{files}x{lines}")),
            &text,
            |b, text| b.iter(|| yacs::parse_results(black_box(text))),
        );
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let text = sample_results(50, 20);
    let groups = yacs::parse_results(&text).expect("sample results parse");
    let query = yacs::parse_query("compute").expect("sample query parses");

    c.bench_function("render_results_view", |b| {
        b.iter(|| {
            yacs::output::ResultsView::render(
                black_box("compute"),
                Some(&query),
                black_box(&groups),
            )
        })
    });
}

criterion_group!(benches, bench_query_parsing, bench_result_parsing, bench_render);

criterion_main!(benches);
