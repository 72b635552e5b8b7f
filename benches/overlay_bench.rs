// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reqpipe::{RequestOptions, Values};

fn template() -> RequestOptions {
    let mut options = RequestOptions::new();
    options.method = "GET".to_string();
    options.url = "https://example.com/api?v=1".to_string();
    options
        .headers
        .insert("User-Agent".to_string(), vec!["reqpipe-bench".to_string()]);
    options
        .headers
        .insert("Accept".to_string(), vec!["application/json".to_string()]);
    options.timeout = Some(Duration::from_secs(5));
    options.follow_redirect = Some(false);
    options
}

fn overlay_benchmark(c: &mut Criterion) {
    let source = template();

    c.bench_function("overlay_options", |b| {
        b.iter(|| {
            let mut target = RequestOptions::new();
            target.url = "https://example.com/other".to_string();
            target
                .headers
                .insert("X-Trace".to_string(), vec!["123".to_string()]);
            black_box(target.overlay(black_box(&source)))
        })
    });
}

fn build_url_benchmark(c: &mut Criterion) {
    let mut options = template();
    for i in 0..8 {
        options.query.add(format!("key{}", i), format!("value {}", i));
    }

    c.bench_function("build_url", |b| b.iter(|| black_box(options.build_url())));
}

fn form_encode_benchmark(c: &mut Criterion) {
    let form: Values = [("userName", "nxu"), ("pwd", "111"), ("q", "hello world&more")].into();

    c.bench_function("form_encode", |b| b.iter(|| black_box(form.encode())));
}

criterion_group!(benches, overlay_benchmark, build_url_benchmark, form_encode_benchmark);
criterion_main!(benches);
