// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;
extern crate quadbrot;

use criterion::Criterion;
use quadbrot::{configure, render, RenderMode, RenderRequest};

fn bench_strategies(c: &mut Criterion) {
    let cases = [
        ("sequence", RenderMode::Sequence, 1),
        ("region", RenderMode::Region, 1),
        ("concurrent", RenderMode::Concurrent, 4),
    ];
    for &(name, mode, jobs) in &cases {
        let request = RenderRequest {
            width: 320,
            height: 240,
            render: mode,
            jobs,
            ..RenderRequest::default()
        };
        let config = match configure(&request) {
            Ok(config) => config,
            Err(e) => panic!("bad benchmark configuration: {}", e),
        };
        c.bench_function(name, move |b| b.iter(|| render(&config)));
    }
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
