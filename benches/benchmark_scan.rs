use criterion::{criterion_group, criterion_main, Criterion};
use diyscan::address::hosts;
use diyscan::scanner::Scanner;
use std::hint::black_box;
use std::time::Duration;
use tokio::net::TcpListener;

fn enumerate_hosts(c: &mut Criterion) {
    c.bench_function("enumerate /24", |b| {
        b.iter(|| {
            hosts(black_box("192.168.1.0/24"))
                .map(|hosts| hosts.iter().count())
                .unwrap_or_default()
        });
    });
}

fn loopback_scan(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let listener = runtime.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let port = listener.local_addr().unwrap().port();

    // Keep the backlog drained so connections never wait for the timeout.
    runtime.spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });

    let scanner = Scanner::new(port, Duration::from_millis(100), 1);
    c.bench_function("scan loopback /32", |b| {
        b.iter(|| runtime.block_on(scanner.run(black_box("127.0.0.1/32"))));
    });
}

criterion_group!(benches, enumerate_hosts, loopback_scan);
criterion_main!(benches);
