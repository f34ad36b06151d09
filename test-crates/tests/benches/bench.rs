use criterion::BenchmarkId;
use criterion::Throughput;
use criterion::{criterion_group, criterion_main, Criterion};
use render_wasmer_host::prelude::*;
use render_wasmer_host::result::decode_text_result;
use render_wasmer_host::string;
use test::wasms::TestWasm;
use test::Recorder;
use test_common::wave_guest;

/// a figure with `n` signals
fn figure(n: usize) -> String {
    let signals: Vec<String> = (0..n)
        .map(|i| format!(r#"{{"name":"s{}","wave":"p..01x.=.."}}"#, i))
        .collect();
    format!(r#"{{"signal":[{}]}}"#, signals.join(","))
}

/// one encode, render, decode exchange
fn exchange<G: GuestModule>(guest: &mut G, text: &str, config: &HostConfig) -> GuestOutcome<String> {
    let ptr = {
        let mut encoded = string::encode(&mut *guest, text, config).unwrap();
        let (ptr, len) = encoded.hand_over();
        encoded.guest().render(ptr, len).unwrap()
    };
    decode_text_result(guest, ptr, SCHEMA_V2.status_count).unwrap()
}

/// compile and instantiate the stub
pub fn wasm_instance(c: &mut Criterion) {
    let mut group = c.benchmark_group("wasm_instance");

    for wasm in [TestWasm::Stub, TestWasm::Legacy, TestWasm::Renamed] {
        group.bench_function(BenchmarkId::new("wasm_instance", wasm.name()), |b| {
            b.iter(|| {
                wasm.guest().unwrap();
            })
        });
    }

    group.finish()
}

/// full render exchange against the in-process guest
pub fn render_arena(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_arena");
    let config = HostConfig::default();

    for n in [1, 10, 100, 1_000] {
        let text = figure(n);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("render_arena", n), &text, |b, text| {
            let mut guest = wave_guest();
            b.iter(|| {
                assert!(exchange(&mut guest, text, &config).is_ok());
            });
        });
    }

    group.finish()
}

/// full render exchange through wasmer, the stub echoes its input
pub fn render_wasmer(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_wasmer");
    let config = HostConfig::default();

    for n in [1, 10, 100, 1_000] {
        let text = figure(n);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("render_wasmer", n), &text, |b, text| {
            let mut guest = TestWasm::Stub.guest().unwrap();
            b.iter(|| {
                assert!(exchange(&mut guest, text, &config).is_ok());
            });
        });
    }

    group.finish()
}

/// a control change plus the re-render it triggers
pub fn parameter_change(c: &mut Criterion) {
    let mut group = c.benchmark_group("parameter_change");

    group.bench_function("parameter_change", |b| {
        let mut driver =
            RenderDriver::new(wave_guest(), Recorder::default(), HostConfig::default()).unwrap();
        driver.handle(Event::TextEdited(figure(10))).unwrap();
        let mut width = 0_u32;
        b.iter(|| {
            width = (width + 1) % 64;
            driver
                .handle(Event::ParameterChanged {
                    key: "cycle-width".into(),
                    change: ControlChange::Text(width.to_string()),
                })
                .unwrap();
        });
    });

    group.finish()
}

criterion_group!(
    benches,
    wasm_instance,
    render_arena,
    render_wasmer,
    parameter_change
);

criterion_main!(benches);
