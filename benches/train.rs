//! Criterion benchmarks for the training engine.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bprop::network::{Network, PropagateMode};
use bprop::patterns::PatternPairs;
use bprop::spec::NetworkSpec;

/// A layered net: `ninputs` inputs, one hidden layer of the same width,
/// and `ninputs` outputs, fully connected layer to layer.
fn layered_net(ninputs: usize) -> Network {
    let nunits = ninputs * 3;
    let text = format!(
        "definitions:\nnunits {nunits}\nninputs {ninputs}\nnoutputs {ninputs}\nend\n\
         network:\n%r {ninputs} {ninputs} 0 {ninputs}\n\
         %r {} {ninputs} {ninputs} {ninputs}\nend\n\
         biases:\n%r {ninputs} {}\nend\n",
        ninputs * 2,
        ninputs * 2,
    );
    let spec = NetworkSpec::parse(&text).unwrap();
    let mut net = Network::from_spec(spec, 42);

    // Identity-mapping pattern set: each pattern lights one input and
    // targets the matching output.
    let mut pairs = PatternPairs::default();
    for p in 0..ninputs {
        pairs.names.push(format!("p{p}"));
        let mut v = vec![0.0; ninputs];
        v[p] = 1.0;
        pairs.inputs.push(v.clone());
        pairs.targets.push(v);
    }
    net.load_patterns(pairs).unwrap();
    net
}

fn bench_epoch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("epoch");

    for size in [4usize, 8, 16, 32].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("direct", size), size, |b, &size| {
            let mut net = layered_net(size);
            net.nepochs = 1;
            b.iter(|| {
                net.train_sequential().unwrap();
                black_box(net.tss)
            });
        });
    }

    group.finish();
}

fn bench_cascade_trial(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade_trial");

    let mut net = layered_net(8);
    net.mode = PropagateMode::Cascade;
    net.ncycles = 50;
    group.bench_function("settle_50", |b| {
        b.iter(|| {
            net.test_pattern("p0").unwrap();
            black_box(net.pss)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_epoch_sizes, bench_cascade_trial);
criterion_main!(benches);
