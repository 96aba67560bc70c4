use criterion::{black_box, criterion_group, criterion_main, Criterion};

use wanda::assemble::{assemble, AssembleOpt};
use wanda::graph::Graph;
use wanda::index::{sa, IndexConfig, Interval};

fn make_reference(len: usize) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut seq = Vec::with_capacity(len);
    let mut x: u32 = 42;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    seq
}

/// 从参考序列上截取重叠 read（步长 37，长度 100），以 `$` 拼接
fn make_stream(reference: &[u8]) -> Vec<u8> {
    let mut text = Vec::new();
    let mut start = 0;
    while start + 100 <= reference.len() {
        text.extend_from_slice(&reference[start..start + 100]);
        text.push(b'$');
        start += 37;
    }
    text
}

fn build_graph(text: &[u8], k: usize) -> Graph {
    let sa_arr = sa::build_sa(text);
    Graph::from_text(text, &sa_arr, k, IndexConfig::default()).unwrap()
}

fn bench_build_sa(c: &mut Criterion) {
    let text = make_stream(&make_reference(10_000));
    c.bench_function("build_sa_10kb", |b| {
        b.iter(|| black_box(sa::build_sa(black_box(&text))));
    });
}

fn bench_extend(c: &mut Criterion) {
    let reference = make_reference(10_000);
    let text = make_stream(&reference);
    let graph = build_graph(&text, 21);
    let index = graph.index();
    let pattern = &reference[100..120];

    c.bench_function("backward_search_20bp", |b| {
        b.iter(|| black_box(index.backward_search(black_box(pattern))));
    });
    c.bench_function("extend_full_range", |b| {
        let all = Interval::new(0, index.size() - 1);
        b.iter(|| black_box(index.extend(black_box(all), b'G')));
    });
}

fn bench_sa_lookup(c: &mut Criterion) {
    let text = make_stream(&make_reference(10_000));
    let graph = build_graph(&text, 21);
    let index = graph.index();

    c.bench_function("sa_lookup_1k_rows", |b| {
        b.iter(|| {
            for i in (0..index.size()).step_by(index.size() / 1000 + 1) {
                black_box(index.sa(i));
            }
        });
    });
}

fn bench_label(c: &mut Criterion) {
    let text = make_stream(&make_reference(10_000));
    let graph = build_graph(&text, 21);
    let nodes = graph.distinct_kmers(2);

    c.bench_function("label_k21_100_nodes", |b| {
        b.iter(|| {
            for &n in nodes.iter().take(100) {
                black_box(graph.label(n));
            }
        });
    });
}

fn bench_assemble(c: &mut Criterion) {
    let text = make_stream(&make_reference(10_000));
    let graph = build_graph(&text, 21);
    let opt = AssembleOpt {
        solid: 2,
        min_length: 50,
        threads: 1,
    };

    let mut group = c.benchmark_group("assemble");
    group.sample_size(10);
    group.bench_function("unitigs_10kb_k21", |b| {
        b.iter(|| black_box(assemble(black_box(&graph), &opt).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build_sa,
    bench_extend,
    bench_sa_lookup,
    bench_label,
    bench_assemble
);
criterion_main!(benches);
