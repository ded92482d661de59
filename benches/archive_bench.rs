use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scavenger::{Decoder, Encoder};
use tempfile::TempDir;

fn bench_encode_single_object(c: &mut Criterion) {
    let data = vec![42u8; 1024 * 1024];
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bench.scv");

    c.bench_function("encode_1mb_single_object", |b| {
        b.iter(|| {
            let mut enc = Encoder::new(&path, "01020304", "bench1").unwrap();
            enc.begin_object().unwrap();
            for chunk in black_box(&data).chunks(16 * 1024) {
                enc.write(chunk).unwrap();
            }
            enc.complete().unwrap();
        })
    });
}

fn bench_encode_small_objects(c: &mut Criterion) {
    let data = vec![7u8; 64];
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bench.scv");

    c.bench_function("encode_1000_small_objects", |b| {
        b.iter(|| {
            let mut enc = Encoder::new(&path, "01020304", "bench1").unwrap();
            for _ in 0..1000 {
                enc.begin_object().unwrap();
                enc.write(black_box(&data)).unwrap();
            }
            enc.complete().unwrap();
        })
    });
}

fn bench_decode_reads(c: &mut Criterion) {
    let data = vec![42u8; 1024 * 1024];
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bench.scv");
    let mut enc = Encoder::new(&path, "01020304", "bench1").unwrap();
    enc.begin_object().unwrap();
    enc.write(&data).unwrap();
    enc.complete().unwrap();

    c.bench_function("read_full_1mb", |b| {
        let mut dec = Decoder::open(&path).unwrap();
        b.iter(|| dec.read_full(black_box(0)).unwrap())
    });

    c.bench_function("read_4k_ranged", |b| {
        let mut dec = Decoder::open(&path).unwrap();
        b.iter(|| dec.read(black_box(0), 512 * 1024, 4096).unwrap())
    });
}

criterion_group!(
    benches,
    bench_encode_single_object,
    bench_encode_small_objects,
    bench_decode_reads
);
criterion_main!(benches);
