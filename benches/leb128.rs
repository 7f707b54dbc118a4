use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use protowire::leb128::LebCodec;
use protowire::ByteReader;

fn encoded_values() -> Vec<([u8; 16], usize)> {
    vec![
        1,
        0x0000_0000_0000_0080,
        0x0000_0000_0000_8000,
        0x0000_0000_0080_0000,
        0x0000_0000_8000_0000,
        0x0000_0080_0000_0000,
        0x0080_0000_0000_0000,
        0x8000_0000_0000_0000,
    ]
    .into_iter()
    .map(|value: u64| {
        let mut buffer: [u8; 16] = [0u8; 16];
        let len = value.encode_leb128(&mut buffer.as_mut_slice());
        (buffer, len)
    })
    .collect()
}

fn leb128_decoding_single(c: &mut Criterion) {
    let values = encoded_values();

    let mut group = c.benchmark_group("decoding_single");
    for (data, len) in &values {
        group.bench_with_input(BenchmarkId::new("protowire", len), &data, |b, data| {
            b.iter(|| {
                let value = u64::decode_leb128(&data[..]);
                std::hint::black_box(value)
            })
        });
        group.bench_with_input(BenchmarkId::new("leb128", len), &data, |b, data| {
            b.iter(|| {
                let value = leb128::read::unsigned(&mut &data[..]);
                std::hint::black_box(value)
            })
        });
    }
}

fn leb128_decoding_many(c: &mut Criterion) {
    let values = encoded_values();

    let mut group = c.benchmark_group("decoding_many");
    group.bench_with_input(
        BenchmarkId::new("protowire", values.len()),
        &values,
        |b, data| {
            b.iter(|| {
                for (value, _len) in data {
                    let value = u64::decode_leb128(&value[..]);
                    let _ = std::hint::black_box(value);
                }
            });
        },
    );

    // The same varints back to back, read through a reader.
    let stream: Vec<u8> = values
        .iter()
        .flat_map(|(data, len)| data[..*len].iter().copied())
        .collect();
    group.bench_with_input(
        BenchmarkId::new("protowire reader", values.len()),
        &stream,
        |b, data| {
            b.iter(|| {
                let mut reader = ByteReader::new(&data[..]);
                while !reader.is_at_end().unwrap() {
                    let value = reader.read_varint64().unwrap();
                    std::hint::black_box(value);
                }
            });
        },
    );
}

criterion_group!(decoding, leb128_decoding_single, leb128_decoding_many);
criterion_main!(decoding);
