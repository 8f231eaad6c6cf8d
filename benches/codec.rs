use criterion::{black_box, criterion_group, criterion_main, Criterion};

use packstream::{pack, unpack, DateTime, Dictionary, TimeZone, Value, Version};

fn sample_values() -> Vec<(&'static str, Value, Version)> {
    let mut dict = Dictionary::new();
    for i in 0..16 {
        dict.insert(format!("{:02X}", i), Value::Integer(i));
    }
    vec![
        ("null", Value::Null, Version::default()),
        ("integer", Value::Integer(0x8000), Version::default()),
        ("float", Value::Float(3.141592653589793), Version::default()),
        ("string", Value::String("A".repeat(0x100)), Version::default()),
        (
            "list",
            Value::List(vec![Value::Integer(0); 0x100]),
            Version::default(),
        ),
        ("dict", Value::Dictionary(dict), Version::default()),
        (
            "datetime",
            Value::DateTime(
                DateTime::new(2018, 10, 1, 12, 34, 56, 789_123_456)
                    .unwrap()
                    .with_timezone(TimeZone::utc()),
            ),
            Version::V2_0,
        ),
    ]
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack");
    for (name, value, version) in sample_values() {
        group.bench_function(name, |b| {
            b.iter(|| pack(black_box(&value), version).unwrap())
        });
    }
    group.finish();
}

fn bench_unpack(c: &mut Criterion) {
    let mut group = c.benchmark_group("unpack");
    for (name, value, version) in sample_values() {
        let data = pack(&value, version).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                unpack(black_box(&data), version)
                    .next()
                    .unwrap()
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pack, bench_unpack);
criterion_main!(benches);
