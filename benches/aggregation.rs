/// Presence parsing and aggregation benchmarks
///
/// Synthetic export: users x working days, one row per day.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use presence_analyzer::aggregate::{group_by_month, group_by_start_end, group_by_weekday};
use presence_analyzer::parser::parse_records;
use std::time::Duration;

fn synthetic_csv(users: usize, days: usize) -> String {
    let mut csv = String::from("user_id,date,start,end\n");
    for user in 0..users {
        for day in 0..days {
            let month = day / 28 % 12 + 1;
            let dom = day % 28 + 1;
            let year = 2010 + day / (28 * 12);
            csv.push_str(&format!(
                "{},{:04}-{:02}-{:02},{:02}:{:02}:00,{:02}:{:02}:00\n",
                user,
                year,
                month,
                dom,
                8 + day % 3,
                (user * 7 + day) % 60,
                16 + day % 2,
                (user * 11 + day) % 60
            ));
        }
    }
    csv
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_records");
    group.measurement_time(Duration::from_secs(5));

    for users in [10usize, 100].iter() {
        let csv = synthetic_csv(*users, 250);
        group.throughput(Throughput::Elements((*users * 250) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(users), &csv, |b, csv| {
            b.iter(|| parse_records(black_box(csv.as_bytes())).unwrap());
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let csv = synthetic_csv(1, 2000);
    let (store, _) = parse_records(csv.as_bytes()).unwrap();
    let days = store.user(0).unwrap();

    let mut group = c.benchmark_group("aggregate");
    group.throughput(Throughput::Elements(days.len() as u64));

    group.bench_function("group_by_weekday", |b| {
        b.iter(|| group_by_weekday(black_box(days)));
    });
    group.bench_function("group_by_start_end", |b| {
        b.iter(|| group_by_start_end(black_box(days)));
    });
    group.bench_function("group_by_month", |b| {
        b.iter(|| group_by_month(black_box(days)));
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_aggregate);
criterion_main!(benches);
