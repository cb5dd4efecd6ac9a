use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use slot_engine::slots::{AFTERNOON_SLOT, FRIDAY_SLOT, MORNING_SLOT};
use slot_engine::{candidate_dates, AvailabilityEngine, BookedMap};

/// A snapshot where every other weekday in the next quarter is full.
fn busy_snapshot(today: NaiveDate) -> BookedMap {
    let mut map = BookedMap::new();
    for (i, date) in candidate_dates(today, 0, 65).into_iter().enumerate() {
        if i % 2 == 0 {
            map.insert(date, MORNING_SLOT);
            map.insert(date, AFTERNOON_SLOT);
            map.insert(date, FRIDAY_SLOT);
        }
    }
    map
}

fn bench_window(c: &mut Criterion) {
    let engine = AvailabilityEngine::default();
    let today = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
    let map = busy_snapshot(today);

    c.bench_function("valid_dates/7_of_busy_quarter", |b| {
        b.iter(|| engine.valid_dates(black_box(&map), black_box(today), 2, 7))
    });

    c.bench_function("eligibility/single_day", |b| {
        b.iter(|| engine.eligibility(black_box(today), black_box(&map)))
    });
}

criterion_group!(benches, bench_window);
criterion_main!(benches);
