//! Benchmarks comparing declarative plans with record traversals.
//!
//! The traversal of the quantified customer query is
//! O(customers x expensive parts x shipments), so the gap widens quickly.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use shipdb_database::{Config, NewCustomer, Part, Repository, RequestContext, Shipment};
use time::macros::datetime;
use time::{Date, Month};

fn ctx() -> RequestContext {
    RequestContext::at(datetime!(2024-07-01 00:00 UTC))
}

/// 20 parts, half of them expensive; one customer per ten shipments.
fn seeded_repo(shipments: usize) -> Repository {
    let repo = Repository::connect(Config::default()).unwrap();
    let ctx = ctx();

    for i in 0..20i64 {
        repo.create_part(
            &ctx,
            &Part {
                part_code: format!("P{:02}", i),
                part_type: "detail".into(),
                name: format!("Part {}", i),
                unit: "pcs".into(),
                plan_price: Decimal::from(50 + i * 10),
            },
        )
        .unwrap();
    }

    let customers = (shipments / 10).max(1);
    for i in 0..customers {
        repo.create_customer(
            &ctx,
            &NewCustomer {
                name: format!("Customer {}", i),
                address: format!("Street {}", i),
                city: ["Казань", "Москва", "Пермь"][i % 3].into(),
            },
        )
        .unwrap();
    }

    for i in 0..shipments {
        let day = (i % 28) as u8 + 1;
        repo.create_shipment(
            &ctx,
            &Shipment {
                warehouse_no: if i % 4 == 0 { 3 } else { 5 },
                shipment_doc_no: i as i64,
                customer_id: (i % customers) as i64 + 1,
                part_code: format!("P{:02}", (i * 7) % 20),
                unit: "pcs".into(),
                qty: Decimal::new((i % 500) as i64 + 1, 1),
                shipment_date: Date::from_calendar_date(2024, Month::May, day).unwrap(),
            },
        )
        .unwrap();
    }

    repo
}

fn bench_qualified_customers(c: &mut Criterion) {
    let mut group = c.benchmark_group("qualified_customers");
    for size in [100usize, 1_000] {
        let repo = seeded_repo(size);
        let ctx = ctx();

        group.bench_with_input(BenchmarkId::new("declarative", size), &size, |b, _| {
            b.iter(|| black_box(repo.qualified_customers(&ctx).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("records", size), &size, |b, _| {
            b.iter(|| black_box(repo.qualified_customers_records(&ctx).unwrap()))
        });
    }
    group.finish();
}

fn bench_city_shipments(c: &mut Criterion) {
    let mut group = c.benchmark_group("city_shipments");
    let size = 5_000usize;
    let repo = seeded_repo(size);
    let ctx = ctx();

    group.bench_with_input(BenchmarkId::new("declarative", size), &size, |b, _| {
        b.iter(|| black_box(repo.city_shipments(&ctx, "Казань").unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("records", size), &size, |b, _| {
        b.iter(|| black_box(repo.city_shipments_records(&ctx, "Казань").unwrap()))
    });
    group.finish();
}

fn bench_part_shares(c: &mut Criterion) {
    let mut group = c.benchmark_group("part_shares");
    let size = 5_000usize;
    let repo = seeded_repo(size);
    let ctx = ctx();

    group.bench_with_input(BenchmarkId::new("declarative", size), &size, |b, _| {
        b.iter(|| black_box(repo.current_year_shares(&ctx).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("records", size), &size, |b, _| {
        b.iter(|| black_box(repo.current_year_shares_records(&ctx).unwrap()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_qualified_customers,
    bench_city_shipments,
    bench_part_shares
);
criterion_main!(benches);
