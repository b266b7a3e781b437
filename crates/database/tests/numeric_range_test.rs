//! Quantities and prices at the edge of the decimal range.
//!
//! Totals that leave the range fail the read with `NumericOverflow` on both
//! strategies; totals that stay inside it are computed exactly.

use rust_decimal::Decimal;
use shipdb_database::{
    Config, Error, ErrorCategory, NewCustomer, Part, PartShare, Repository, RequestContext,
    Result, Shipment,
};
use time::macros::{date, datetime};
use time::Date;

fn ctx() -> RequestContext {
    RequestContext::at(datetime!(2024-06-15 12:00 UTC))
}

/// A store with parts P1 and P2 priced as given and one customer, id 1.
fn store(p1_price: Decimal, p2_price: Decimal) -> Repository {
    let repo = Repository::connect(Config::default()).unwrap();
    for (code, price) in [("P1", p1_price), ("P2", p2_price)] {
        repo.create_part(
            &ctx(),
            &Part {
                part_code: code.into(),
                part_type: "bolt".into(),
                name: format!("Part {code}"),
                unit: "pcs".into(),
                plan_price: price,
            },
        )
        .unwrap();
    }
    repo.create_customer(
        &ctx(),
        &NewCustomer {
            name: "Alice".into(),
            address: "Main st. 1".into(),
            city: "Казань".into(),
        },
    )
    .unwrap();
    repo
}

fn ship(repo: &Repository, doc: i64, part_code: &str, qty: Decimal, shipment_date: Date) {
    repo.create_shipment(
        &ctx(),
        &Shipment {
            warehouse_no: 1,
            shipment_doc_no: doc,
            customer_id: 1,
            part_code: part_code.into(),
            unit: "pcs".into(),
            qty,
            shipment_date,
        },
    )
    .unwrap();
}

fn assert_overflow<T: std::fmt::Debug>(result: Result<T>) -> String {
    match result {
        Err(err @ Error::NumericOverflow(_)) => {
            assert_eq!(err.category(), ErrorCategory::Internal);
            err.to_string()
        }
        other => panic!("expected numeric overflow, got {:?}", other),
    }
}

fn both_shares(repo: &Repository) -> (Result<Vec<PartShare>>, Result<Vec<PartShare>>) {
    (
        repo.current_year_shares(&ctx()),
        repo.current_year_shares_records(&ctx()),
    )
}

#[test]
fn test_part_total_overflow_fails_both_strategies() {
    let repo = store(Decimal::ONE, Decimal::ONE);
    ship(&repo, 1, "P1", Decimal::MAX, date!(2024 - 02 - 01));
    ship(&repo, 2, "P1", Decimal::MAX, date!(2024 - 03 - 01));

    let (declarative, records) = both_shares(&repo);
    let declarative = assert_overflow(declarative);
    let records = assert_overflow(records);
    assert_eq!(declarative, records);
    assert_eq!(declarative, "numeric overflow in SUM");
}

#[test]
fn test_previous_year_maximum_does_not_count() {
    let repo = store(Decimal::ONE, Decimal::ONE);
    ship(&repo, 1, "P1", Decimal::MAX, date!(2023 - 12 - 31));
    ship(&repo, 2, "P1", Decimal::MAX, date!(2024 - 01 - 01));

    let (declarative, records) = both_shares(&repo);
    let declarative = declarative.unwrap();
    assert_eq!(declarative, records.unwrap());
    assert_eq!(declarative.len(), 1);
    assert_eq!(declarative[0].total_part_qty, Decimal::MAX);
    assert_eq!(declarative[0].share_of_total, Decimal::ONE_HUNDRED);
}

#[test]
fn test_total_at_the_maximum_is_exact() {
    let repo = store(Decimal::ONE, Decimal::ONE);
    ship(&repo, 1, "P1", Decimal::MAX - Decimal::ONE, date!(2024 - 02 - 01));
    ship(&repo, 2, "P1", Decimal::ONE, date!(2024 - 03 - 01));
    ship(&repo, 3, "P2", Decimal::new(5, 1), date!(2024 - 03 - 02));

    let (declarative, records) = both_shares(&repo);
    let declarative = declarative.unwrap();
    assert_eq!(declarative, records.unwrap());
    assert_eq!(declarative.len(), 3);
    assert!(declarative[..2]
        .iter()
        .all(|row| row.total_part_qty == Decimal::MAX));
    assert_eq!(declarative[1].share_of_total, Decimal::ZERO);
    assert_eq!(declarative[2].share_of_total, Decimal::ONE_HUNDRED);

    // One more unit leaves the range.
    ship(&repo, 4, "P1", Decimal::ONE, date!(2024 - 04 - 01));
    let (declarative, records) = both_shares(&repo);
    assert_eq!(assert_overflow(declarative), assert_overflow(records));
}

#[test]
fn test_summary_line_value_overflow_is_reported() {
    let price = Decimal::from(10_000_000_000i64);
    let repo = store(price, Decimal::ONE);
    let qty = Decimal::from_i128_with_scale(10i128.pow(20), 0);
    ship(&repo, 1, "P1", qty, date!(2024 - 01 - 10));
    ship(&repo, 2, "P1", Decimal::ONE, date!(2024 - 01 - 11));
    ship(&repo, 3, "P2", Decimal::from(7), date!(2024 - 01 - 12));

    assert_overflow(repo.customer_summary(&ctx(), 1));
    assert_overflow(repo.full_shipment_info(&ctx()));
}

#[test]
fn test_summary_at_price_boundary() {
    let repo = store(Decimal::MAX, Decimal::ONE);
    ship(&repo, 1, "P1", Decimal::ONE, date!(2024 - 01 - 10));

    let summary = repo.customer_summary(&ctx(), 1).unwrap();
    assert_eq!(summary.total_qty, Decimal::ONE);
    assert_eq!(summary.total_value, Decimal::MAX);

    // The value total leaves the range while the quantity total does not.
    ship(&repo, 2, "P2", Decimal::ONE, date!(2024 - 01 - 11));
    assert_overflow(repo.customer_summary(&ctx(), 1));
}

#[test]
fn test_boundary_errors_agree_across_queries() {
    let repo = store(Decimal::ONE, Decimal::ONE);
    ship(&repo, 1, "P1", Decimal::MAX, date!(2024 - 05 - 01));
    ship(&repo, 2, "P1", Decimal::MAX, date!(2024 - 05 - 02));

    let (declarative, records) = both_shares(&repo);
    let shares = assert_overflow(declarative);
    assert_eq!(shares, assert_overflow(records));
    assert_eq!(shares, assert_overflow(repo.customer_summary(&ctx(), 1)));
}

#[test]
fn test_line_value_overflow_precedes_sum() {
    let repo = store(Decimal::from(2), Decimal::ONE);
    ship(&repo, 1, "P1", Decimal::MAX, date!(2024 - 05 - 01));

    let summary = assert_overflow(repo.customer_summary(&ctx(), 1));
    assert_ne!(summary, "numeric overflow in SUM");
    assert!(summary.ends_with(" * 2"));

    // A single line keeps the part total in range.
    let (declarative, records) = both_shares(&repo);
    assert_eq!(declarative.unwrap(), records.unwrap());
}
