use cryptopulse_core::errors::CoreError;
use cryptopulse_core::models::coin::{MarketSnapshot, MarketSort};
use cryptopulse_core::models::portfolio::{AddEntryRequest, PortfolioEntry};
use cryptopulse_core::services::display;
use cryptopulse_core::services::market_service::MarketService;
use cryptopulse_core::services::portfolio_service::PortfolioService;
use cryptopulse_core::services::valuation_service::ValuationService;

fn snap(id: &str, name: &str, price: f64, cap: f64) -> MarketSnapshot {
    MarketSnapshot::new(id, name, &id[..3.min(id.len())], price, cap)
}

fn entry(id: &str, quantity: f64, buy_price: f64) -> PortfolioEntry {
    PortfolioEntry::new(id, id, &id[..3.min(id.len())], quantity, buy_price)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn market() -> Vec<MarketSnapshot> {
    vec![
        snap("bitcoin", "Bitcoin", 48000.0, 950e9),
        snap("ethereum", "Ethereum", 3000.0, 360e9),
        snap("tether", "Tether", 1.0, 110e9),
        snap("solana", "Solana", 150.0, 70e9),
        snap("bitcoin-cash", "Bitcoin Cash", 400.0, 8e9),
    ]
}

// ═══════════════════════════════════════════════════════════════════
//  ValuationService
// ═══════════════════════════════════════════════════════════════════

mod valuation {
    use super::*;

    #[test]
    fn single_matched_entry() {
        let v = ValuationService::new().valuate(
            &[entry("bitcoin", 2.0, 40000.0)],
            &[snap("bitcoin", "Bitcoin", 48000.0, 1.0)],
        );

        let e = &v.entries[0];
        assert!(e.matched);
        assert_eq!(e.index, 0);
        assert_eq!(e.current_price, 48000.0);
        assert_eq!(e.invested_value, 80000.0);
        assert_eq!(e.current_value, 96000.0);
        assert_eq!(e.profit, 16000.0);
        assert!(approx(e.profit_percent, 20.0));

        assert_eq!(v.total_invested, 80000.0);
        assert_eq!(v.total_current, 96000.0);
        assert_eq!(v.total_profit, 16000.0);
        assert!(approx(v.total_profit_percent, 20.0));
    }

    #[test]
    fn unmatched_entry_valued_at_zero() {
        let v = ValuationService::new().valuate(&[entry("ethereum", 1.0, 3000.0)], &[]);

        let e = &v.entries[0];
        assert!(!e.matched);
        assert_eq!(e.current_price, 0.0);
        assert_eq!(e.current_value, 0.0);
        assert_eq!(e.profit, -3000.0);
        assert!(approx(e.profit_percent, -100.0));
        assert_eq!(v.total_profit, -3000.0);
        assert_eq!(v.unmatched().count(), 1);
    }

    #[test]
    fn mixed_matched_and_unmatched() {
        let v = ValuationService::new().valuate(
            &[entry("bitcoin", 2.0, 40000.0), entry("dogecoin", 1000.0, 0.1)],
            &market(),
        );
        assert_eq!(v.entries.len(), 2);
        assert!(v.entries[0].matched);
        assert!(!v.entries[1].matched);
        assert!(approx(v.total_invested, 80100.0));
        assert!(approx(v.total_current, 96000.0));
        assert!(approx(v.total_profit, 15900.0));
    }

    #[test]
    fn zero_invested_reports_zero_percent() {
        let v = ValuationService::new().valuate(
            &[entry("bitcoin", 1.0, 0.0)],
            &[snap("bitcoin", "Bitcoin", 48000.0, 1.0)],
        );
        assert_eq!(v.entries[0].profit, 48000.0);
        assert_eq!(v.entries[0].profit_percent, 0.0);
        assert_eq!(v.total_profit_percent, 0.0);
    }

    #[test]
    fn empty_portfolio() {
        let v = ValuationService::new().valuate(&[], &market());
        assert!(v.is_empty());
        assert_eq!(v.total_invested, 0.0);
        assert_eq!(v.total_current, 0.0);
        assert_eq!(v.total_profit, 0.0);
        assert_eq!(v.total_profit_percent, 0.0);
    }

    #[test]
    fn duplicate_entries_valued_independently() {
        let v = ValuationService::new().valuate(
            &[entry("bitcoin", 1.0, 40000.0), entry("bitcoin", 1.0, 50000.0)],
            &[snap("bitcoin", "Bitcoin", 45000.0, 1.0)],
        );
        assert_eq!(v.entries.len(), 2);
        assert_eq!(v.entries[0].profit, 5000.0);
        assert_eq!(v.entries[1].profit, -5000.0);
        assert_eq!(v.entries[1].index, 1);
        assert_eq!(v.total_profit, 0.0);
        assert_eq!(v.total_profit_percent, 0.0);
    }

    #[test]
    fn first_snapshot_wins_on_duplicate_ids() {
        let v = ValuationService::new().valuate(
            &[entry("bitcoin", 1.0, 40000.0)],
            &[
                snap("bitcoin", "Bitcoin", 45000.0, 1.0),
                snap("bitcoin", "Bitcoin", 99999.0, 1.0),
            ],
        );
        assert_eq!(v.entries[0].current_price, 45000.0);
    }

    #[test]
    fn totals_equal_sum_of_entries() {
        let entries = vec![
            entry("bitcoin", 0.5, 30000.0),
            entry("ethereum", 3.0, 2500.0),
            entry("solana", 10.0, 200.0),
            entry("unknown", 7.0, 1.5),
        ];
        let v = ValuationService::new().valuate(&entries, &market());
        let invested: f64 = v.entries.iter().map(|e| e.invested_value).sum();
        let current: f64 = v.entries.iter().map(|e| e.current_value).sum();
        assert!(approx(v.total_invested, invested));
        assert!(approx(v.total_current, current));
        assert!(approx(v.total_profit, current - invested));
    }

    #[test]
    fn inputs_are_untouched_and_result_is_repeatable() {
        let entries = vec![entry("bitcoin", 2.0, 40000.0)];
        let snapshots = market();
        let before = (entries.clone(), snapshots.clone());

        let service = ValuationService::new();
        let a = service.valuate(&entries, &snapshots);
        let b = service.valuate(&entries, &snapshots);

        assert_eq!(a, b);
        assert_eq!((entries, snapshots), before);
    }

    #[test]
    fn entry_identity_is_carried_over() {
        let v = ValuationService::new().valuate(
            &[PortfolioEntry::new("bitcoin", "Bitcoin", "btc", 1.0, 1.0)],
            &[],
        );
        let e = &v.entries[0];
        assert_eq!(e.coin_id, "bitcoin");
        assert_eq!(e.name, "Bitcoin");
        assert_eq!(e.symbol, "btc");
        assert_eq!(e.quantity, 1.0);
        assert_eq!(e.buy_price, 1.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  PortfolioService::build_entry
// ═══════════════════════════════════════════════════════════════════

mod build_entry {
    use super::*;

    fn build(coin: &str, qty: &str, price: &str) -> Result<PortfolioEntry, CoreError> {
        PortfolioService::new().build_entry(&AddEntryRequest::new(coin, qty, price), &market())
    }

    fn rejection(result: Result<PortfolioEntry, CoreError>) -> String {
        match result {
            Err(CoreError::InvalidAddInput(msg)) => msg,
            other => panic!("expected InvalidAddInput, got {other:?}"),
        }
    }

    #[test]
    fn valid_request_copies_identity_from_snapshot() {
        let e = build("bitcoin", "2", "40000").unwrap();
        assert_eq!(e.coin_id, "bitcoin");
        assert_eq!(e.name, "Bitcoin");
        assert_eq!(e.symbol, "bit");
        assert_eq!(e.quantity, 2.0);
        assert_eq!(e.buy_price, 40000.0);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let e = build("  ethereum ", " 1.5 ", "\t2999.99\n").unwrap();
        assert_eq!(e.coin_id, "ethereum");
        assert_eq!(e.quantity, 1.5);
        assert_eq!(e.buy_price, 2999.99);
    }

    #[test]
    fn fractional_and_scientific_amounts() {
        let e = build("tether", "0.000001", "1e-3").unwrap();
        assert_eq!(e.quantity, 0.000001);
        assert_eq!(e.buy_price, 0.001);
    }

    #[test]
    fn no_coin_selected() {
        assert_eq!(rejection(build("", "1", "1")), "no coin selected");
        assert_eq!(rejection(build("   ", "1", "1")), "no coin selected");
    }

    #[test]
    fn empty_fields_are_required() {
        assert_eq!(rejection(build("bitcoin", "", "1")), "quantity is required");
        assert_eq!(rejection(build("bitcoin", "1", "  ")), "buy price is required");
    }

    #[test]
    fn non_numeric_is_rejected() {
        let msg = rejection(build("bitcoin", "two", "1"));
        assert!(msg.contains("quantity"));
        assert!(msg.contains("not a number"));
        let msg = rejection(build("bitcoin", "1", "$40k"));
        assert!(msg.contains("buy price"));
    }

    #[test]
    fn zero_and_negative_are_rejected() {
        let msg = rejection(build("bitcoin", "0", "1"));
        assert!(msg.contains("greater than zero"));
        assert!(rejection(build("bitcoin", "-1", "1")).contains("greater than zero"));
        assert!(rejection(build("bitcoin", "1", "-40000")).contains("greater than zero"));
    }

    #[test]
    fn non_finite_is_rejected() {
        assert!(rejection(build("bitcoin", "inf", "1")).contains("greater than zero"));
        assert!(rejection(build("bitcoin", "1", "NaN")).contains("greater than zero"));
    }

    #[test]
    fn unknown_coin_is_rejected() {
        let msg = rejection(build("dogecoin", "1", "1"));
        assert!(msg.contains("dogecoin"));
        assert!(msg.contains("not in the loaded market data"));
    }

    #[test]
    fn no_market_data_rejects_every_coin() {
        let err = PortfolioService::new()
            .build_entry(&AddEntryRequest::new("bitcoin", "1", "1"), &[])
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidAddInput(_)));
    }

    #[test]
    fn ids_are_case_sensitive() {
        assert!(build("Bitcoin", "1", "1").is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  MarketService
// ═══════════════════════════════════════════════════════════════════

mod market {
    use super::*;

    fn ids(rows: &[MarketSnapshot]) -> Vec<&str> {
        rows.iter().map(|s| s.coin_id.as_str()).collect()
    }

    #[test]
    fn sort_by_price() {
        let svc = MarketService::new();
        let mut rows = market();
        svc.sort(&mut rows, MarketSort::PriceAsc);
        assert_eq!(ids(&rows), ["tether", "solana", "bitcoin-cash", "ethereum", "bitcoin"]);
        svc.sort(&mut rows, MarketSort::PriceDesc);
        assert_eq!(ids(&rows), ["bitcoin", "ethereum", "bitcoin-cash", "solana", "tether"]);
    }

    #[test]
    fn sort_by_market_cap() {
        let svc = MarketService::new();
        let mut rows = market();
        svc.sort(&mut rows, MarketSort::MarketCapAsc);
        assert_eq!(ids(&rows), ["bitcoin-cash", "solana", "tether", "ethereum", "bitcoin"]);
        svc.sort(&mut rows, MarketSort::MarketCapDesc);
        assert_eq!(ids(&rows), ["bitcoin", "ethereum", "tether", "solana", "bitcoin-cash"]);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut rows = vec![
            snap("aaa", "A", 1.0, 5.0),
            snap("bbb", "B", 1.0, 5.0),
            snap("ccc", "C", 1.0, 5.0),
        ];
        MarketService::new().sort(&mut rows, MarketSort::PriceDesc);
        assert_eq!(ids(&rows), ["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn sort_tolerates_nan() {
        let mut rows = vec![
            snap("aaa", "A", 2.0, 1.0),
            snap("bbb", "B", f64::NAN, 1.0),
            snap("ccc", "C", 1.0, 1.0),
        ];
        MarketService::new().sort(&mut rows, MarketSort::PriceAsc);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rows = market();
        let hits = MarketService::new().search(&rows, "BITCOIN");
        let found: Vec<&str> = hits.iter().map(|s| s.coin_id.as_str()).collect();
        assert_eq!(found, ["bitcoin", "bitcoin-cash"]);
    }

    #[test]
    fn search_matches_name_not_symbol() {
        let rows = vec![MarketSnapshot::new("bitcoin", "Bitcoin", "btc", 1.0, 1.0)];
        assert!(MarketService::new().search(&rows, "btc").is_empty());
    }

    #[test]
    fn empty_search_returns_all_in_order() {
        let rows = market();
        let hits = MarketService::new().search(&rows, "  ");
        assert_eq!(hits.len(), rows.len());
        assert_eq!(hits[0].coin_id, "bitcoin");
    }

    #[test]
    fn find_by_id() {
        let rows = market();
        let svc = MarketService::new();
        assert_eq!(svc.find(&rows, "solana").map(|s| s.current_price), Some(150.0));
        assert!(svc.find(&rows, "Solana").is_none());
        assert!(svc.find(&rows, "dogecoin").is_none());
    }

    #[test]
    fn listing_filters_then_sorts() {
        let rows = market();
        let listed = MarketService::new().listing(&rows, "coin", Some(MarketSort::PriceAsc));
        assert_eq!(ids(&listed), ["bitcoin-cash", "bitcoin"]);
    }

    #[test]
    fn listing_without_order_keeps_source_order() {
        let rows = market();
        let listed = MarketService::new().listing(&rows, "", None);
        assert_eq!(listed, rows);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  display
// ═══════════════════════════════════════════════════════════════════

mod formatting {
    use super::*;

    #[test]
    fn money_two_decimals() {
        assert_eq!(display::money(80000.0), "$80000.00");
        assert_eq!(display::money(0.005), "$0.01");
        assert_eq!(display::money(-3000.0), "$-3000.00");
    }

    #[test]
    fn signed_adds_plus_for_gains_and_zero() {
        assert_eq!(display::signed(16000.0), "+16000.00");
        assert_eq!(display::signed(0.0), "+0.00");
        assert_eq!(display::signed(-3000.0), "-3000.00");
    }

    #[test]
    fn percent_two_decimals() {
        assert_eq!(display::percent(20.0), "20.00%");
        assert_eq!(display::percent(-100.0), "-100.00%");
    }

    #[test]
    fn profit_with_percent() {
        assert_eq!(display::profit_with_percent(16000.0, 20.0), "+16000.00 (20.00%)");
        assert_eq!(display::profit_with_percent(-3000.0, -100.0), "-3000.00 (-100.00%)");
    }
}
