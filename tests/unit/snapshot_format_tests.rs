//! Persisted snapshot document format.
//!
//! The JSON layout is normative: enums as textual labels, timestamps as
//! `YYYY-MM-DD HH:MM:SS.ffffff` in UTC, dates as `YYYY-MM-DD`, absent
//! optionals as `null`, pages in priority order.

use crate::listed_instrument;
use chrono::DateTime;
use venue_sim::domain::{
    AggressorSide, ClientOrderId, CumExecutedQuantity, InstrumentDescriptor, InstrumentInfo,
    InstrumentState, LimitOrder, MarketPhase, OrderBookState, OrderId, OrderPrice, OrderQuantity,
    OrderStatus, Party, PartyId, PartyIdSource, PartyRole, Price, Quantity, Session, Side,
    Snapshot, TimeInForce, Trade,
};
use venue_sim::prelude::FixSession;

fn sample_order() -> LimitOrder {
    LimitOrder {
        client_instrument_descriptor: InstrumentDescriptor::for_symbol("AAPL"),
        client_session: Session::Fix(FixSession::new("FIX.4.4", "CLIENT", "VENUE")),
        client_order_id: Some(ClientOrderId::new("C-77")),
        order_parties: vec![Party::from_parts(
            PartyId::new("FIRM-1"),
            PartyIdSource::Bic,
            PartyRole::ExecutingFirm,
        )],
        expire_time: None,
        expire_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 2),
        short_sale_exemption_reason: None,
        time_in_force: TimeInForce::GoodTillDate,
        order_id: OrderId::new(42),
        order_time: DateTime::from_timestamp_micros(1_696_161_600_123_456).unwrap(),
        side: Side::SellShort,
        order_status: OrderStatus::PartiallyFilled,
        order_price: OrderPrice::new(100.1),
        total_quantity: OrderQuantity::new(200.0),
        cum_executed_quantity: CumExecutedQuantity::new(50.0),
    }
}

fn sample_snapshot() -> Snapshot {
    Snapshot {
        venue_id: "SIM".to_owned(),
        instruments: vec![InstrumentState {
            instrument: listed_instrument("AAPL"),
            last_trade: Some(Trade {
                buyer: Some(venue_sim::domain::BuyerId::new("BUYER")),
                seller: None,
                trade_price: Price::new(100.1),
                traded_quantity: Quantity::new(10.0),
                aggressor_side: Some(AggressorSide::Sell),
                trade_time: DateTime::from_timestamp_micros(1_696_161_601_000_000).unwrap(),
                market_phase: MarketPhase::open(),
            }),
            info: Some(InstrumentInfo {
                low_price: Price::new(99.5),
                high_price: Price::new(100.5),
            }),
            order_book: OrderBookState {
                buy_orders: Vec::new(),
                sell_orders: vec![sample_order()],
            },
        }],
    }
}

#[test]
fn document_layout_matches_the_published_format() {
    let json = serde_json::to_value(sample_snapshot()).unwrap();

    assert_eq!(json["venue_id"], "SIM");
    let instrument_state = &json["instruments"][0];
    assert_eq!(instrument_state["instrument"]["symbol"], "AAPL");
    assert_eq!(instrument_state["info"]["low_price"], 99.5);
    assert_eq!(instrument_state["info"]["high_price"], 100.5);

    let trade = &instrument_state["last_trade"];
    assert_eq!(trade["buyer"], "BUYER");
    assert_eq!(trade["seller"], serde_json::Value::Null);
    assert_eq!(trade["aggressor_side"], "Sell");
    assert_eq!(trade["trade_time"], "2023-10-01 12:00:01.000000");
    assert_eq!(trade["market_phase"]["trading_phase"], "Open");
    assert_eq!(trade["market_phase"]["trading_status"], "Resume");

    let order = &instrument_state["order_book"]["sell_orders"][0];
    assert_eq!(order["side"], "SellShort");
    assert_eq!(order["order_status"], "PartiallyFilled");
    assert_eq!(order["time_in_force"], "GoodTillDate");
    assert_eq!(order["order_time"], "2023-10-01 12:00:00.123456");
    assert_eq!(order["expire_time"], serde_json::Value::Null);
    assert_eq!(order["expire_date"], "2025-01-02");
    assert_eq!(order["order_id"], 42);
    assert_eq!(order["order_price"], 100.1);
    assert_eq!(order["client_session"]["type"], "Fix");
    assert_eq!(
        order["client_session"]["fix_session"]["sender_comp_id"],
        "CLIENT"
    );
    assert_eq!(
        order["order_parties"][0]["identifier"]["party_id"],
        "FIRM-1"
    );
    assert_eq!(order["order_parties"][0]["role"], "ExecutingFirm");
}

#[test]
fn document_round_trips_losslessly() {
    let snapshot = sample_snapshot();
    let text = serde_json::to_string_pretty(&snapshot).unwrap();
    let decoded: Snapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, snapshot);
}

#[test]
fn store_and_load_preserve_document_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let store = venue_sim::SnapshotStore::new(dir.path().join("snapshot.json"));
    let snapshot = sample_snapshot();

    store.store(&snapshot).unwrap();
    let first = std::fs::read(store.path()).unwrap();
    store.store(&snapshot).unwrap();
    let second = std::fs::read(store.path()).unwrap();

    // Deterministic serialization: same state, same bytes.
    assert_eq!(first, second);
    assert_eq!(store.load().unwrap(), snapshot);
}
