//! Market-data aggregation and subscription handling.
//!
//! The aggregator folds a book page into per-price levels (best first) and
//! diffs two aggregated images by price level. Aggregation is
//! deterministic: the same book and configuration always produce the same
//! entries.

use super::MatchingEngine;
use crate::book::OrderBook;
use crate::domain::{
    BusinessRejectReason, InstrumentDescriptor, MarketDataUpdateType, MarketEntryAction,
    MdEntryType, MdRejectReason, MdSubscriptionRequestType, PartyId, Price,
    Quantity, RejectText, RejectedMessageType, Session, Trade,
};
use crate::protocol::replies::{
    BusinessMessageReject, MarketDataEntry, MarketDataReject, MarketDataSnapshot,
    MarketDataUpdate, SecurityStatus,
};
use crate::protocol::requests::{MarketDataRequest, SecurityStatusRequest};
use bitflags::bitflags;
use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

bitflags! {
    /// Content selection of the market-data aggregator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AggregationFlags: u8 {
        /// Append the last trade to snapshots and diff it in updates.
        const INCLUDE_LAST_TRADE = 1 << 0;
        /// Concatenate owning party identifiers into each price level.
        const CONCAT_PARTY_IDS = 1 << 1;
    }
}

/// Static configuration of the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub flags: AggregationFlags,
    /// Default depth for requests that specify none; zero means all levels.
    pub default_depth: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            flags: AggregationFlags::INCLUDE_LAST_TRADE,
            default_depth: 0,
        }
    }
}

/// One aggregated price level.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLevelImage {
    pub price: f64,
    pub quantity: f64,
    pub party_ids: Vec<PartyId>,
}

/// A deterministic aggregated view of the book and trade tape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookImage {
    pub bids: Vec<PriceLevelImage>,
    pub offers: Vec<PriceLevelImage>,
    pub last_trade: Option<Trade>,
}

/// Folds books into aggregated images and computes incremental diffs.
#[derive(Debug, Clone, Copy)]
pub struct MarketDataAggregator {
    config: AggregatorConfig,
}

impl MarketDataAggregator {
    /// Creates an aggregator with the given configuration.
    #[must_use]
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// The configured default depth.
    #[must_use]
    pub fn default_depth(&self) -> u64 {
        self.config.default_depth
    }

    /// Aggregates the book into per-price levels, best first, down to
    /// `depth` levels per side (zero means all levels).
    #[must_use]
    pub fn image(
        &self,
        book: &OrderBook,
        last_trade: Option<&Trade>,
        depth: u64,
        entry_types: &[MdEntryType],
    ) -> BookImage {
        let wants = |entry: MdEntryType| entry_types.is_empty() || entry_types.contains(&entry);

        let bids = if wants(MdEntryType::Bid) {
            self.levels(book.buy_page().orders(), depth)
        } else {
            Vec::new()
        };
        let offers = if wants(MdEntryType::Offer) {
            self.levels(book.sell_page().orders(), depth)
        } else {
            Vec::new()
        };
        let last_trade = if wants(MdEntryType::Trade)
            && self.config.flags.contains(AggregationFlags::INCLUDE_LAST_TRADE)
        {
            last_trade.cloned()
        } else {
            None
        };

        BookImage {
            bids,
            offers,
            last_trade,
        }
    }

    fn levels(&self, orders: &[crate::domain::LimitOrder], depth: u64) -> Vec<PriceLevelImage> {
        let mut levels: Vec<PriceLevelImage> = Vec::new();
        for order in orders {
            let price = order.order_price.value();
            match levels.last_mut() {
                // Orders are price-ordered, so equal prices are adjacent.
                Some(level) if level.price == price => {
                    level.quantity += order.leaves();
                    if self.config.flags.contains(AggregationFlags::CONCAT_PARTY_IDS) {
                        level
                            .party_ids
                            .extend(order.order_parties.iter().map(|party| {
                                party.identifier().party_id().clone()
                            }));
                    }
                }
                _ => {
                    if depth != 0 && levels.len() as u64 == depth {
                        break;
                    }
                    let party_ids = if self.config.flags.contains(AggregationFlags::CONCAT_PARTY_IDS)
                    {
                        order
                            .order_parties
                            .iter()
                            .map(|party| party.identifier().party_id().clone())
                            .collect()
                    } else {
                        Vec::new()
                    };
                    levels.push(PriceLevelImage {
                        price,
                        quantity: order.leaves(),
                        party_ids,
                    });
                }
            }
        }
        levels
    }

    /// Renders an image as full snapshot entries (no incremental actions).
    #[must_use]
    pub fn snapshot_entries(&self, image: &BookImage) -> Vec<MarketDataEntry> {
        let mut entries = Vec::new();
        for level in &image.bids {
            entries.push(level_entry(MdEntryType::Bid, level, None));
        }
        for level in &image.offers {
            entries.push(level_entry(MdEntryType::Offer, level, None));
        }
        if let Some(trade) = &image.last_trade {
            entries.push(trade_entry(trade, None));
        }
        entries
    }

    /// Diffs two images by price level: `New` for levels appearing,
    /// `Change` for quantity changes, `Delete` for levels disappearing, and
    /// a `New` trade entry when the tape advanced.
    #[must_use]
    pub fn diff_entries(&self, prior: &BookImage, current: &BookImage) -> Vec<MarketDataEntry> {
        let mut entries = Vec::new();
        diff_side(MdEntryType::Bid, &prior.bids, &current.bids, &mut entries);
        diff_side(MdEntryType::Offer, &prior.offers, &current.offers, &mut entries);

        if current.last_trade != prior.last_trade
            && let Some(trade) = &current.last_trade
        {
            entries.push(trade_entry(trade, Some(MarketEntryAction::New)));
        }
        entries
    }
}

fn level_entry(
    entry_type: MdEntryType,
    level: &PriceLevelImage,
    action: Option<MarketEntryAction>,
) -> MarketDataEntry {
    MarketDataEntry {
        entry_type,
        action,
        price: Some(Price::new(level.price)),
        quantity: Some(Quantity::new(level.quantity)),
        party_ids: level.party_ids.clone(),
        time: None,
        aggressor_side: None,
        market_phase: None,
    }
}

fn trade_entry(trade: &Trade, action: Option<MarketEntryAction>) -> MarketDataEntry {
    MarketDataEntry {
        entry_type: MdEntryType::Trade,
        action,
        price: Some(trade.trade_price),
        quantity: Some(trade.traded_quantity),
        party_ids: Vec::new(),
        time: Some(trade.trade_time),
        aggressor_side: trade.aggressor_side,
        market_phase: Some(trade.market_phase),
    }
}

fn diff_side(
    entry_type: MdEntryType,
    prior: &[PriceLevelImage],
    current: &[PriceLevelImage],
    entries: &mut Vec<MarketDataEntry>,
) {
    for level in current {
        match prior.iter().find(|known| known.price == level.price) {
            None => entries.push(level_entry(entry_type, level, Some(MarketEntryAction::New))),
            Some(known) if known.quantity != level.quantity || known.party_ids != level.party_ids => {
                entries.push(level_entry(entry_type, level, Some(MarketEntryAction::Change)));
            }
            Some(_) => {}
        }
    }
    for known in prior {
        if !current.iter().any(|level| level.price == known.price) {
            entries.push(MarketDataEntry {
                entry_type,
                action: Some(MarketEntryAction::Delete),
                price: Some(Price::new(known.price)),
                quantity: None,
                party_ids: Vec::new(),
                time: None,
                aggressor_side: None,
                market_phase: None,
            });
        }
    }
}

/// An active market-data subscription with its prior known image.
#[derive(Debug, Clone)]
pub(super) struct Subscription {
    session: Session,
    instrument: InstrumentDescriptor,
    depth: u64,
    entry_types: Vec<MdEntryType>,
    prior: BookImage,
}

impl Subscription {
    pub(super) fn session(&self) -> &Session {
        &self.session
    }
}

impl MatchingEngine {
    /// Processes a market-data request: snapshot, subscribe or unsubscribe.
    pub fn process_market_data(&mut self, request: MarketDataRequest) {
        if !self.phase.accepts_market_data() {
            self.reject_market_data(
                &request,
                MdRejectReason::UnsupportedSubscriptionRequestType,
                "market data is not available while trading is halted",
            );
            return;
        }

        let request_type = match request.request_type {
            Some(request_type) if request_type != MdSubscriptionRequestType::Unknown => {
                request_type
            }
            _ => {
                self.reject_market_data(
                    &request,
                    MdRejectReason::UnsupportedSubscriptionRequestType,
                    "unsupported market data request type",
                );
                return;
            }
        };
        if request.entry_types.contains(&MdEntryType::Unknown) {
            self.reject_market_data(
                &request,
                MdRejectReason::UnsupportedMdEntryType,
                "unsupported market data entry type",
            );
            return;
        }

        let depth = request
            .market_depth
            .map(|depth| depth.value())
            .unwrap_or_else(|| self.aggregator.default_depth());

        match request_type {
            MdSubscriptionRequestType::Snapshot => {
                let image = self.aggregator.image(
                    &self.book,
                    self.last_trade.as_ref(),
                    depth,
                    &request.entry_types,
                );
                let entries = self.aggregator.snapshot_entries(&image);
                trace!(instrument = %self.instrument, entries = entries.len(), "market data snapshot");
                self.emit(MarketDataSnapshot {
                    session: request.session,
                    instrument: request.instrument,
                    md_request_id: request.md_request_id,
                    update_type: MarketDataUpdateType::Snapshot,
                    entries,
                });
            }
            MdSubscriptionRequestType::Subscribe => {
                let Some(md_request_id) = request.md_request_id else {
                    self.reject_market_data(
                        &request,
                        MdRejectReason::UnknownMdRequestId,
                        "market data request id is required for subscriptions",
                    );
                    return;
                };
                if self.subscriptions.contains_key(&md_request_id) {
                    self.reject_market_data(
                        &request,
                        MdRejectReason::DuplicateMdReqId,
                        "duplicate market data request id",
                    );
                    return;
                }

                let image = self.aggregator.image(
                    &self.book,
                    self.last_trade.as_ref(),
                    depth,
                    &request.entry_types,
                );
                let entries = self.aggregator.snapshot_entries(&image);
                self.emit(MarketDataSnapshot {
                    session: request.session.clone(),
                    instrument: request.instrument.clone(),
                    md_request_id: Some(md_request_id),
                    update_type: MarketDataUpdateType::Snapshot,
                    entries,
                });

                debug!(instrument = %self.instrument, %md_request_id, "market data subscription added");
                self.subscriptions.insert(
                    md_request_id,
                    Subscription {
                        session: request.session,
                        instrument: request.instrument,
                        depth,
                        entry_types: request.entry_types,
                        prior: image,
                    },
                );
            }
            MdSubscriptionRequestType::Unsubscribe => {
                let Some(md_request_id) = request.md_request_id else {
                    self.reject_market_data(
                        &request,
                        MdRejectReason::UnknownMdRequestId,
                        "market data request id is required for unsubscription",
                    );
                    return;
                };
                if self.subscriptions.remove(&md_request_id).is_none() {
                    self.reject_market_data(
                        &request,
                        MdRejectReason::UnknownMdRequestId,
                        "subscription not found",
                    );
                } else {
                    debug!(instrument = %self.instrument, %md_request_id, "market data subscription removed");
                }
            }
            MdSubscriptionRequestType::Unknown => {}
        }
    }

    /// Processes a security-status request.
    pub fn process_security_status(&mut self, request: SecurityStatusRequest) {
        let request_type = request
            .request_type
            .unwrap_or(MdSubscriptionRequestType::Snapshot);
        match request_type {
            MdSubscriptionRequestType::Snapshot => {
                self.emit(SecurityStatus {
                    session: request.session,
                    instrument: request.instrument,
                    request_id: request.request_id,
                    market_phase: self.phase,
                });
            }
            MdSubscriptionRequestType::Subscribe => {
                self.status_subscriptions.push(super::StatusSubscription {
                    session: request.session.clone(),
                    request_id: request.request_id.clone(),
                    instrument: request.instrument.clone(),
                });
                self.emit(SecurityStatus {
                    session: request.session,
                    instrument: request.instrument,
                    request_id: request.request_id,
                    market_phase: self.phase,
                });
            }
            MdSubscriptionRequestType::Unsubscribe => {
                self.status_subscriptions.retain(|subscription| {
                    !(subscription.session == request.session
                        && subscription.request_id == request.request_id)
                });
            }
            MdSubscriptionRequestType::Unknown => {
                warn!(instrument = %self.instrument, "unsupported security status request type");
                self.emit(BusinessMessageReject {
                    session: request.session,
                    rejected_message_type: RejectedMessageType::SecurityStatusRequest,
                    business_reject_reason: BusinessRejectReason::Other,
                    reject_text: RejectText::new("unsupported security status request type"),
                });
            }
        }
    }

    /// Publishes one coalesced incremental update per subscription whose
    /// view of the book changed since its last publication.
    pub(super) fn publish_market_data(&mut self, _now: DateTime<Utc>) {
        if self.subscriptions.is_empty() {
            return;
        }

        let mut updates = Vec::new();
        for (&md_request_id, subscription) in &self.subscriptions {
            let current = self.aggregator.image(
                &self.book,
                self.last_trade.as_ref(),
                subscription.depth,
                &subscription.entry_types,
            );
            let entries = self.aggregator.diff_entries(&subscription.prior, &current);
            if !entries.is_empty() {
                updates.push((md_request_id, current, entries));
            }
        }

        for (md_request_id, current, entries) in updates {
            let reply = match self.subscriptions.get_mut(&md_request_id) {
                Some(subscription) => {
                    subscription.prior = current;
                    Some(MarketDataUpdate {
                        session: subscription.session.clone(),
                        instrument: subscription.instrument.clone(),
                        md_request_id: Some(md_request_id),
                        update_type: MarketDataUpdateType::Incremental,
                        entries,
                    })
                }
                None => None,
            };
            if let Some(reply) = reply {
                self.emit(reply);
            }
        }
    }

    fn reject_market_data(
        &self,
        request: &MarketDataRequest,
        reason: MdRejectReason,
        text: &str,
    ) {
        warn!(instrument = %self.instrument, %reason, %text, "market data request rejected");
        self.emit(MarketDataReject {
            session: request.session.clone(),
            md_request_id: request.md_request_id,
            reason,
            reject_text: RejectText::new(text),
        });
    }
}
