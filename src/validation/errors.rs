//! Validation error taxonomies.

use std::fmt;

/// Order validation failure, surfaced verbatim in rejection replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderValidationError {
    SideMissing,
    SideUnknown,
    SideInvalid,
    OrderTypeMissing,
    OrderTypeUnknown,
    OrderStatusUnknown,
    OrderQuantityMissing,
    OrderQuantityMinViolated,
    OrderQuantityMaxViolated,
    OrderQuantityTickViolated,
    TotalQuantityMinViolated,
    TotalQuantityMaxViolated,
    TotalQuantityTickViolated,
    CumExecutedQuantityNonNegativityViolated,
    CumExecutedQuantityTickViolated,
    CumExecutedQuantityIsLessThanTotalQuantityViolated,
    OrderPriceMissing,
    OrderPriceNotAllowed,
    OrderPriceTickViolated,
    TimeInForceInvalid,
    OrderAlreadyExpired,
    BothExpireDateTimeSpecified,
    ExpireDateTimeMissing,
}

impl OrderValidationError {
    /// Human-readable description used in reject texts.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::SideMissing => "side missing",
            Self::SideUnknown => "unsupported side value",
            Self::SideInvalid => "invalid side value",
            Self::OrderTypeMissing => "order type missing",
            Self::OrderTypeUnknown => "unsupported order type value",
            Self::OrderStatusUnknown => "unsupported order status value",
            Self::OrderQuantityMissing => "order quantity missing",
            Self::OrderQuantityMinViolated => "minimal order quantity constraint violated",
            Self::OrderQuantityMaxViolated => "maximal order quantity constraint violated",
            Self::OrderQuantityTickViolated => "order quantity multiple constraint violated",
            Self::TotalQuantityMinViolated => "total quantity minimal constraint violated",
            Self::TotalQuantityMaxViolated => "total quantity maximal constraint violated",
            Self::TotalQuantityTickViolated => "total quantity multiple constraint violated",
            Self::CumExecutedQuantityNonNegativityViolated => {
                "cumulative executed quantity is less than zero"
            }
            Self::CumExecutedQuantityTickViolated => {
                "cumulative executed quantity multiple constraint violated"
            }
            Self::CumExecutedQuantityIsLessThanTotalQuantityViolated => {
                "cumulative executed quantity is not less than total quantity"
            }
            Self::OrderPriceMissing => "order price missing",
            Self::OrderPriceNotAllowed => "order price is not allowed",
            Self::OrderPriceTickViolated => "order price tick constraint violated",
            Self::TimeInForceInvalid => "time in force value is invalid",
            Self::OrderAlreadyExpired => "order already expired",
            Self::BothExpireDateTimeSpecified => "both expire date and expire time specified",
            Self::ExpireDateTimeMissing => "neither expire date nor expire time specified",
        }
    }
}

impl fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Trade and instrument-info validation failure, checked on recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStateValidationError {
    LowPriceTickViolated,
    HighPriceTickViolated,
    LowPriceIsLessThanOrEqualToHighPriceViolated,
    TradePriceTickViolated,
    TradedQuantityTickViolated,
    TradedQuantityMinViolated,
    TradedQuantityMaxViolated,
}

impl MarketStateValidationError {
    /// Human-readable description used in recovery error reports.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::LowPriceTickViolated => "low price tick constraint violated",
            Self::HighPriceTickViolated => "high price tick constraint violated",
            Self::LowPriceIsLessThanOrEqualToHighPriceViolated => {
                "low price is less than or equal to high price constraint violated"
            }
            Self::TradePriceTickViolated => "trade price tick constraint violated",
            Self::TradedQuantityTickViolated => "traded quantity multiple constraint violated",
            Self::TradedQuantityMinViolated => "minimal traded quantity constraint violated",
            Self::TradedQuantityMaxViolated => "maximal traded quantity constraint violated",
        }
    }
}

impl fmt::Display for MarketStateValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}
