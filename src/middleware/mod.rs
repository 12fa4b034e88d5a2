//! Middleware channels.
//!
//! Process-wide typed channels decouple request producers (FIX acceptor,
//! HTTP admin, generator) from the currently bound receiver. Binding is
//! explicit and owned by the orchestration thread; sending on an unbound
//! channel reports [`ChannelError::ChannelUnbound`] instead of panicking.

mod channels;
mod routing;

pub use channels::{
    GeneratorAdminReceiver, TradingAdminRequestReceiver, TradingReplyReceiver,
    TradingRequestReceiver, TradingSessionEventListener,
};
pub use routing::{
    bind_generator_admin_channel, bind_trading_admin_channel, bind_trading_reply_channel,
    bind_trading_request_channel, bind_trading_session_event_channel, emit_session_event,
    release_generator_admin_channel, release_trading_admin_channel, release_trading_reply_channel,
    release_trading_request_channel, release_trading_session_event_channel,
    send_generation_start_request, send_generation_status_request, send_generation_stop_request,
    send_halt_phase_request, send_instrument_state_request, send_recover_market_state_request,
    send_resume_phase_request, send_store_market_state_request, send_trading_reply,
    send_trading_request,
};

use thiserror::Error;

/// Failure to deliver a message through a middleware channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// No receiver is currently bound to the channel.
    #[error("channel has no bound receiver")]
    ChannelUnbound,
    /// A synchronous request's deadline expired before the reply was
    /// produced. The operation still completes on the runtime thread.
    #[error("synchronous request timed out")]
    Timeout,
}
