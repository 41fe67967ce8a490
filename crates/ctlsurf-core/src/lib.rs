//! Host-independent core of the control surface layer.
//!
//! Provides value conversion, pageable banks over host collections, parameter
//! providers and the mode state machine that routes surface input.
//!
//! # Features
//!
//! - **Value changer**: normalized/raw conversion and relative encoder decoding
//! - **Banks**: fixed-size windows with scrolling and cursor paging, linked in an arena
//! - **Host mirrors**: parameter and channel state with a host command outbox
//! - **Modes**: one active mode per surface, temporary overlays, extender mirroring
//! - **Delayed actions**: tick-polled deferred work with key-based supersession
//!
//! # Example
//!
//! ```
//! use ctlsurf_core::{Bank, ChannelState};
//!
//! let mut tracks = Bank::new(8);
//! tracks.set_items((0..20).map(|i| ChannelState::new(i, format!("Track {}", i + 1))).collect());
//!
//! for _ in 0..9 {
//!     tracks.select_next_item();
//! }
//! assert_eq!(tracks.cursor_index(), Some(8));
//! assert_eq!(tracks.scroll_position(), 8);
//! ```

// Error types
pub mod error;
pub use error::{Error, Result};

pub mod arena;
pub mod bank;
pub mod mode;
pub mod model;
pub mod parameter;
pub mod schedule;
pub mod subscription;
pub mod value;

pub use arena::{BankArena, BankId};
pub use bank::{Bank, Pageable, UnitSlice};
pub use mode::{
    ButtonEvent, ConnectedManagers, ControlEvent, LedState, Mode, ModeManager, ParameterMode,
};
pub use model::{
    command_channel, BankItem, ChannelState, CommandSender, HostCommand, Parameter, ParameterId,
    ParameterState, COMMAND_QUEUE_CAPACITY,
};
pub use parameter::{ChannelParameter, ChannelProvider, ParameterBankProvider, ParameterProvider};
pub use schedule::DelayedActionQueue;
pub use subscription::{Interest, Observable, ObserverRegistry, SubscriptionId, SubscriptionList};
pub use value::{RelativeEncoding, ValueChanger};
