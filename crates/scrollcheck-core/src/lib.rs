#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

//! Selection engine for scrollcheck.
//!
//! Everything in this crate is a pure function over data that has already been
//! fetched. Talking to the chat platform happens behind the [`client::ChatClient`]
//! and [`client::ReportSink`] traits.

pub mod ack;
pub mod client;
pub mod context;
pub mod errors;
pub mod filter;
pub mod marker;
pub mod model;
pub mod report;

pub use ack::AckPolicy;
pub use client::{ChatClient, ReportSink};
pub use context::{RunTrigger, ScanContext, Slot};
pub use errors::{ScrollError, ScrollResult};
pub use filter::ChannelFilter;
pub use marker::{MarkerMatcher, MarkerSpec, PhraseSpec};
pub use model::{
    Channel, ChannelKind, EmojiIdentity, MatchResult, Message, Reaction, Reactors, TimeWindow,
};
pub use report::{LinkButton, Report, ReportFormatter, ReportIntro};
