//! Score-card domain: data model, wire codec, endpoint client, and the
//! draft/sync coordinator

pub mod client;
pub mod codec;
pub mod model;
pub mod sync;

pub use client::{DeliveryResponse, EndpointClient, HttpEndpointClient};
pub use model::{ScoreCardRecord, ScoreParameter, ScoreSection, canonical_sections};
pub use sync::{DRAFT_KEY, Submission, SyncCoordinator};
