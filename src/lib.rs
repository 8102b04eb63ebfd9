//! Twin Onboard: guided digital twin interview with persisted drafts.

pub mod cli;
pub mod config;
pub mod drafts;
pub mod error;
pub mod onboarding;
pub mod store;
