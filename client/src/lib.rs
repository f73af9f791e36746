//! Chakula Poa API client library.
//!
//! `domain` holds the request pipeline, auth use-cases and identifier card
//! behind driven ports; `outbound` provides the reqwest transport and the
//! file-backed credential store; `config` loads client settings.

pub mod config;
pub mod domain;
pub mod outbound;
