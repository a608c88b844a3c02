//! Client library for the Ingl validator program on Solana.
//!
//! Builds Ingl instructions with their account tables, signs them with a
//! keypair file or a Ledger device and submits them until finalized.

pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
