//! Core of the time calculator bot.
//!
//! The parser and calculator are pure; everything Telegram-specific lives behind
//! [`messaging::port::MessagingPort`] in the adapter crate.

pub mod calculator;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod health;
pub mod logging;
pub mod messaging;
pub mod parser;
pub mod replies;
pub mod routing;

pub use errors::{Error, Result};
