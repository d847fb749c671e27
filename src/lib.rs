//! Bazaar: a Telegram marketplace bot.
//!
//! Sellers post listings, buyers search, save, message, and review. Admins
//! moderate through a panel guarded by an allow-list plus per-actor grants,
//! and every privileged write lands in an append-only audit log.
//!
//! See `DESIGN.md` for the module map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;

pub mod db;

pub mod admin;

pub mod catalog;
pub mod flows;
pub mod validation;

pub mod telegram;
