//! # Reviewbot Core Library
//!
//! Polls the Practicum homework statuses API and relays status changes to a
//! Telegram chat. Components, leaf first: status catalog ([`models`]), payload
//! validation and parsing ([`homework`]), the API client ([`client`]), chat
//! delivery ([`providers`]) and the poll loop ([`services::poller`]).

pub mod client;
pub mod homework;
pub mod models;
pub mod providers;
pub mod services;
