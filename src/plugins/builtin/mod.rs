//! Plugin handlers compiled into the bot
//!
//! Each module exposes its manifest `CLASS` and a `construct` function registered
//! in [`HandlerTable::with_builtins`](super::HandlerTable::with_builtins).

pub mod dice;
