pub mod auth;
pub mod commands;
pub mod config;
pub mod errors;
pub mod identity;
pub mod itinerary;
pub mod models;
pub mod reveal;
pub mod store;
pub mod utils;
pub mod validation;

/// ASCII art logo for jaunt CLI
pub const LOGO: &str = "\
   ╷
   │ ┌─┐┬ ┬┌─┐─┬─
   │ ├─┤│ ││ │ │
  └┘ ┴ ┴└─┘┴ ┴ ┴";
