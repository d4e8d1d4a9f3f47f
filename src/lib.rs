//! LawHelp — legal-assistance intake service.

pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod intake;
pub mod llm;
pub mod session;
