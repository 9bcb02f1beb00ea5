pub mod config;
pub mod environment;
pub mod error;
pub mod executor;
pub mod io;
pub mod jobs;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod prompt;
pub mod repl;
pub mod signal;
