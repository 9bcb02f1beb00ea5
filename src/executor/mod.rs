mod builtin;
mod child;
mod executor;
mod path_resolver;
mod pipeline;

pub use builtin::{BuiltinCommand, BuiltinContext, BuiltinManager};
pub use executor::{ExecError, ExecOutcome, ExecStatus, Executor};
pub use path_resolver::PathResolver;
pub use pipeline::{ForkExecutor, PipeSet};
