mod input;

pub use input::{Line, LineReader, Source};
