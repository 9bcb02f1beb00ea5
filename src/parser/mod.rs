mod grammar;
mod segment;

pub use grammar::{validate, ParseError};
pub use segment::{
    segment, stage_argv, stage_count, take_background, take_input, take_output, Pipeline, Stage,
};
