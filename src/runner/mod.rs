mod runner;

pub use runner::{run_file, run_prompt, HAD_ERROR, HAD_RUNTIME_ERROR};
