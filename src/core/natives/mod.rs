mod extract;

pub use extract::{extract_native, extract_natives};
