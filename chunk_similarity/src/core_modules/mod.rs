pub mod chunk;
pub mod matcher;
pub mod pixel;
pub mod threshold;
pub mod utils;
