pub mod board;
pub mod calculator;

pub use board::{Board, Tick};
