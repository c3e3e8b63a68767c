pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod make_move;
pub mod moves;
mod zobrist;

pub use attacks::movegen::*;
pub use bitboard::*;
pub use board::*;
pub use make_move::*;
pub use moves::*;
