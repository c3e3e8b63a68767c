use crate::chess::{zobrist::*, *};

/// Everything needed to reverse one move. The move itself encodes whether it
/// was an en-passant capture (victim square derivable from `side_to_move`)
/// or a promotion (source kind is always a pawn).
#[derive(Clone, Copy)]
pub struct Undo {
    mov: Move,
    captured: Piece,
    en_passant_square: Option<Square>,
    castling_rights: u8, // 4 bits, KQkq
    side_to_move: Color,
    zobrist: u64,
}

impl Board {
    #[inline(always)]
    fn update_rights_on_rook_change(&mut self, square: Square, color: Color) {
        self.castling_rights &= !(match (square, color) {
            (0, Color::White) => Castling::WQ,  // a1
            (7, Color::White) => Castling::WK,  // h1
            (56, Color::Black) => Castling::BQ, // a8
            (63, Color::Black) => Castling::BK, // h8
            _ => 0,
        });
    }

    /// Square of the pawn captured by an en passant move landing on `to`.
    /// `color` is the capturing side.
    #[inline(always)]
    pub(crate) fn en_passant_victim(to: Square, color: Color) -> Square {
        match color {
            Color::White => to - BOARD_WIDTH as Square,
            Color::Black => to + BOARD_WIDTH as Square,
        }
    }

    /// Folds the non-piece state into the hash. Piece placement is already
    /// covered because `toggle_piece` updates the hash per toggle.
    #[inline(always)]
    fn update_zobrist(&mut self, old_en_passant: Option<Square>, old_rights: u8) {
        self.zobrist ^= *ZOBRIST_SIDE;

        if old_en_passant != self.en_passant_square {
            self.zobrist ^= old_en_passant.map_or(0u64, |en_passant: Square| {
                ZOBRIST_EN_PASSANT[(en_passant % BOARD_WIDTH as Square) as usize]
            });
            self.zobrist ^= self.en_passant_square.map_or(0u64, |en_passant: Square| {
                ZOBRIST_EN_PASSANT[(en_passant % BOARD_WIDTH as Square) as usize]
            });
        }

        let changed = old_rights ^ self.castling_rights;
        for right in 0..4 {
            if changed & (1 << right) != 0 {
                self.zobrist ^= ZOBRIST_CASTLING[right];
            }
        }
    }

    /// Makes a move on the board, updating all internal state, and pushes
    /// the matching undo record onto the history stack.
    ///
    /// # Preconditions
    /// - `mov` must be a legal move in the current position
    pub fn make_move(&mut self, mov: Move) {
        let from: Square = mov.get_from();
        let to: Square = mov.get_to();
        let move_type: MoveType = mov.get_move_type();
        // `captured_color` is white when the square is empty
        let (captured_piece, captured_color): (Piece, Color) = self.pieces[to as usize];
        let (piece_type, _): (Piece, Color) = self.pieces[from as usize];
        let final_type: Piece = if mov.is_promotion() {
            Piece::Queen
        } else {
            piece_type
        };
        let color: Color = self.side_to_move;
        let enemy: Color = color.toggle();

        assert!(
            self.history.len() < MAX_HISTORY,
            "move history overflow at {} plies",
            self.history.len()
        );

        // The position being left counts toward repetition.
        *self.repetitions.entry(self.zobrist).or_insert(0) += 1;

        let undo = Undo {
            mov,
            captured: captured_piece,
            en_passant_square: self.en_passant_square,
            castling_rights: self.castling_rights,
            side_to_move: color,
            zobrist: self.zobrist,
        };

        // Clear piece from original square
        self.toggle_piece(from, piece_type, color);

        // Handle special move types
        match move_type {
            MoveType::Capture => self.toggle_piece(to, captured_piece, captured_color),
            MoveType::EnPassantCapture => {
                self.toggle_piece(Board::en_passant_victim(to, color), Piece::Pawn, enemy);
            }
            MoveType::KingSideCastle => {
                let (rook_from, rook_to) = match color {
                    Color::White => (7, 5),   // h1 -> f1
                    Color::Black => (63, 61), // h8 -> f8
                };
                self.toggle_piece(rook_from, Piece::Rook, color);
                self.toggle_piece(rook_to, Piece::Rook, color);
            }
            MoveType::QueenSideCastle => {
                let (rook_from, rook_to) = match color {
                    Color::White => (0, 3),   // a1 -> d1
                    Color::Black => (56, 59), // a8 -> d8
                };
                self.toggle_piece(rook_from, Piece::Rook, color);
                self.toggle_piece(rook_to, Piece::Rook, color);
            }
            _ => {}
        }

        // Land the moved piece (a promoting pawn lands as a queen)
        self.toggle_piece(to, final_type, color);

        let old_en_passant = self.en_passant_square;
        self.en_passant_square = if move_type == MoveType::DoublePawnPush {
            Some(Board::en_passant_victim(to, color))
        } else {
            None
        };

        let old_rights = self.castling_rights;
        if piece_type == Piece::King {
            self.castling_rights &= !(match color {
                Color::White => Castling::WK | Castling::WQ,
                Color::Black => Castling::BK | Castling::BQ,
            });
        } else if piece_type == Piece::Rook {
            self.update_rights_on_rook_change(from, color);
        }
        if captured_piece == Piece::Rook {
            self.update_rights_on_rook_change(to, enemy);
        }

        self.side_to_move = enemy;

        self.update_zobrist(old_en_passant, old_rights);

        self.history.push(undo);
    }

    /// Reverses the most recent `make_move`, restoring the previous state
    /// bit-for-bit, including the hash and the repetition counter.
    pub fn unmake_move(&mut self) {
        let undo = self
            .history
            .pop()
            .expect("unmake_move without a matching make_move");

        self.en_passant_square = undo.en_passant_square;
        self.castling_rights = undo.castling_rights;
        self.side_to_move = undo.side_to_move;

        let mov: Move = undo.mov;
        let from: Square = mov.get_from();
        let to: Square = mov.get_to();
        let move_type: MoveType = mov.get_move_type();
        let (final_type, _): (Piece, Color) = self.pieces[to as usize];
        let initial_type: Piece = if mov.is_promotion() {
            Piece::Pawn
        } else {
            final_type
        };
        let color = undo.side_to_move;

        // Clear the moved piece
        self.toggle_piece(to, final_type, color);

        // Handle special move types
        match move_type {
            MoveType::Capture => self.toggle_piece(to, undo.captured, color.toggle()),
            MoveType::EnPassantCapture => {
                self.toggle_piece(Board::en_passant_victim(to, color), Piece::Pawn, color.toggle());
            }
            MoveType::KingSideCastle => {
                let (rook_from, rook_to) = match color {
                    Color::White => (7, 5),   // h1 -> f1
                    Color::Black => (63, 61), // h8 -> f8
                };
                self.toggle_piece(rook_from, Piece::Rook, color);
                self.toggle_piece(rook_to, Piece::Rook, color);
            }
            MoveType::QueenSideCastle => {
                let (rook_from, rook_to) = match color {
                    Color::White => (0, 3),   // a1 -> d1
                    Color::Black => (56, 59), // a8 -> d8
                };
                self.toggle_piece(rook_from, Piece::Rook, color);
                self.toggle_piece(rook_to, Piece::Rook, color);
            }
            _ => {}
        }

        // Set the piece back on its original square
        self.toggle_piece(from, initial_type, color);

        self.zobrist = undo.zobrist;

        if let Some(count) = self.repetitions.get_mut(&undo.zobrist) {
            *count -= 1;
            if *count == 0 {
                self.repetitions.remove(&undo.zobrist);
            }
        }
    }

    /// True when the current position has already occurred at least twice
    /// before on the played line.
    #[inline(always)]
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetitions.get(&self.zobrist).copied().unwrap_or(0) >= 2
    }

    /// Number of plies currently recorded on the history stack.
    #[inline(always)]
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }
}
