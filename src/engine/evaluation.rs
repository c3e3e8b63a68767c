use crate::chess::attacks::tables::ROOK_RM;
use crate::chess::*;

/// Below this many non-king pieces the endgame pawn and king tables apply.
const ENDGAME_PIECE_THRESHOLD: u32 = 15;

const PASSED_PAWN_BONUS: i32 = 50;
const OPEN_FILE_BONUS: i32 = 50;
const SEMI_OPEN_FILE_BONUS: i32 = 25;
const SHIELD_PAWN_BONUS: i32 = 10;
const ROOK_EYES_KING_BONUS: i32 = 50;

impl Board {
    pub const PIECE_VALUES: [i32; PIECE_TYPES.len()] = [100, 300, 320, 500, 900, 0];

    // Tables are written from white's perspective with the eighth rank
    // first, so a white piece on square `sq` reads `sq ^ 56` and a black
    // piece reads `sq` with the sign flipped. Queens carry no table.
    #[rustfmt::skip]
    const PAWN_TABLE: [i32; BOARD_SIZE] = [
         0,   0,   0,   0,   0,   0,   0,   0,
        50,  50,  50,  50,  50,  50,  50,  50,
        10,  10,  20,  30,  30,  20,  10,  10,
         5,   5,  10,  25,  25,  10,   5,   5,
         0,   0,   0,  20,  20,   0,   0,   0,
         5,  -5, -10,   0,   0, -10,  -5,   5,
         5,  10,  10, -30, -30,  10,  10,   5,
         0,   0,   0,   0,   0,   0,   0,   0,
    ];

    #[rustfmt::skip]
    const PAWN_TABLE_END: [i32; BOARD_SIZE] = [
         0,   0,   0,   0,   0,   0,   0,   0,
        80,  80,  80,  80,  80,  80,  80,  80,
        50,  50,  50,  50,  50,  50,  50,  50,
        30,  30,  30,  30,  30,  30,  30,  30,
        20,  20,  20,  20,  20,  20,  20,  20,
        10,  10,  10,  10,  10,  10,  10,  10,
        10,  10,  10,  10,  10,  10,  10,  10,
         0,   0,   0,   0,   0,   0,   0,   0,
    ];

    #[rustfmt::skip]
    const KNIGHT_TABLE: [i32; BOARD_SIZE] = [
       -50, -40, -30, -30, -30, -30, -40, -50,
       -40, -20,   0,   0,   0,   0, -20, -40,
       -30,   0,  10,  15,  15,  10,   0, -30,
       -30,   5,  15,  20,  20,  15,   5, -30,
       -30,   0,  15,  20,  20,  15,   0, -30,
       -30,   5,  20,  15,  15,  20,   5, -30,
       -40, -20,   0,   0,   0,   0, -20, -40,
       -50, -50, -30, -30, -30, -30, -50, -50,
    ];

    #[rustfmt::skip]
    const BISHOP_TABLE: [i32; BOARD_SIZE] = [
       -20, -10, -10, -10, -10, -10, -10, -20,
       -10,   0,   0,   0,   0,   0,   0, -10,
       -10,   0,   5,  10,  10,   5,   0, -10,
       -10,   5,   5,  10,  10,   5,   5, -10,
       -10,   0,  10,  10,  10,  10,   0, -10,
       -10,  10,  10,  10,  10,  10,  10, -10,
       -10,   5,   0,   0,   0,   0,   5, -10,
       -20, -10, -10, -10, -10, -10, -10, -20,
    ];

    #[rustfmt::skip]
    const ROOK_TABLE: [i32; BOARD_SIZE] = [
         0,   0,   0,   0,   0,   0,   0,   0,
         5,  10,  10,  10,  10,  10,  10,   5,
        -5,   0,   0,   0,   0,   0,   0,  -5,
        -5,   0,   0,   0,   0,   0,   0,  -5,
        -5,   0,   0,   0,   0,   0,   0,  -5,
        -5,   0,   0,   0,   0,   0,   0,  -5,
        -5,   0,   0,   0,   0,   0,   0,  -5,
        -5,   0,   0,  10,  10,   0,   0,  -5,
    ];

    #[rustfmt::skip]
    const KING_TABLE: [i32; BOARD_SIZE] = [
       -30, -40, -40, -50, -50, -40, -40, -30,
       -30, -40, -40, -50, -50, -40, -40, -30,
       -30, -40, -40, -50, -50, -40, -40, -30,
       -30, -40, -40, -50, -50, -40, -40, -30,
       -20, -30, -30, -40, -40, -30, -30, -20,
       -10, -20, -20, -20, -20, -20, -20, -10,
        20,  10,   0,   0,   0,   0,  10,  20,
        40,  50,  10,   0,   0,  10,  50,  40,
    ];

    #[rustfmt::skip]
    const KING_TABLE_END: [i32; BOARD_SIZE] = [
       -20, -10, -10, -10, -10, -10, -10, -20,
        -5,   0,   5,   5,   5,   5,   0,  -5,
       -10,  -5,  20,  30,  30,  20,  -5, -10,
       -15, -10,  35,  45,  45,  35, -10, -15,
       -20, -15,  30,  40,  40,  30, -15, -20,
       -25, -20,  20,  25,  25,  20, -20, -25,
       -30, -25,   0,   0,   0,   0, -25, -30,
       -50, -30, -30, -30, -30, -30, -30, -50,
    ];

    fn material(&self) -> i32 {
        PIECE_TYPES
            .iter()
            .map(|&piece| {
                let white = self.bitboards[Color::White as usize][piece as usize].popcount();
                let black = self.bitboards[Color::Black as usize][piece as usize].popcount();
                (white as i32 - black as i32) * Board::PIECE_VALUES[piece as usize]
            })
            .sum()
    }

    fn table_score(&self, piece: Piece, table: &[i32; BOARD_SIZE]) -> i32 {
        let mut score = 0;
        for square in self.bitboards[Color::White as usize][piece as usize].ones() {
            score += table[square as usize ^ 56];
        }
        for square in self.bitboards[Color::Black as usize][piece as usize].ones() {
            score -= table[square as usize];
        }
        score
    }

    fn piece_square_score(&self, endgame: bool) -> i32 {
        self.table_score(
            Piece::Pawn,
            if endgame {
                &Board::PAWN_TABLE_END
            } else {
                &Board::PAWN_TABLE
            },
        ) + self.table_score(Piece::Knight, &Board::KNIGHT_TABLE)
            + self.table_score(Piece::Bishop, &Board::BISHOP_TABLE)
            + self.table_score(Piece::Rook, &Board::ROOK_TABLE)
            + self.table_score(
                Piece::King,
                if endgame {
                    &Board::KING_TABLE_END
                } else {
                    &Board::KING_TABLE
                },
            )
    }

    /// A pawn counts as passed when no opposing pawn stands on its own or
    /// either adjacent file. The test is per-file only; rank is ignored.
    fn passed_pawn_score(&self) -> i32 {
        let mut score = 0;

        for (color, sign) in [(Color::White, 1), (Color::Black, -1)] {
            let their_pawns =
                self.bitboards[color.toggle() as usize][Piece::Pawn as usize];

            for square in self.bitboards[color as usize][Piece::Pawn as usize].ones() {
                let file = (square % BOARD_WIDTH as Square) as usize;
                let mut block_mask = FILES[file];
                if file > 0 {
                    block_mask |= FILES[file - 1];
                }
                if file < BOARD_WIDTH - 1 {
                    block_mask |= FILES[file + 1];
                }

                if (their_pawns & block_mask).is_empty() {
                    score += sign * PASSED_PAWN_BONUS;
                }
            }
        }

        score
    }

    fn rook_file_score(&self) -> i32 {
        let white_pawns = self.bitboards[Color::White as usize][Piece::Pawn as usize];
        let black_pawns = self.bitboards[Color::Black as usize][Piece::Pawn as usize];
        let all_pawns = white_pawns | black_pawns;

        let mut score = 0;

        for (color, own_pawns, sign) in [
            (Color::White, white_pawns, 1),
            (Color::Black, black_pawns, -1),
        ] {
            for square in self.bitboards[color as usize][Piece::Rook as usize].ones() {
                let file_mask = FILES[(square % BOARD_WIDTH as Square) as usize];

                if (all_pawns & file_mask).is_empty() {
                    score += sign * OPEN_FILE_BONUS;
                } else if (own_pawns & file_mask).is_empty() {
                    score += sign * SEMI_OPEN_FILE_BONUS;
                }
            }
        }

        score
    }

    /// Middlegame reward for pawns still shielding a castled king.
    fn castling_pawn_score(&self) -> i32 {
        let mut score = 0;

        // (king square, shield squares, sign), kingside then queenside.
        const SHIELDS: [(Square, [Square; 3], i32); 4] = [
            (6, [13, 14, 15], 1),    // white king g1, pawns f2 g2 h2
            (2, [8, 9, 10], 1),      // white king c1, pawns a2 b2 c2
            (62, [53, 54, 55], -1),  // black king g8, pawns f7 g7 h7
            (58, [48, 49, 50], -1),  // black king c8, pawns a7 b7 c7
        ];

        for (king_square, shield, sign) in SHIELDS {
            let color = if sign > 0 { Color::White } else { Color::Black };
            if self.king_square(color) != king_square {
                continue;
            }
            let pawns = self.bitboards[color as usize][Piece::Pawn as usize];
            for square in shield {
                if pawns.test(square) {
                    score += sign * SHIELD_PAWN_BONUS;
                }
            }
        }

        score
    }

    /// Rough "rook eyes the king" term: the rook's relevant-blocker mask
    /// containing the enemy king square is enough, occupancy ignored.
    fn rook_king_alignment_score(&self) -> i32 {
        let mut score = 0;

        for (color, sign) in [(Color::White, 1), (Color::Black, -1)] {
            let enemy_king = self.king_square(color.toggle());
            for square in self.bitboards[color as usize][Piece::Rook as usize].ones() {
                if ROOK_RM[square as usize].test(enemy_king) {
                    score += sign * ROOK_EYES_KING_BONUS;
                }
            }
        }

        score
    }

    /// Static score from white's perspective, in centipawns.
    pub fn evaluate(&self) -> i32 {
        let endgame = self.occupied().popcount() - 2 < ENDGAME_PIECE_THRESHOLD;

        let mut score = self.material();
        score += self.piece_square_score(endgame);
        score += self.passed_pawn_score();
        score += self.rook_file_score();
        score += self.rook_king_alignment_score();
        if !endgame {
            score += self.castling_pawn_score();
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_starting_position_is_balanced() {
        let board = Board::new(STARTPOS_FEN).unwrap();
        assert_eq!(board.evaluate(), 0);
    }

    #[test]
    fn mirrored_positions_score_symmetrically() {
        let white_up = Board::new("4k3/8/8/8/8/8/8/QR2K3 w - - 0 1").unwrap();
        let black_up = Board::new("qr2k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(white_up.evaluate(), -black_up.evaluate());
    }

    #[test]
    fn an_extra_queen_dominates_the_score() {
        let board = Board::new("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        assert!(board.evaluate() > 800);
    }

    #[test]
    fn rook_file_bonuses_distinguish_open_and_semi_open() {
        // Rook a1 on an open file, rook h1 behind its own pawn.
        let open = Board::new("4k3/7p/8/8/8/8/7P/R3K2R w - - 0 1").unwrap();
        // Both rooks behind their own pawns.
        let closed = Board::new("4k3/p6p/8/8/8/8/P6P/R3K2R w - - 0 1").unwrap();
        assert!(open.evaluate() > closed.evaluate());
    }

    #[test]
    fn passed_pawn_earns_its_bonus() {
        // The a-pawn faces no enemy pawn on files a..b; the h-pawns block
        // each other.
        let with_passer = Board::new("4k3/7p/8/8/8/8/P6P/4K3 w - - 0 1").unwrap();
        let without = Board::new("4k3/p6p/8/8/8/8/P6P/4K3 w - - 0 1").unwrap();
        assert!(with_passer.evaluate() > without.evaluate());
    }
}
