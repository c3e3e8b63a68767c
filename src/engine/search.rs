use crate::{chess::*, engine::transposition::TranspositionTable, send};
use std::time::Instant;
use tinyvec::ArrayVec;

/// Mate for the maximiser / minimiser: the extremes of the score type.
/// The max/min formulation never negates a score, so the asymmetric
/// extremes are safe.
pub const SCORE_INF: i32 = i32::MAX;
pub const SCORE_NEG_INF: i32 = i32::MIN;

/// Ply ceiling; killer moves are indexed by remaining depth below it.
pub const MAX_DEPTH: usize = 63;

/// Moves later than this in the list, at this depth or deeper, are first
/// searched reduced. A tuning knob, not a correctness property.
const LMR_MIN_DEPTH: usize = 3;
const LMR_MIN_INDEX: usize = 5;

/// Contempt for a repetition draw, signed so the side that is ahead avoids
/// repeating and the side that is behind steers into it.
const REPETITION_PENALTY: i32 = 30;

const PREVIOUS_BEST_CAPACITY: usize = 7;

#[derive(Clone, Copy, Debug)]
pub struct SearchReport {
    pub best_move: Move,
    pub score: i32,
    pub depth: usize,
    pub nodes: u64,
}

/// One search instance: owns the transposition table and the move-ordering
/// state, and borrows the board mutably for the whole search.
pub struct Searcher {
    tt: TranspositionTable,
    killers: [Option<Move>; MAX_DEPTH + 1],
    previous_best: ArrayVec<[Move; PREVIOUS_BEST_CAPACITY]>,
    nodes: u64,
}

impl Searcher {
    pub fn new() -> Searcher {
        Searcher {
            tt: TranspositionTable::new(),
            killers: [None; MAX_DEPTH + 1],
            previous_best: ArrayVec::new(),
            nodes: 0,
        }
    }

    /// Drops everything learned so far; used on `ucinewgame`.
    pub fn reset(&mut self) {
        self.tt = TranspositionTable::new();
        self.killers = [None; MAX_DEPTH + 1];
        self.previous_best.clear();
        self.nodes = 0;
    }

    /// Iterative deepening to `max_depth`. Each iteration reuses the best
    /// moves of the previous one through the ring and the killer table.
    /// Stops early once a forced mate is scored or the position is already
    /// a threefold repetition.
    pub fn find_best_move(&mut self, board: &mut Board, max_depth: usize) -> SearchReport {
        let max_depth = max_depth.clamp(1, MAX_DEPTH);
        let maximising = board.side_to_move == Color::White;
        let start = Instant::now();

        let mut report = SearchReport {
            best_move: Move::NULL,
            score: 0,
            depth: 0,
            nodes: 0,
        };

        for depth in 1..=max_depth {
            self.nodes = 0;
            let (score, best_move) =
                self.search(board, depth, maximising, SCORE_NEG_INF, SCORE_INF);

            report = SearchReport {
                best_move,
                score,
                depth,
                nodes: self.nodes,
            };
            self.print_info(&report, start);

            if score == SCORE_INF || score == SCORE_NEG_INF || board.is_threefold_repetition() {
                break;
            }
        }

        report
    }

    fn print_info(&self, report: &SearchReport, start: Instant) {
        let elapsed_ms = start.elapsed().as_millis().max(1);
        let score_str = match report.score {
            SCORE_INF => "mate 1".to_string(),
            SCORE_NEG_INF => "mate -1".to_string(),
            cp => format!("cp {cp}"),
        };

        send!(
            "info depth {} score {} nodes {} nps {} time {} pv {}",
            report.depth,
            score_str,
            report.nodes,
            report.nodes as u128 * 1000 / elapsed_ms,
            elapsed_ms,
            if report.best_move == Move::NULL {
                "0000".to_string()
            } else {
                report.best_move.to_uci()
            }
        );
    }

    /// Pushes a fresh interior best move to the front of the ring, keeping
    /// the last seven distinct ones.
    fn remember_best(&mut self, mov: Move) {
        if mov == Move::NULL || self.previous_best.contains(&mov) {
            return;
        }
        if self.previous_best.len() == PREVIOUS_BEST_CAPACITY {
            self.previous_best.pop();
        }
        self.previous_best.insert(0, mov);
    }

    /// Ring entries found in the list are swapped to the front, then the
    /// killer for this depth takes the very front.
    fn reorder(&self, moves: &mut MoveVec, depth: usize) {
        let ring = self.previous_best;
        for previous in ring {
            if let Some(found) = moves.iter().position(|&m| m == previous) {
                moves.swap(0, found);
            }
        }

        if let Some(killer) = self.killers[depth]
            && let Some(found) = moves.iter().position(|&m| m == killer)
        {
            moves.swap(0, found);
        }
    }

    /// Max/min alpha-beta. Returns the best score reachable and the move
    /// achieving it (`Move::NULL` at leaves and terminal nodes).
    fn search(
        &mut self,
        board: &mut Board,
        depth: usize,
        maximising: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> (i32, Move) {
        if depth == 0 {
            return (board.evaluate(), Move::NULL);
        }

        if board.is_threefold_repetition() {
            // Repeating is fine for whoever stands worse.
            let score = if maximising {
                if alpha >= 0 { -REPETITION_PENALTY } else { 0 }
            } else if beta <= 0 {
                REPETITION_PENALTY
            } else {
                0
            };
            return (score, Move::NULL);
        }

        self.nodes += 1;

        if let Some(entry) = self.tt.probe(board.zobrist, depth, alpha, beta) {
            return (entry.value, entry.best_move);
        }

        let mut list = generate_moves(board);

        if list.is_empty() {
            let score = if is_king_attacked(board, board.side_to_move) {
                if maximising { SCORE_NEG_INF } else { SCORE_INF }
            } else {
                0 // stalemate
            };
            return (score, Move::NULL);
        }

        self.reorder(&mut list.moves, depth);

        let mut best_score = if maximising {
            SCORE_NEG_INF
        } else {
            SCORE_INF
        };
        let mut best_move = list.moves[0];

        for (index, &mov) in list.moves.iter().enumerate() {
            board.make_move(mov);

            let score = if depth >= LMR_MIN_DEPTH && index >= LMR_MIN_INDEX {
                // Late-move reduction: try the move shallower first and
                // only pay full depth when it lands inside the window.
                let (reduced, _) = self.search(board, depth - 2, !maximising, alpha, beta);
                if alpha < reduced && reduced < beta {
                    self.search(board, depth - 1, !maximising, alpha, beta).0
                } else {
                    reduced
                }
            } else {
                self.search(board, depth - 1, !maximising, alpha, beta).0
            };

            board.unmake_move();

            if maximising {
                if score > best_score {
                    best_score = score;
                    best_move = mov;
                }
                alpha = alpha.max(best_score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = mov;
                }
                beta = beta.min(best_score);
            }

            if beta <= alpha {
                break;
            }
        }

        self.remember_best(best_move);
        self.killers[depth] = Some(best_move);
        self.tt
            .store(board.zobrist, depth, best_score, alpha, beta, best_move);

        (best_score, best_move)
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Searcher::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_one_grabs_a_hanging_queen() {
        let mut board = Board::new("4k3/8/8/4q3/4R3/8/8/4K3 w - - 0 1").unwrap();
        let mut searcher = Searcher::new();
        let report = searcher.find_best_move(&mut board, 1);
        assert_eq!(report.best_move.to_uci(), "e4e5");
        assert!(report.score > 400);
    }

    #[test]
    fn the_search_leaves_the_board_untouched() {
        let mut board =
            Board::new("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let fen_before = board.to_fen();
        let hash_before = board.zobrist;

        Searcher::new().find_best_move(&mut board, 3);

        assert_eq!(board.to_fen(), fen_before);
        assert_eq!(board.zobrist, hash_before);
        assert_eq!(board.ply_count(), 0);
        assert!(!board.is_threefold_repetition());
    }
}
