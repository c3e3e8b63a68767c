use crate::engine::error::EngineError;
use crate::{chess::*, engine::search::*};
use std::str::SplitWhitespace;

#[macro_export]
macro_rules! send {
    ($($arg:tt)*) => {{
        use std::io::{self, Write};
        println!($($arg)*);
        io::stdout().flush().unwrap();
    }};
}

const DEFAULT_DEPTH: usize = 3;

/// Line-oriented front-end: protocol replies on stdout, diagnostics on the
/// error stream. The search runs synchronously inside `go`, so `stop` has
/// nothing to interrupt and is ignored.
pub struct Uci {
    board: Board,
    searcher: Searcher,
    depth: usize,
}

pub fn perft(board: &mut Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1u64;
    }

    let mut nodes = 0u64;

    for &mov in generate_moves(board).moves.iter() {
        board.make_move(mov);
        debug_assert_eq!(board.zobrist, board.calculate_zobrist());
        nodes += perft(board, depth - 1);
        board.unmake_move();
    }

    nodes
}

fn divide(board: &mut Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1u64;
    }

    let mut nodes = 0u64;

    for &mov in generate_moves(board).moves.iter() {
        board.make_move(mov);
        let subtree_nodes = perft(board, depth - 1);
        board.unmake_move();

        nodes += subtree_nodes;
        send!("{}: {}", mov.to_uci(), subtree_nodes);
    }

    nodes
}

impl Uci {
    pub fn new() -> Uci {
        Uci {
            board: Board::new(STARTPOS_FEN).unwrap(),
            searcher: Searcher::new(),
            depth: DEFAULT_DEPTH,
        }
    }

    /// Returns true on `quit`.
    fn execute_command(&mut self, line: &str) -> bool {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("uci") => {
                send!("id name Basalt");
                send!("id author the Basalt developers");
                send!("option name depth type spin default {DEFAULT_DEPTH} min 1 max {MAX_DEPTH}");
                send!("uciok");
            }
            Some("isready") => send!("readyok"),
            Some("setoption") => self.handle_setoption(&mut tokens, line),
            Some("ucinewgame") => {
                self.board = Board::new(STARTPOS_FEN).unwrap();
                self.searcher.reset();
            }
            Some("position") => {
                if let Err(error) = self.handle_position(&mut tokens) {
                    tracing::error!("{error}");
                }
            }
            Some("go") => self.handle_go(&mut tokens),
            Some("stop") => {} // no background search to stop
            Some("quit") => return true,
            None => {}
            Some(unknown) => tracing::warn!("unknown command: {unknown}"),
        }

        false
    }

    /// The one tunable is the search depth; the last integer token wins,
    /// so both `setoption depth 5` and the conventional
    /// `setoption name depth value 5` work.
    fn handle_setoption(&mut self, tokens: &mut SplitWhitespace, line: &str) {
        match tokens.filter_map(|t| t.parse::<usize>().ok()).next_back() {
            Some(depth @ 1..=MAX_DEPTH) => self.depth = depth,
            _ => tracing::warn!("invalid setoption command: {line}"),
        }
    }

    fn handle_position(&mut self, tokens: &mut SplitWhitespace) -> Result<(), EngineError> {
        let fen: String = match tokens.clone().next() {
            Some("startpos") => {
                tokens.next();
                STARTPOS_FEN.to_string()
            }
            Some("fen") => {
                tokens.next();
                tokens
                    .by_ref()
                    .take_while(|&t| t != "moves")
                    .collect::<Vec<&str>>()
                    .join(" ")
            }
            // The bare form of the protocol: `position <FEN>`.
            Some(_) => tokens
                .by_ref()
                .take_while(|&t| t != "moves")
                .collect::<Vec<&str>>()
                .join(" "),
            None => STARTPOS_FEN.to_string(),
        };

        // Parse into a fresh board first so a bad FEN leaves the current
        // position unchanged.
        self.board = Board::new(&fen).map_err(EngineError::MalformedFen)?;

        // After `startpos` the move list marker may still be pending.
        let mut tokens = tokens.by_ref().skip_while(|&t| t == "moves");
        for move_text in &mut tokens {
            match self.parse_and_make(move_text) {
                Ok(()) => {}
                Err(error) => tracing::warn!("{error}"),
            }
        }

        Ok(())
    }

    fn parse_and_make(&mut self, move_text: &str) -> Result<(), EngineError> {
        let (from, to) =
            Move::parse_squares(move_text).map_err(|reason| EngineError::MalformedMove {
                text: move_text.to_string(),
                reason,
            })?;

        let list = generate_moves(&self.board);
        let Some(&mov) = list
            .moves
            .iter()
            .find(|m| m.get_from() == from && m.get_to() == to)
        else {
            return Err(EngineError::IllegalMove(move_text.to_string()));
        };

        self.board.make_move(mov);
        Ok(())
    }

    fn handle_go(&mut self, tokens: &mut SplitWhitespace) {
        let mut depth = self.depth;

        while let Some(key) = tokens.next() {
            match key {
                "depth" | "perft" => {
                    let Some(value) = tokens.next().and_then(|t| t.parse::<usize>().ok()) else {
                        tracing::warn!("missing value after go {key}");
                        continue;
                    };

                    match key {
                        "depth" => depth = value,
                        "perft" => {
                            send!("Nodes searched: {}", divide(&mut self.board, value));
                            return; // perft never emits a bestmove
                        }
                        _ => unreachable!(),
                    }
                }
                // Clock and pondering parameters are outside the contract.
                _ => {}
            }
        }

        let report = self.searcher.find_best_move(&mut self.board, depth);

        if report.best_move == Move::NULL {
            send!("bestmove 0000");
        } else {
            send!("bestmove {}", report.best_move.to_uci());
        }
    }

    pub fn uci_loop(&mut self) {
        let stdin = std::io::stdin();
        let mut input = String::new();

        loop {
            input.clear();
            match stdin.read_line(&mut input) {
                Ok(0) | Err(_) => break, // closed input ends the session
                Ok(_) => {}
            }
            if self.execute_command(&input) {
                break;
            }
        }
    }
}

impl Default for Uci {
    fn default() -> Self {
        Uci::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_with_moves_reaches_the_expected_state() {
        let mut uci = Uci::new();
        uci.execute_command("position startpos moves e2e4 e7e5 g1f3");
        assert_eq!(
            uci.board.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 0 1"
        );
    }

    #[test]
    fn a_bad_fen_leaves_the_position_unchanged() {
        let mut uci = Uci::new();
        uci.execute_command("position startpos moves e2e4");
        let before = uci.board.to_fen();

        uci.execute_command("position not/a/fen w - - 0 1");
        assert_eq!(uci.board.to_fen(), before);
    }

    #[test]
    fn illegal_moves_are_skipped() {
        let mut uci = Uci::new();
        uci.execute_command("position startpos moves e2e5 e2e4");
        // e2e5 is illegal and ignored; e2e4 applies.
        assert!(uci.board.to_fen().contains("4P3"));
    }

    #[test]
    fn setoption_accepts_both_spellings() {
        let mut uci = Uci::new();
        uci.execute_command("setoption depth 5");
        assert_eq!(uci.depth, 5);
        uci.execute_command("setoption name depth value 7");
        assert_eq!(uci.depth, 7);
        uci.execute_command("setoption depth zero");
        assert_eq!(uci.depth, 7);
    }

    #[test]
    fn bare_fen_positions_load() {
        let mut uci = Uci::new();
        uci.execute_command("position 8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        assert_eq!(uci.board.to_fen(), "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    }
}
