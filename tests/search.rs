//! End-to-end search scenarios: mates found, stalemates avoided,
//! repetitions detected, and the special moves handled through the full
//! make/search/unmake cycle.

use basalt::chess::*;
use basalt::engine::search::{SCORE_INF, Searcher};

fn best_move(fen: &str, depth: usize) -> (Board, Move, i32) {
    let mut board = Board::new(fen).unwrap();
    let report = Searcher::new().find_best_move(&mut board, depth);
    (board, report.best_move, report.score)
}

fn make_uci(board: &mut Board, text: &str) {
    let (from, to) = Move::parse_squares(text).unwrap();
    let mov = *generate_moves(board)
        .moves
        .iter()
        .find(|m| m.get_from() == from && m.get_to() == to)
        .unwrap_or_else(|| panic!("{text} is not legal here"));
    board.make_move(mov);
}

#[test]
fn finds_the_back_rank_mate_in_one() {
    let (_, mov, score) = best_move("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1", 2);
    assert_eq!(mov.to_uci(), "a1a8");
    assert_eq!(score, SCORE_INF);
}

#[test]
fn mates_with_the_queen_instead_of_stalemating() {
    let (mut board, mov, score) = best_move("7k/5Q2/6K1/8/8/8/8/8 w - - 0 1", 3);

    // A forced mate is on the board; the winning side must report it.
    assert_eq!(score, SCORE_INF);

    // Whatever the chosen move, it must never leave black stalemated.
    board.make_move(mov);
    let replies = generate_moves(&board);
    assert!(
        !replies.is_empty() || is_king_attacked(&board, Color::Black),
        "{} stalemates the defender",
        mov.to_uci()
    );
}

#[test]
fn the_knight_shuffle_registers_as_threefold_repetition() {
    let mut board = Board::new("4k3/8/8/8/8/8/8/4K2N w - - 0 1").unwrap();

    let shuffle = ["h1g3", "e8d8", "g3h1", "d8e8"];
    for (index, text) in shuffle.iter().cycle().take(8).enumerate() {
        assert!(
            !board.is_threefold_repetition(),
            "repetition reported one move early, after {} plies",
            index
        );
        make_uci(&mut board, text);
    }

    // The starting position has now occurred for the third time.
    assert!(board.is_threefold_repetition());

    // Unwinding one shuffle takes the count back below three.
    board.unmake_move();
    assert!(!board.is_threefold_repetition());
}

#[test]
fn en_passant_removes_the_captured_pawn() {
    let mut board = Board::new("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();

    let moves: Vec<String> = generate_moves(&board)
        .moves
        .iter()
        .map(|m| m.to_uci())
        .collect();
    assert!(moves.contains(&"e5d6".to_string()));

    make_uci(&mut board, "e5d6");
    assert_eq!(board.to_fen(), "4k3/8/3P4/8/8/8/8/4K3 b - - 0 1");
}

#[test]
fn castling_is_refused_through_an_attacked_square() {
    // The f8 rook covers f1; kingside is out, queenside stays legal.
    let board = Board::new("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1").unwrap();
    let moves: Vec<String> = generate_moves(&board)
        .moves
        .iter()
        .map(|m| m.to_uci())
        .collect();

    assert!(!moves.contains(&"e1g1".to_string()));
    assert!(moves.contains(&"e1c1".to_string()));
}

#[test]
fn promotion_places_a_queen() {
    let mut board = Board::new("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();

    let moves: Vec<String> = generate_moves(&board)
        .moves
        .iter()
        .map(|m| m.to_uci())
        .collect();
    assert!(moves.contains(&"a7a8".to_string()));

    make_uci(&mut board, "a7a8");
    assert_eq!(board.to_fen(), "Q3k3/8/8/8/8/8/8/4K3 b - - 0 1");

    // And the promotion unwinds cleanly.
    board.unmake_move();
    assert_eq!(board.to_fen(), "4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
}

#[test]
fn a_search_from_a_mated_position_reports_the_null_move() {
    // Black is already checkmated; there is nothing to play.
    let mut board = Board::new("R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1").unwrap();
    let report = Searcher::new().find_best_move(&mut board, 3);
    assert_eq!(report.best_move, Move::NULL);
    assert_eq!(report.score, SCORE_INF);
}
