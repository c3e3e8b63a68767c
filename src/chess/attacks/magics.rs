use crate::chess::attacks::tables::{
    BISHOP_DIRECTIONS, BISHOP_RM, Offset, ROOK_DIRECTIONS, ROOK_RM, gen_sliding_attacks,
};
use crate::chess::bitboard::Bitboard;
use crate::chess::board::{BOARD_SIZE, Square};
use rand::{Rng, SeedableRng};
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug)]
pub struct Magic {
    pub offset: usize,
    pub magic: u64,
    pub shift: u32,
}

struct SlidingTables {
    bishop: [Magic; BOARD_SIZE],
    rook: [Magic; BOARD_SIZE],
    /// Attack sets for every square and relevant-occupancy subset, bishops
    /// first, each square's block starting at its `Magic::offset`.
    attacks: Vec<Bitboard>,
}

/// Expands subset index `variant` of `relevant_mask` into an occupancy
/// bitboard: bit `i` of `variant` decides whether the `i`-th mask square
/// (lowest-bit-first) holds a blocker.
fn get_occupancy(mut variant: usize, mut relevant_mask: u64) -> u64 {
    debug_assert!(variant < (1 << relevant_mask.count_ones()));

    let mut occupancy: u64 = 0;

    while variant != 0 {
        if variant & 1 != 0 {
            occupancy |= relevant_mask & relevant_mask.wrapping_neg();
        }

        variant >>= 1;
        relevant_mask &= relevant_mask - 1;
    }

    occupancy
}

/// Random trial search for a collision-free magic multiplier. Sparse
/// candidates (`r & r & r`) find one quickly; the fixed seed keeps the
/// resulting tables identical across runs.
fn find_magic(
    square: Square,
    relevant_mask: Bitboard,
    directions: &[Offset],
) -> (u64, usize, Vec<Bitboard>) {
    let bits = relevant_mask.popcount() as usize;
    let len = 1usize << bits;

    let occupancies: Vec<Bitboard> = (0..len)
        .map(|variant| Bitboard(get_occupancy(variant, relevant_mask.0)))
        .collect();
    let attacks: Vec<Bitboard> = (0..len)
        .map(|variant| gen_sliding_attacks(square, occupancies[variant], directions))
        .collect();

    let mut rng = rand::rngs::SmallRng::seed_from_u64(1);

    for _ in 0..100_000_000u64 {
        let magic = rng.random::<u64>() & rng.random::<u64>() & rng.random::<u64>();

        // An attack set is never empty, so EMPTY marks an unused slot.
        let mut used: Vec<Bitboard> = vec![Bitboard::EMPTY; len];

        let mut collided = false;
        for variant in 0..len {
            let index = (occupancies[variant].0.wrapping_mul(magic) >> (BOARD_SIZE - bits)) as usize;

            if used[index].is_empty() {
                used[index] = attacks[variant];
            } else if used[index] != attacks[variant] {
                collided = true;
                break;
            }
        }

        if !collided {
            return (magic, bits, used);
        }
    }

    unreachable!("no magic found for square {square}")
}

static TABLES: LazyLock<SlidingTables> = LazyLock::new(|| {
    const NO_MAGIC: Magic = Magic {
        offset: 0,
        magic: 0,
        shift: 0,
    };

    let mut bishop = [NO_MAGIC; BOARD_SIZE];
    let mut rook = [NO_MAGIC; BOARD_SIZE];
    let mut attacks: Vec<Bitboard> = Vec::new();
    let mut offset = 0usize;

    for square in 0..BOARD_SIZE {
        let (magic, bits, mut table) =
            find_magic(square as Square, BISHOP_RM[square], &BISHOP_DIRECTIONS);

        bishop[square] = Magic {
            offset,
            magic,
            shift: (BOARD_SIZE - bits) as u32,
        };
        attacks.append(&mut table);
        offset += 1usize << bits;
    }

    for square in 0..BOARD_SIZE {
        let (magic, bits, mut table) =
            find_magic(square as Square, ROOK_RM[square], &ROOK_DIRECTIONS);

        rook[square] = Magic {
            offset,
            magic,
            shift: (BOARD_SIZE - bits) as u32,
        };
        attacks.append(&mut table);
        offset += 1usize << bits;
    }

    SlidingTables {
        bishop,
        rook,
        attacks,
    }
});

#[inline(always)]
fn bishop_index(square: Square, occupancy: Bitboard) -> usize {
    let magic = &TABLES.bishop[square as usize];
    let variant =
        (occupancy & BISHOP_RM[square as usize]).0.wrapping_mul(magic.magic) >> magic.shift;
    magic.offset + variant as usize
}

#[inline(always)]
fn rook_index(square: Square, occupancy: Bitboard) -> usize {
    let magic = &TABLES.rook[square as usize];
    let variant =
        (occupancy & ROOK_RM[square as usize]).0.wrapping_mul(magic.magic) >> magic.shift;
    magic.offset + variant as usize
}

#[inline(always)]
pub fn bishop_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    TABLES.attacks[bishop_index(square, occupancy)]
}

#[inline(always)]
pub fn rook_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    TABLES.attacks[rook_index(square, occupancy)]
}

#[inline(always)]
pub fn queen_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    rook_attacks(square, occupancy) | bishop_attacks(square, occupancy)
}
