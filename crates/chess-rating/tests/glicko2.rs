//! Glicko-2 behaviour over repeated rating periods.

use chess_rating::elo;
use chess_rating::{GameResult, Glicko2, GlickoRating, Leaderboard};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Beating the same weaker opponent period after period keeps raising the
    /// rating and narrowing the deviation while it is still well above its
    /// floor.
    #[test]
    fn repeated_wins_raise_rating_and_shrink_rd(
        rating in 800.0f64..2600.0,
        rd in 150.0f64..350.0,
        gap in 100.0f64..400.0,
        opponent_rd in 30.0f64..200.0,
    ) {
        let glicko = Glicko2::default();
        let opponent = GameResult {
            opponent_rating: rating - gap,
            opponent_rd,
            score: 1.0,
        };
        let mut current = GlickoRating { rating, rd, vol: 0.06 };
        for _ in 0..8 {
            let next = glicko.update_rating(&current, &[opponent]).unwrap();
            prop_assert!(next.rating > current.rating);
            prop_assert!(next.rd < current.rd);
            current = next;
        }
    }

    #[test]
    fn updates_converge_for_typical_inputs(
        rating in 0.0f64..3000.0,
        rd in 30.0f64..500.0,
        opponent_rating in 0.0f64..3000.0,
        opponent_rd in 30.0f64..500.0,
        score in prop::sample::select(vec![0.0, 0.5, 1.0]),
    ) {
        let glicko = Glicko2::default();
        let current = GlickoRating { rating, rd, vol: 0.06 };
        let result = GameResult { opponent_rating, opponent_rd, score };
        let next = glicko.update_rating(&current, &[result]).unwrap();
        prop_assert!(next.rd <= glicko.config().rd_ceiling);
        prop_assert!(next.vol > 0.0);
    }

    #[test]
    fn elo_updates_are_zero_sum(
        a in 1000.0f64..2800.0,
        b in 1000.0f64..2800.0,
        score in prop::sample::select(vec![0.0, 0.5, 1.0]),
    ) {
        let (new_a, new_b) = elo::update_pair(a, b, score, elo::DEFAULT_K_FACTOR);
        prop_assert!((new_a + new_b - a - b).abs() < 1e-9);
    }
}

#[test]
fn inactivity_widens_rd_towards_the_ceiling() {
    let glicko = Glicko2::default();
    let mut current = GlickoRating {
        rating: 1720.0,
        rd: 60.0,
        vol: 0.06,
    };
    for _ in 0..200 {
        let next = glicko.update_rating(&current, &[]).unwrap();
        assert!(next.rd >= current.rd);
        assert_eq!(next.rating, current.rating);
        current = next;
    }
    assert!(current.rd > 60.0);
    assert!(current.rd <= 350.0);
}

#[test]
fn stronger_player_rises_to_the_top() {
    let mut board = Leaderboard::default();
    for _ in 0..10 {
        board.record_game("quiescence", "random", 1.0).unwrap();
        board.record_game("quiescence", "negamax", 0.5).unwrap();
        board.record_game("negamax", "random", 0.5).unwrap();
        board.close_period().unwrap();
    }
    let names: Vec<String> = board.standings().into_iter().map(|s| s.name).collect();
    assert_eq!(names, ["quiescence", "negamax", "random"]);
}
