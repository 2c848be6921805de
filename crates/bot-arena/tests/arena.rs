use bot_arena::config::{ArenaConfig, PresetConfig};
use bot_arena::game_runner::{GameRunner, MatchResult};
use bot_arena::json_output::write_game_json;
use bot_arena::match_runner::run_match;
use chess_core::{Board, Position};
use chess_rating::Leaderboard;
use std::fs;

const QUEEN_ENDING: &str = "k7/8/8/8/8/8/8/K5Q1 w - - 0 1";

fn config(dir: &std::path::Path) -> ArenaConfig {
    let path = dir.join("arena.toml");
    fs::write(
        &path,
        r#"
[engines.strong]
kind = "negamax"
depth = 2

[engines.weak]
kind = "random"
seed = 5

[presets.short]
games = 2
max_plies = 10
openings = ["k7/8/8/8/8/8/8/K5Q1 w - - 0 1"]

[rating]
elo_k = 16.0
"#,
    )
    .unwrap();
    ArenaConfig::load_from(&path).unwrap()
}

#[test]
fn recorded_moves_replay_to_the_final_position() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let mut white = config.build_engine("strong").unwrap();
    let mut black = config.build_engine("weak").unwrap();
    let start = Board::from_fen(QUEEN_ENDING).unwrap();

    let record = GameRunner::new("strong", &mut white, "weak", &mut black)
        .with_max_plies(10)
        .play_game(&start);

    assert_ne!(record.result, MatchResult::BlackWins);
    assert!(record.moves.len() <= 10);

    let mut replay = start.clone();
    for mv in &record.moves {
        replay.play_uci(&mv.uci).unwrap();
    }
    assert_eq!(replay.fen(), record.final_fen);
    assert_eq!(record.start_fen, QUEEN_ENDING);
}

#[test]
fn match_updates_ratings_and_writes_games() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let preset = config.get_preset("short").unwrap().clone();
    let mut leaderboard = config.rating.leaderboard();

    let games_dir = dir.path().join("games");
    fs::create_dir_all(&games_dir).unwrap();
    let summary = run_match(&config, "strong", "weak", &preset, &mut leaderboard, |i, game| {
        let id = format!("game-{}", i);
        write_game_json(games_dir.join(format!("{}.json", id)), &id, game).unwrap();
    })
    .unwrap();

    assert_eq!(summary.wins_a + summary.wins_b + summary.draws, 2);
    assert_eq!(fs::read_dir(&games_dir).unwrap().count(), 2);
    assert!(summary.games.iter().all(|g| g.start_fen == QUEEN_ENDING));

    let strong = leaderboard.rating("strong").unwrap();
    let weak = leaderboard.rating("weak").unwrap();
    assert!(strong.rd < 350.0);
    assert!(weak.rd < 350.0);
    assert_eq!(leaderboard.pending_games(), 0);

    let json = serde_json::to_string(&leaderboard).unwrap();
    let restored: Leaderboard = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.standings()[0].games, 2);
}

#[test]
fn default_config_knows_every_engine_kind() {
    let config = ArenaConfig::default();
    let mut kinds: Vec<&str> = config.engines.values().map(|e| e.kind()).collect();
    kinds.sort_unstable();
    assert_eq!(
        kinds,
        ["iterative_deepening", "mcts", "minimax", "negamax", "quiescence", "random"]
    );
    for name in config.engines.keys() {
        assert!(config.build_engine(name).is_ok(), "{}", name);
    }
    assert_eq!(PresetConfig::default().games, 10);
}
