use chess_arbiter::ai::{MoveSelector, RandomSelector};
use chess_arbiter::config::EngineConfig;
use chess_arbiter::engine::{ChessError, GameState};
use chess_arbiter::session::Session;

#[tokio::main]
async fn main() {
    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_arbiter=info".into()),
        )
        .init();

    let config = EngineConfig::from_env();
    tracing::info!(
        "chess-arbiter v{} self-play, automated side {}",
        env!("CARGO_PKG_VERSION"),
        config.ai_color
    );

    match self_play(config).await {
        Ok(final_state) => println!("result: {}", final_state.status()),
        Err(e) => {
            eprintln!("self-play failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Play the configured selector against a thread-RNG opponent until the game
/// ends or the ply cap is reached.
async fn self_play(config: EngineConfig) -> Result<GameState, ChessError> {
    let ai = config.selector();
    let opponent = RandomSelector::new();
    let max_plies = config.max_plies;
    let session = Session::new(config);

    for ply in 1..=max_plies {
        let state = session.snapshot().await;
        if state.is_game_over() {
            break;
        }

        let next = match session.play_ai_turn(&ai).await? {
            Some(next) => next,
            None => {
                let mv = opponent.select_move(&state)?;
                session.apply_move(mv).await?
            }
        };

        println!("ply {ply}: {}", next.status());
        println!("{}", next.board());
    }

    let state = session.snapshot().await;
    if !state.is_game_over() {
        tracing::info!(max_plies, "ply cap reached");
    }
    Ok(state)
}
