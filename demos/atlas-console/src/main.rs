//! Line-oriented console host for an Atlas game.
//!
//! Every line is `<player-id> <command> [args]`, or a bare `status`:
//!
//! ```text
//! 1 join Ana      open or join the lobby
//! 1 start         start the game
//! 1 say Mumbai    answer
//! 2 leave         leave the lobby or game
//! 1 stop          stop (creator only; `stop mod` to override)
//! status          scoreboard
//! ```
//!
//! With `--json`, events are printed as JSON lines instead of prose.

use std::sync::Arc;

use atlas::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Place list
// ---------------------------------------------------------------------------

const PLACES: &[&str] = &[
    "Amsterdam", "Athens", "Berlin", "Cairo", "Delhi", "Dublin", "Düsseldorf", "Finland",
    "Helsinki", "Iceland", "India", "Islamabad", "Istanbul", "Jordan", "Kenya", "Lima",
    "London", "Madrid", "Mumbai", "Nairobi", "Nepal", "Norway", "Oman", "Oslo", "Paris",
    "Rome", "Sydney", "Tokyo", "Yemen", "Zurich",
];

const CHANNEL: SessionKey = SessionKey(1);

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

enum Command {
    Join(PlayerId, String),
    Start,
    Say(PlayerId, String),
    Leave(PlayerId),
    Stop(PlayerId, bool),
    Status,
}

fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line == "status" {
        return Ok(Command::Status);
    }
    let (id, rest) = line.split_once(' ').ok_or("expected `<player-id> <command>`")?;
    let id = PlayerId(id.parse().map_err(|_| format!("bad player id {id:?}"))?);
    let (verb, arg) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
    let arg = arg.trim();
    match verb {
        "join" if !arg.is_empty() => Ok(Command::Join(id, arg.to_string())),
        "join" => Ok(Command::Join(id, id.to_string())),
        "start" => Ok(Command::Start),
        "say" => Ok(Command::Say(id, arg.to_string())),
        "leave" => Ok(Command::Leave(id)),
        "stop" => Ok(Command::Stop(id, arg == "mod")),
        other => Err(format!("unknown command {other:?}")),
    }
}

async fn run(sessions: &SessionManager<PlaceSet>, command: Command) -> Result<(), AtlasError> {
    match command {
        Command::Join(id, name) => {
            sessions.join(CHANNEL, id, name).await?;
        }
        Command::Start => {
            sessions.start(CHANNEL).await?;
        }
        Command::Say(id, text) => {
            sessions.submit_answer(CHANNEL, id, &text).await?;
        }
        Command::Leave(id) => {
            sessions.leave(CHANNEL, id).await?;
        }
        Command::Stop(id, moderator) => sessions.stop(CHANNEL, id, moderator).await?,
        Command::Status => match sessions.status(CHANNEL).await {
            None => println!("no game running"),
            Some(SessionStatus::Lobby { players, .. }) => {
                let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
                println!("lobby: {}", names.join(", "));
            }
            Some(SessionStatus::Active { game, .. }) => print_scoreboard(&game),
        },
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_scoreboard(game: &GameSnapshot) {
    let letter = game
        .required_letter
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "any".into());
    println!("turn: {}  letter: {letter}  words: {}", game.current_player.name, game.words_used);
    for p in &game.players {
        let mark = if p.is_eliminated(game.max_strikes) { "out" } else { "in" };
        println!("  {:<12} {}/{} {mark}", p.name, p.strikes(), game.max_strikes);
    }
}

fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::LobbyOpened { creator, .. } => format!("lobby opened by {creator}"),
        SessionEvent::PlayerJoined { player, lobby_size, .. } => {
            format!("{} joined ({lobby_size} in lobby)", player.name)
        }
        SessionEvent::PlayerLeftLobby { player, lobby_size, .. } => {
            format!("{player} left the lobby ({lobby_size} left)")
        }
        SessionEvent::GameStarted { turn_order, .. } => {
            let names: Vec<_> = turn_order.iter().map(|p| p.name.as_str()).collect();
            format!("game started: {}", names.join(" → "))
        }
        SessionEvent::Answer { outcome, .. } => {
            let mut line = format!("{}: {:?} is {}", outcome.player.name, outcome.answer, outcome.status);
            if outcome.eliminated {
                line.push_str(", eliminated");
            }
            if let (Some(next), Some(letter)) = (&outcome.next_player, outcome.next_letter) {
                line.push_str(&format!(". {} needs {}", next.name, letter.to_uppercase()));
            }
            line
        }
        SessionEvent::Timeout { outcome, .. } => format!(
            "{} ran out of time ({} strikes){}",
            outcome.player.name,
            outcome.strikes,
            if outcome.eliminated { ", eliminated" } else { "" }
        ),
        SessionEvent::PlayerLeftGame { outcome, .. } => {
            format!("{} left the game", outcome.player.name)
        }
        SessionEvent::GameOver { winner, .. } => format!("{} wins!", winner.name),
        SessionEvent::Stopped { by, .. } => format!("game stopped by {by}"),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), AtlasError> {
    dotenvy::dotenv().ok();
    atlas::logging::init();

    let config = AtlasConfig::from_env()?;
    let places: PlaceSet = PLACES.iter().collect();
    tracing::info!(places = places.len(), "starting console");
    let (sessions, mut events) = SessionManager::new(config.game, Arc::new(places));
    let json = std::env::args().any(|arg| arg == "--json");

    tokio::spawn(async move {
        let codec = JsonCodec;
        while let Some(event) = events.recv().await {
            if !json {
                println!("* {}", describe(&event));
                continue;
            }
            match codec.encode(&event) {
                Ok(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
                Err(err) => tracing::warn!(error = %err, "event not encodable"),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let result = match parse(&line) {
            Ok(command) => run(&sessions, command).await.map_err(|e| e.to_string()),
            Err(msg) => Err(msg),
        };
        if let Err(msg) = result {
            println!("! {msg}");
        }
    }
    Ok(())
}
