//! CLI blackjack example.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bjtable::{
    CardView, DealError, DealerStep, Difficulty, Game, GameOptions, JsonFileScoreStore,
    LocalDeckService, RoundResult, Turn,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cli_blackjack", about = "Play blackjack against the dealer")]
struct Args {
    /// Number of decks shuffled for each round (1-8).
    #[arg(long, default_value_t = 1)]
    decks: u8,
    /// Dealer difficulty: easy, normal or hard.
    #[arg(long, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,
    /// Where the win/loss/draw record is kept.
    #[arg(long, default_value = "blackjack-score.json")]
    score_file: PathBuf,
    /// Shuffle seed; defaults to the current time.
    #[arg(long)]
    seed: Option<u64>,
}

type Table = Game<LocalDeckService, JsonFileScoreStore>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    });
    let game = Game::new(
        LocalDeckService::new(seed),
        JsonFileScoreStore::new(args.score_file),
    );
    let mut options = GameOptions::default()
        .with_decks(args.decks)
        .with_difficulty(args.difficulty);

    println!("Blackjack CLI example (type 'q' to quit)");
    print_score(&game);

    let mut dealt = game.start_game(options);
    loop {
        match dealt {
            Ok(Some(result)) => finish_round(&game, &result),
            Ok(None) => {
                if !play_round(&game) {
                    return;
                }
            }
            Err(err) => println!("Could not deal: {err}"),
        }

        match prompt_line("[n]ew round, [m]enu or [q]uit: ").as_str() {
            "m" | "menu" => {
                game.return_to_menu();
                let Some(chosen) = prompt_options() else {
                    return;
                };
                options = chosen;
                dealt = game.start_game(options);
            }
            "q" | "quit" => return,
            _ => dealt = retry_deal(&game, options),
        }
    }
}

/// Deals again, whatever state the last attempt left the table in.
fn retry_deal(game: &Table, options: GameOptions) -> Result<Option<RoundResult>, DealError> {
    match game.new_round() {
        Err(DealError::InvalidState) => game.restart(),
        Err(DealError::NotConfigured) => game.start_game(options),
        other => other,
    }
}

/// Runs the player's and dealer's turns. Returns `false` if the player quit.
fn play_round(game: &Table) -> bool {
    while game.turn() == Some(Turn::PlayerTurn) {
        print_table(game);

        match prompt_line("[h]it, [s]tand, [r]estart: ").as_str() {
            "h" | "hit" => match game.hit() {
                Ok(hit) => {
                    println!("You draw {}.", hit.card);
                    if let Some(result) = hit.result {
                        finish_round(game, &result);
                        return true;
                    }
                }
                Err(err) => println!("Action error: {err}"),
            },
            "s" | "stand" => {
                if let Err(err) = game.stand() {
                    println!("Action error: {err}");
                }
            }
            "r" | "restart" => match game.restart() {
                Ok(Some(result)) => {
                    finish_round(game, &result);
                    return true;
                }
                Ok(None) => println!("Cards reshuffled."),
                Err(err) => {
                    println!("Could not deal: {err}");
                    return true;
                }
            },
            "q" | "quit" => return false,
            _ => println!("Unknown action."),
        }
    }

    if game.turn() == Some(Turn::DealerTurn) {
        print_table(game);
        for step in game.dealer_steps() {
            match step {
                Ok(DealerStep::Draw { card, value }) => {
                    println!("Dealer draws {card} ({value}).");
                }
                Ok(DealerStep::Resolved(result)) => finish_round(game, &result),
                Err(err) => println!("Dealer error: {err}"),
            }
        }
    }

    true
}

fn finish_round(game: &Table, result: &RoundResult) {
    print_table(game);
    println!("{}", result.message());
    if let Some(err) = &result.persistence_error {
        println!("Warning: score not saved ({err}).");
    }
    print_score(game);
}

fn prompt_options() -> Option<GameOptions> {
    let decks = loop {
        let input = prompt_line("Decks (1-8): ");
        if input == "q" {
            return None;
        }
        match input.parse::<u8>() {
            Ok(decks) if (1..=8).contains(&decks) => break decks,
            _ => println!("Please enter a number from 1 to 8."),
        }
    };

    let difficulty = loop {
        let input = prompt_line("Difficulty (easy/normal/hard): ");
        if input == "q" {
            return None;
        }
        match input.parse::<Difficulty>() {
            Ok(difficulty) => break difficulty,
            Err(err) => println!("{err}"),
        }
    };

    Some(
        GameOptions::default()
            .with_decks(decks)
            .with_difficulty(difficulty),
    )
}

fn prompt_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => return String::from("q"),
        Ok(_) => {}
    }
    input.trim().to_lowercase()
}

fn print_table(game: &Table) {
    let Some(view) = game.view() else {
        return;
    };

    println!(
        "\nDealer: {} (value {})",
        format_cards(&view.dealer),
        view.dealer_value
    );
    println!(
        "You:    {} (value {})\n",
        format_cards(&view.player),
        view.player_value
    );
}

fn print_score(game: &Table) {
    let score = game.score();
    println!(
        "Score: {} win(s), {} loss(es), {} draw(s)",
        score.wins, score.losses, score.draws
    );
}

fn format_cards(cards: &[CardView]) -> String {
    cards
        .iter()
        .map(|view| {
            if view.concealed {
                colorize("??", "90")
            } else {
                view.card.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn colorize(text: &str, code: &str) -> String {
    format!("\u{1b}[{code}m{text}\u{1b}[0m")
}
