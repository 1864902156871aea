//! Basic example of using the popgrid engine

use popgrid_core::{EngineConfig, MatchingEngine, Position};

fn main() {
    // Load a 5x5 stage: 0 = trigger slot, 1 = red, 2 = blue, 3 = yellow
    let pattern = [
        0, 1, 0, 1, 0, //
        2, 0, 0, 0, 2, //
        0, 0, 3, 0, 0, //
        2, 0, 0, 0, 2, //
        0, 1, 0, 3, 0, //
    ];
    let mut engine = match MatchingEngine::from_pattern(EngineConfig::default(), 5, 5, &pattern) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("bad level pattern: {err}");
            return;
        }
    };

    println!("Loaded board:");
    println!("{}", engine.board());
    println!("Blocks: {}", engine.board().filled_count());
    println!("Triggers: {}\n", engine.board().empty_count());

    // Ask the oracle for a playable move
    if let Some(hint) = engine.hint() {
        println!("Hint: tap {} to clear {} blocks\n", hint.trigger, hint.cells.len());
    }

    // Tap between the two red blocks on the top row
    println!("Tapping (2, 0)...\n");
    match engine.tap(Position::new(2, 0)) {
        Ok(outcome) => {
            for (pos, color) in &outcome.destroyed {
                println!("Destroyed {color} block at {pos}");
            }
            println!("Points: {}", outcome.points);
            for action in &outcome.recovery {
                println!("Recovery step: {action:?}");
            }
            println!("State: {:?}\n", outcome.state);
        }
        Err(err) => println!("Tap rejected: {err}"),
    }

    println!("Board afterwards:");
    println!("{}", engine.board());
    println!("Total score: {}", engine.score());
}
