//! Display names handed out to new connections.

use rand::seq::SliceRandom;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Carmen", "Dmytro", "Elena", "Felix", "Greta", "Hugo", "Iryna", "Jonas",
    "Katya", "Leon", "Marta", "Nadia", "Oscar", "Petra", "Quentin", "Rosa", "Stefan", "Taras",
    "Ursula", "Viktor", "Wanda", "Yusuf", "Zoya",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Bondarenko", "Castillo", "Dubois", "Eriksen", "Fischer", "Garcia", "Horvat",
    "Ivanenko", "Jensen", "Kowalski", "Lindqvist", "Moreau", "Novak", "Olsen", "Petrenko",
    "Quinn", "Rossi", "Schmidt", "Tkachenko", "Varga", "Weber", "Zelenko",
];

/// Source of display names. Names need not be unique.
pub trait NameGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Picks a random "First Last" pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNames;

impl NameGenerator for RandomNames {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Anonymous");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Guest");
        format!("{first} {last}")
    }
}
