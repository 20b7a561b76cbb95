use rand::seq::SliceRandom;
use rand::Rng;
use shared::{Color, PlayerId};

/// Identity of a connected client, fixed for the lifetime of its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Player {
    pub id: PlayerId,
    pub color: Color,
}

impl Player {
    pub fn new(id: PlayerId, color: Color) -> Self {
        Self { id, color }
    }

    /// Creates a player with a color sampled from the player palette.
    pub fn random<R: Rng + ?Sized>(id: PlayerId, rng: &mut R) -> Self {
        let color = *Color::PLAYER_PALETTE
            .choose(rng)
            .unwrap_or(&Color::Blue);
        Self { id, color }
    }
}
