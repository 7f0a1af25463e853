pub mod brick_breaker;
pub mod bubble_shooter;
pub mod endless_runner;
pub mod flappy_bird;
pub mod snake;

use clap::ValueEnum;

use crate::event::InputSnapshot;
use crate::surface::Surface;

use brick_breaker::BrickBreaker;
use bubble_shooter::BubbleShooter;
use endless_runner::EndlessRunner;
use flappy_bird::FlappyBird;
use snake::Snake;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Lost { score: u32 },
    Cleared { score: u32 },
}

impl Outcome {
    pub fn score(&self) -> u32 {
        match self {
            Outcome::Lost { score } | Outcome::Cleared { score } => *score,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Outcome::Lost { .. } => "Game Over!",
            Outcome::Cleared { .. } => "You Win!",
        }
    }
}

/// What a session reports back after advancing one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    Over(Outcome),
}

pub trait GameSession {
    fn title(&self) -> &'static str;

    /// First-run setup; most games treat it as a reset.
    fn init(&mut self) {
        self.reset();
    }

    /// Back to a fresh-game baseline. Must be idempotent.
    fn reset(&mut self);

    /// Advance by exactly `dt` seconds, consuming the events meant for the game.
    fn update(&mut self, dt: f32, input: &InputSnapshot) -> Step;

    fn draw(&self, surface: &mut dyn Surface);

    fn score(&self) -> u32;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum GameKind {
    #[value(name = "snake")]
    Snake,
    #[value(name = "flappy_bird")]
    FlappyBird,
    #[value(name = "brick_breaker")]
    BrickBreaker,
    #[value(name = "bubble_shooter")]
    BubbleShooter,
    #[value(name = "endless_runner")]
    EndlessRunner,
}

impl GameKind {
    pub fn all() -> &'static [GameKind] {
        &[
            GameKind::Snake,
            GameKind::FlappyBird,
            GameKind::BrickBreaker,
            GameKind::BubbleShooter,
            GameKind::EndlessRunner,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            GameKind::Snake => "snake",
            GameKind::FlappyBird => "flappy_bird",
            GameKind::BrickBreaker => "brick_breaker",
            GameKind::BubbleShooter => "bubble_shooter",
            GameKind::EndlessRunner => "endless_runner",
        }
    }

    pub fn from_key(key: &str) -> Option<GameKind> {
        Self::all().iter().copied().find(|g| g.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::Snake => "Snake",
            GameKind::FlappyBird => "Flappy Bird",
            GameKind::BrickBreaker => "Brick Breaker",
            GameKind::BubbleShooter => "Bubble Shooter",
            GameKind::EndlessRunner => "Endless Runner",
        }
    }

    /// Bubble Shooter runs fine but is not offered by the HTTP launcher.
    pub fn launchable(&self) -> bool {
        !matches!(self, GameKind::BubbleShooter)
    }

    pub fn session(&self) -> Box<dyn GameSession> {
        match self {
            GameKind::Snake => Box::new(Snake::new()),
            GameKind::FlappyBird => Box::new(FlappyBird::new()),
            GameKind::BrickBreaker => Box::new(BrickBreaker::new()),
            GameKind::BubbleShooter => Box::new(BubbleShooter::new()),
            GameKind::EndlessRunner => Box::new(EndlessRunner::new()),
        }
    }
}
