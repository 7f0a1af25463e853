use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::style::Color;

use crate::event::{InputEvent, InputSnapshot, Key, MouseButton};
use crate::games::{GameSession, Outcome, Step};
use crate::geometry::{Point, Rect};
use crate::surface::{Align, Surface, HEIGHT, WIDTH};

const GRAVITY: f32 = 600.0;
const FLAP_VELOCITY: f32 = -240.0;
const PIPE_SPEED: f32 = 140.0;
const PIPE_GAP: f32 = 170.0;
const PIPE_INTERVAL: f32 = 1.8;
const PIPE_WIDTH: f32 = 60.0;
const GAP_MARGIN: f32 = 120.0;

const BIRD_X: f32 = 80.0;
const BIRD_RADIUS: f32 = 16.0;

#[derive(Clone, Debug)]
struct Pipe {
    x: f32,
    gap_y: f32,
    passed: bool,
}

impl Pipe {
    fn gap_top(&self) -> f32 {
        self.gap_y - PIPE_GAP / 2.0
    }

    fn gap_bottom(&self) -> f32 {
        self.gap_y + PIPE_GAP / 2.0
    }
}

pub struct FlappyBird {
    bird_y: f32,
    bird_vel: f32,
    pipes: Vec<Pipe>,
    pipe_timer: f32,
    score: u32,
    rng: StdRng,
}

impl FlappyBird {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut f = Self {
            bird_y: 0.0,
            bird_vel: 0.0,
            pipes: Vec::new(),
            pipe_timer: 0.0,
            score: 0,
            rng,
        };
        f.reset();
        f
    }

    fn spawn_pipe(&mut self) {
        let gap_y = self.rng.gen_range(GAP_MARGIN..=HEIGHT - GAP_MARGIN);
        self.pipes.push(Pipe {
            x: WIDTH + 40.0,
            gap_y,
            passed: false,
        });
    }

    fn hits_pipe(&self) -> bool {
        self.pipes.iter().any(|p| {
            BIRD_X + BIRD_RADIUS > p.x
                && BIRD_X - BIRD_RADIUS < p.x + PIPE_WIDTH
                && (self.bird_y < p.gap_top() || self.bird_y > p.gap_bottom())
        })
    }

    fn crash(&mut self) -> Step {
        let score = self.score;
        self.reset();
        Step::Over(Outcome::Lost { score })
    }
}

impl Default for FlappyBird {
    fn default() -> Self {
        Self::new()
    }
}

fn is_flap(event: &InputEvent) -> bool {
    matches!(
        event,
        InputEvent::KeyDown(Key::Space | Key::Up)
            | InputEvent::MouseDown {
                button: MouseButton::Left,
                ..
            }
    )
}

impl GameSession for FlappyBird {
    fn title(&self) -> &'static str {
        "Flappy Bird"
    }

    fn reset(&mut self) {
        self.bird_y = HEIGHT / 2.0;
        self.bird_vel = 0.0;
        self.pipes.clear();
        self.pipe_timer = 0.0;
        self.score = 0;
    }

    fn update(&mut self, dt: f32, input: &InputSnapshot) -> Step {
        if input.events().iter().any(is_flap) {
            self.bird_vel = FLAP_VELOCITY;
        }

        self.bird_vel += GRAVITY * dt;
        self.bird_y += self.bird_vel * dt;

        self.pipe_timer += dt;
        if self.pipe_timer >= PIPE_INTERVAL {
            self.pipe_timer = 0.0;
            self.spawn_pipe();
        }

        for p in &mut self.pipes {
            p.x -= PIPE_SPEED * dt;
            if !p.passed && p.x + PIPE_WIDTH < BIRD_X - BIRD_RADIUS {
                p.passed = true;
                self.score += 1;
            }
        }
        self.pipes.retain(|p| p.x > -PIPE_WIDTH);

        if self.bird_y < BIRD_RADIUS || self.bird_y > HEIGHT - BIRD_RADIUS {
            return self.crash();
        }
        if self.hits_pipe() {
            return self.crash();
        }
        Step::Continue
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(Color::Rgb(14, 116, 144));
        let pipe_color = Color::Rgb(22, 163, 74);
        for p in &self.pipes {
            surface.fill_rect(Rect::new(p.x, 0.0, PIPE_WIDTH, p.gap_top()), pipe_color);
            surface.fill_rect(
                Rect::new(p.x, p.gap_bottom(), PIPE_WIDTH, HEIGHT - p.gap_bottom()),
                pipe_color,
            );
        }
        surface.fill_circle(Point::new(BIRD_X, self.bird_y), BIRD_RADIUS, Color::Rgb(234, 179, 8));
        surface.text(
            &format!("Score: {}", self.score),
            Point::new(10.0, 10.0),
            Align::Left,
            Color::Rgb(255, 255, 255),
        );
    }

    fn score(&self) -> u32 {
        self.score
    }
}
