use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::style::Color;

use crate::event::{InputEvent, InputSnapshot, Key, MouseButton};
use crate::games::{GameSession, Step};
use crate::geometry::Point;
use crate::surface::{Align, Surface, HEIGHT, WIDTH};

const BUBBLE_RADIUS: f32 = 18.0;
const PALETTE: [Color; 6] = [
    Color::Rgb(255, 99, 132),
    Color::Rgb(54, 162, 235),
    Color::Rgb(255, 206, 86),
    Color::Rgb(75, 192, 192),
    Color::Rgb(153, 102, 255),
    Color::Rgb(255, 159, 64),
];
const SHOOTER_Y: f32 = HEIGHT - 40.0;
const SHOOTER_RADIUS: f32 = 22.0;
const SHOOTER_KEY_SPEED: f32 = 360.0;
const BUBBLE_SPEED: f32 = 420.0;
const WAVE_INTERVAL: f32 = 10.0;
const HIT_DISTANCE: f32 = BUBBLE_RADIUS * 2.0;
const LINK_DISTANCE: f32 = BUBBLE_RADIUS * 2.0 + 2.0;
const MATCH_POINTS: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Bubble {
    pos: Point,
    /// Index into `PALETTE`.
    color: usize,
}

pub struct BubbleShooter {
    bubbles: Vec<Bubble>,
    shooter_x: f32,
    loaded: usize,
    shot: Option<Bubble>,
    wave_timer: f32,
    score: u32,
    rng: StdRng,
}

impl BubbleShooter {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut b = Self {
            bubbles: Vec::new(),
            shooter_x: WIDTH / 2.0,
            loaded: 0,
            shot: None,
            wave_timer: 0.0,
            score: 0,
            rng,
        };
        b.reset();
        b
    }

    fn random_color(&mut self) -> usize {
        self.rng.gen_range(0..PALETTE.len())
    }

    fn aim(&mut self, x: f32) {
        self.shooter_x = x.clamp(SHOOTER_RADIUS, WIDTH - SHOOTER_RADIUS);
    }

    fn fire(&mut self) {
        if self.shot.is_some() {
            return;
        }
        self.shot = Some(Bubble {
            pos: Point::new(self.shooter_x, SHOOTER_Y),
            color: self.loaded,
        });
        self.loaded = self.random_color();
    }

    fn spawn_wave(&mut self) {
        let count = self.rng.gen_range(2..=4);
        for _ in 0..count {
            let pos = Point::new(
                self.rng.gen_range(BUBBLE_RADIUS..=WIDTH - BUBBLE_RADIUS),
                self.rng.gen_range(60.0..=HEIGHT / 2.0),
            );
            let color = self.random_color();
            self.bubbles.push(Bubble { pos, color });
        }
    }

    fn advance_shot(&mut self, dt: f32) {
        let Some(mut shot) = self.shot else { return };
        shot.pos.y -= BUBBLE_SPEED * dt;

        if let Some(idx) = self
            .bubbles
            .iter()
            .position(|b| b.pos.distance(shot.pos) < HIT_DISTANCE)
        {
            if self.bubbles[idx].color == shot.color {
                let doomed = cluster(&self.bubbles, idx);
                let mut i = 0;
                self.bubbles.retain(|_| {
                    let keep = !doomed.contains(&i);
                    i += 1;
                    keep
                });
                self.score += MATCH_POINTS;
            } else {
                self.bubbles.push(shot);
            }
            self.shot = None;
            return;
        }

        if shot.pos.y < 0.0 {
            self.bubbles.push(Bubble {
                pos: Point::new(shot.pos.x, BUBBLE_RADIUS),
                color: shot.color,
            });
            self.shot = None;
            return;
        }
        self.shot = Some(shot);
    }
}

impl Default for BubbleShooter {
    fn default() -> Self {
        Self::new()
    }
}

/// Indices of every bubble reachable from `start` through same-coloured
/// neighbours closer than the link distance.
fn cluster(bubbles: &[Bubble], start: usize) -> Vec<usize> {
    let color = bubbles[start].color;
    let mut seen = vec![false; bubbles.len()];
    let mut found = Vec::new();
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    while let Some(idx) = queue.pop_front() {
        found.push(idx);
        let here = bubbles[idx].pos;
        for (j, b) in bubbles.iter().enumerate() {
            if !seen[j] && b.color == color && here.distance(b.pos) < LINK_DISTANCE {
                seen[j] = true;
                queue.push_back(j);
            }
        }
    }
    found
}

impl GameSession for BubbleShooter {
    fn title(&self) -> &'static str {
        "Bubble Shooter"
    }

    fn reset(&mut self) {
        self.bubbles.clear();
        self.shooter_x = WIDTH / 2.0;
        self.loaded = self.random_color();
        self.shot = None;
        self.wave_timer = 0.0;
        self.score = 0;
    }

    fn update(&mut self, dt: f32, input: &InputSnapshot) -> Step {
        for event in input.events() {
            match *event {
                InputEvent::MouseMove { pos } => self.aim(pos.x),
                InputEvent::MouseDown { button: MouseButton::Left, .. } => self.fire(),
                InputEvent::KeyDown(Key::Space) => self.fire(),
                _ => {}
            }
        }
        if input.is_held(Key::Left) {
            self.aim(self.shooter_x - SHOOTER_KEY_SPEED * dt);
        }
        if input.is_held(Key::Right) {
            self.aim(self.shooter_x + SHOOTER_KEY_SPEED * dt);
        }

        self.wave_timer += dt;
        if self.wave_timer > WAVE_INTERVAL {
            self.spawn_wave();
            self.wave_timer = 0.0;
        }

        self.advance_shot(dt);
        Step::Continue
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(Color::Rgb(30, 41, 59));
        for b in &self.bubbles {
            surface.fill_circle(b.pos, BUBBLE_RADIUS, PALETTE[b.color]);
        }
        if let Some(shot) = &self.shot {
            surface.fill_circle(shot.pos, BUBBLE_RADIUS, PALETTE[shot.color]);
        }
        surface.stroke_circle(
            Point::new(self.shooter_x, SHOOTER_Y),
            SHOOTER_RADIUS,
            PALETTE[self.loaded],
        );
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
