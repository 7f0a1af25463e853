use ratatui::style::Color;

use crate::event::{InputSnapshot, Key};
use crate::games::{GameSession, Outcome, Step};
use crate::geometry::{Point, Rect};
use crate::surface::{Align, Surface, HEIGHT, WIDTH};

const GROUND_Y: f32 = HEIGHT - 60.0;
const PLAYER_X: f32 = 80.0;
const PLAYER_WIDTH: f32 = 30.0;
const PLAYER_HEIGHT: f32 = 40.0;
const OBSTACLE_WIDTH: f32 = 30.0;
const OBSTACLE_HEIGHT: f32 = 50.0;
const SCROLL_SPEED: f32 = 260.0;
const SPAWN_INTERVAL: f32 = 1.4;
const DESPAWN_X: f32 = -20.0;
const GRAVITY: f32 = 900.0;
const JUMP_VELOCITY: f32 = -450.0;

const STANDING_Y: f32 = GROUND_Y - PLAYER_HEIGHT;

#[derive(Clone, Debug)]
struct Obstacle {
    rect: Rect,
    passed: bool,
}

pub struct EndlessRunner {
    player_y: f32,
    player_vy: f32,
    obstacles: Vec<Obstacle>,
    spawn_timer: f32,
    score: u32,
}

impl EndlessRunner {
    pub fn new() -> Self {
        let mut r = Self {
            player_y: STANDING_Y,
            player_vy: 0.0,
            obstacles: Vec::new(),
            spawn_timer: 0.0,
            score: 0,
        };
        r.reset();
        r
    }

    fn on_ground(&self) -> bool {
        self.player_y >= STANDING_Y - 1.0
    }

    fn wants_jump(input: &InputSnapshot) -> bool {
        [Key::Space, Key::Up]
            .into_iter()
            .any(|k| input.is_held(k) || input.pressed(k))
    }

    fn spawn_obstacle(&mut self) {
        self.obstacles.push(Obstacle {
            rect: Rect::new(
                WIDTH + 40.0,
                GROUND_Y - OBSTACLE_HEIGHT,
                OBSTACLE_WIDTH,
                OBSTACLE_HEIGHT,
            ),
            passed: false,
        });
    }

    fn player_rect(&self) -> Rect {
        Rect::new(PLAYER_X, self.player_y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    fn check_collision(&self) -> bool {
        let player = self.player_rect();
        self.obstacles.iter().any(|o| player.intersects(&o.rect))
    }
}

impl Default for EndlessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession for EndlessRunner {
    fn title(&self) -> &'static str {
        "Endless Runner"
    }

    fn reset(&mut self) {
        self.player_y = STANDING_Y;
        self.player_vy = 0.0;
        self.obstacles.clear();
        self.spawn_timer = 0.0;
        self.score = 0;
    }

    fn update(&mut self, dt: f32, input: &InputSnapshot) -> Step {
        if Self::wants_jump(input) && self.on_ground() {
            self.player_vy = JUMP_VELOCITY;
        }

        self.player_vy += GRAVITY * dt;
        self.player_y += self.player_vy * dt;
        if self.player_y > STANDING_Y {
            self.player_y = STANDING_Y;
            self.player_vy = 0.0;
        }

        self.spawn_timer += dt;
        if self.spawn_timer >= SPAWN_INTERVAL {
            self.spawn_timer = 0.0;
            self.spawn_obstacle();
        }

        for o in &mut self.obstacles {
            o.rect.x -= SCROLL_SPEED * dt;
            if !o.passed && o.rect.right() < PLAYER_X {
                o.passed = true;
                self.score += 1;
            }
        }
        self.obstacles.retain(|o| o.rect.right() > DESPAWN_X);

        if self.check_collision() {
            return Step::Over(Outcome::Lost { score: self.score });
        }
        Step::Continue
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(Color::Rgb(15, 23, 42));
        surface.fill_rect(
            Rect::new(0.0, GROUND_Y, WIDTH, HEIGHT - GROUND_Y),
            Color::Rgb(55, 65, 81),
        );
        surface.fill_rect(self.player_rect(), Color::Rgb(56, 189, 248));
        for o in &self.obstacles {
            surface.fill_rect(o.rect, Color::Rgb(248, 113, 113));
        }
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
