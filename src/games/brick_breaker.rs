use ratatui::style::Color;

use crate::event::{InputEvent, InputSnapshot, Key, MouseButton};
use crate::games::{GameSession, Outcome, Step};
use crate::geometry::{Point, Rect};
use crate::surface::{Align, Surface, HEIGHT, WIDTH};

const PADDLE_WIDTH: f32 = 100.0;
const PADDLE_HEIGHT: f32 = 14.0;
const PADDLE_BOTTOM: f32 = HEIGHT - 20.0;
const PADDLE_KEY_SPEED: f32 = 420.0;
const BALL_RADIUS: f32 = 8.0;

const BRICK_ROWS: usize = 5;
const BRICK_COLS: usize = 10;
const BRICK_WIDTH: f32 = WIDTH / BRICK_COLS as f32;
const BRICK_HEIGHT: f32 = 22.0;
const BRICK_GUTTER: f32 = 3.0;
const BRICK_TOP: f32 = 50.0;
const BRICK_POINTS: u32 = 10;

const BALL_SPEED_INITIAL: f32 = 260.0;
const BALL_SPEED_INCREMENT: f32 = 20.0;

pub struct BrickBreaker {
    paddle_x: f32,
    ball_x: f32,
    ball_y: f32,
    ball_dx: f32,
    ball_dy: f32,
    ball_speed: f32,
    bricks: Vec<Rect>,
    score: u32,
    dragging: bool,
    drag_offset_x: f32,
}

impl BrickBreaker {
    pub fn new() -> Self {
        let mut b = Self {
            paddle_x: 0.0,
            ball_x: 0.0,
            ball_y: 0.0,
            ball_dx: 0.0,
            ball_dy: 0.0,
            ball_speed: 0.0,
            bricks: Vec::new(),
            score: 0,
            dragging: false,
            drag_offset_x: 0.0,
        };
        b.reset();
        b
    }

    fn init_bricks(&mut self) {
        self.bricks.clear();
        for row in 0..BRICK_ROWS {
            for col in 0..BRICK_COLS {
                self.bricks.push(Rect::new(
                    col as f32 * BRICK_WIDTH,
                    row as f32 * BRICK_HEIGHT + BRICK_TOP,
                    BRICK_WIDTH - BRICK_GUTTER,
                    BRICK_HEIGHT - BRICK_GUTTER,
                ));
            }
        }
    }

    fn paddle_rect(&self) -> Rect {
        Rect::new(
            self.paddle_x - PADDLE_WIDTH / 2.0,
            PADDLE_BOTTOM - PADDLE_HEIGHT,
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
        )
    }

    fn ball_rect(&self) -> Rect {
        Rect::from_center(
            Point::new(self.ball_x, self.ball_y),
            BALL_RADIUS * 2.0,
            BALL_RADIUS * 2.0,
        )
    }

    fn handle_paddle_input(&mut self, dt: f32, input: &InputSnapshot) {
        for event in input.events() {
            match *event {
                InputEvent::MouseDown { button: MouseButton::Left, pos } => {
                    if self.paddle_rect().contains(pos) {
                        self.dragging = true;
                        self.drag_offset_x = self.paddle_x - pos.x;
                    }
                }
                InputEvent::MouseUp { button: MouseButton::Left, .. } => {
                    self.dragging = false;
                }
                InputEvent::MouseMove { pos } if self.dragging => {
                    self.paddle_x = pos.x + self.drag_offset_x;
                }
                _ => {}
            }
        }
        if input.is_held(Key::Left) {
            self.paddle_x -= PADDLE_KEY_SPEED * dt;
        }
        if input.is_held(Key::Right) {
            self.paddle_x += PADDLE_KEY_SPEED * dt;
        }
        self.paddle_x = self
            .paddle_x
            .clamp(PADDLE_WIDTH / 2.0, WIDTH - PADDLE_WIDTH / 2.0);
    }

    fn move_ball(&mut self, dt: f32) -> Step {
        self.ball_x += self.ball_dx * dt;
        self.ball_y += self.ball_dy * dt;

        // Wall collisions
        if self.ball_x - BALL_RADIUS < 0.0 {
            self.ball_dx = self.ball_dx.abs();
        }
        if self.ball_x + BALL_RADIUS > WIDTH {
            self.ball_dx = -self.ball_dx.abs();
        }
        if self.ball_y - BALL_RADIUS < 0.0 {
            self.ball_dy = self.ball_dy.abs();
        }

        // Paddle collision
        let paddle = self.paddle_rect();
        if self.ball_dy > 0.0 {
            if self.ball_rect().intersects(&paddle) {
                self.ball_speed += BALL_SPEED_INCREMENT;
                self.ball_dy = -self.ball_speed;
                let offset = (self.ball_x - self.paddle_x) / (PADDLE_WIDTH / 2.0);
                self.ball_dx = self.ball_speed * offset;
            } else if self.ball_y + BALL_RADIUS >= paddle.bottom() {
                return Step::Over(Outcome::Lost { score: self.score });
            }
        }

        // Brick collisions
        let ball = self.ball_rect();
        if let Some(idx) = self.bricks.iter().position(|b| b.intersects(&ball)) {
            self.bricks.remove(idx);
            self.score += BRICK_POINTS;
            self.ball_speed += BALL_SPEED_INCREMENT;
            self.ball_dy = -self.ball_dy;
            let norm = self.ball_dx.hypot(self.ball_dy);
            if norm > 0.0 {
                self.ball_dx = self.ball_dx / norm * self.ball_speed;
                self.ball_dy = self.ball_dy / norm * self.ball_speed;
            }
            if self.bricks.is_empty() {
                return Step::Over(Outcome::Cleared { score: self.score });
            }
        }

        if self.ball_y - BALL_RADIUS > HEIGHT {
            return Step::Over(Outcome::Lost { score: self.score });
        }
        Step::Continue
    }
}

impl Default for BrickBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession for BrickBreaker {
    fn title(&self) -> &'static str {
        "Brick Breaker"
    }

    fn reset(&mut self) {
        self.paddle_x = WIDTH / 2.0;
        self.ball_x = WIDTH / 2.0;
        self.ball_y = HEIGHT / 2.0;
        self.ball_speed = BALL_SPEED_INITIAL;
        self.ball_dx = self.ball_speed;
        self.ball_dy = -self.ball_speed;
        self.score = 0;
        self.dragging = false;
        self.drag_offset_x = 0.0;
        self.init_bricks();
    }

    fn update(&mut self, dt: f32, input: &InputSnapshot) -> Step {
        self.handle_paddle_input(dt, input);
        self.move_ball(dt)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(Color::Rgb(15, 23, 42));
        surface.fill_rect(self.paddle_rect(), Color::Rgb(59, 130, 246));
        surface.fill_circle(
            Point::new(self.ball_x, self.ball_y),
            BALL_RADIUS,
            Color::Rgb(248, 250, 252),
        );
        for brick in &self.bricks {
            surface.fill_rect(*brick, Color::Rgb(248, 113, 113));
        }
        surface.text(
            &format!("Score: {}  Bricks: {}", self.score, self.bricks.len()),
            Point::new(10.0, 10.0),
            Align::Left,
            Color::Rgb(255, 255, 255),
        );
    }

    fn score(&self) -> u32 {
        self.score
    }
}
