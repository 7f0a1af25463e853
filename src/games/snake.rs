use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use ratatui::style::Color;

use crate::event::{InputEvent, InputSnapshot, Key};
use crate::games::{GameSession, Step};
use crate::geometry::{Point, Rect};
use crate::surface::{Align, Surface, HEIGHT, WIDTH};

const CELL_SIZE: f32 = 20.0;
const COLS: i32 = (WIDTH / CELL_SIZE) as i32;
const ROWS: i32 = (HEIGHT / CELL_SIZE) as i32;
const MOVE_INTERVAL: f32 = 0.12;

type Cell = (i32, i32);

const UP: Cell = (0, -1);
const DOWN: Cell = (0, 1);
const LEFT: Cell = (-1, 0);
const RIGHT: Cell = (1, 0);

const ARROWS: [Key; 4] = [Key::Up, Key::Down, Key::Left, Key::Right];

pub struct Snake {
    body: VecDeque<Cell>,
    /// Direction for the next move.
    direction: Cell,
    /// Direction of the last move; steering may not reverse onto it.
    heading: Cell,
    food: Option<Cell>,
    move_accum: f32,
    rng: StdRng,
}

impl Snake {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut s = Self {
            body: VecDeque::new(),
            direction: RIGHT,
            heading: RIGHT,
            food: None,
            move_accum: 0.0,
            rng,
        };
        s.reset();
        s
    }

    fn spawn_food(&mut self) {
        let free: Vec<Cell> = (0..ROWS)
            .flat_map(|y| (0..COLS).map(move |x| (x, y)))
            .filter(|c| !self.body.contains(c))
            .collect();
        self.food = free.choose(&mut self.rng).copied();
    }

    fn steer(&mut self, dir: Cell) {
        if dir != (-self.heading.0, -self.heading.1) {
            self.direction = dir;
        }
    }

    fn move_snake(&mut self, dt: f32) {
        self.move_accum += dt;
        if self.move_accum < MOVE_INTERVAL {
            return;
        }
        self.move_accum = 0.0;

        let Some(&(hx, hy)) = self.body.front() else { return };
        let (dx, dy) = self.direction;
        let new_head = ((hx + dx).rem_euclid(COLS), (hy + dy).rem_euclid(ROWS));
        self.heading = self.direction;

        if self.body.contains(&new_head) {
            self.reset();
            return;
        }

        self.body.push_front(new_head);
        if Some(new_head) == self.food {
            self.spawn_food();
        } else {
            self.body.pop_back();
        }
    }

    fn cell_rect((x, y): Cell) -> Rect {
        Rect::new(x as f32 * CELL_SIZE, y as f32 * CELL_SIZE, CELL_SIZE, CELL_SIZE)
    }
}

impl Default for Snake {
    fn default() -> Self {
        Self::new()
    }
}

fn key_direction(key: Key) -> Option<Cell> {
    match key {
        Key::Up => Some(UP),
        Key::Down => Some(DOWN),
        Key::Left => Some(LEFT),
        Key::Right => Some(RIGHT),
        _ => None,
    }
}

impl GameSession for Snake {
    fn title(&self) -> &'static str {
        "Snake"
    }

    fn reset(&mut self) {
        self.body.clear();
        self.body.push_back((COLS / 2, ROWS / 2));
        self.direction = RIGHT;
        self.heading = RIGHT;
        self.move_accum = 0.0;
        self.spawn_food();
    }

    fn update(&mut self, dt: f32, input: &InputSnapshot) -> Step {
        let mut steered = false;
        for event in input.events() {
            if let InputEvent::KeyDown(key) = event {
                if let Some(dir) = key_direction(*key) {
                    self.steer(dir);
                    steered = true;
                }
            }
        }
        // Fresh presses win over keys still inside their hold window.
        if !steered {
            if let Some(dir) = input.latest_held(&ARROWS).and_then(key_direction) {
                self.steer(dir);
            }
        }
        self.move_snake(dt);
        Step::Continue
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(Color::Rgb(0, 0, 0));
        if let Some(food) = self.food {
            surface.fill_rect(Self::cell_rect(food), Color::Rgb(220, 38, 38));
        }
        for (i, &cell) in self.body.iter().enumerate() {
            let color = if i == 0 {
                Color::Rgb(34, 197, 94)
            } else {
                Color::Rgb(22, 163, 74)
            };
            surface.fill_rect(Self::cell_rect(cell), color);
        }
        surface.text(
            &format!("Score: {}", self.score()),
            Point::new(10.0, 10.0),
            Align::Left,
            Color::Rgb(255, 255, 255),
        );
    }

    fn score(&self) -> u32 {
        self.body.len().saturating_sub(1) as u32
    }
}
