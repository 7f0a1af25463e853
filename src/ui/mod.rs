//! Buttons and the screens drawn around a game: menu, HUD and pause overlay.

use ratatui::style::Color;

use crate::event::{InputEvent, MouseButton};
use crate::games::Outcome;
use crate::geometry::{Point, Rect};
use crate::surface::{Align, Surface, HEIGHT, WIDTH};

pub const WHITE: Color = Color::Rgb(255, 255, 255);
const MENU_BG: Color = Color::Rgb(0, 0, 0);
const BUTTON_BG: Color = Color::Rgb(30, 64, 175);

#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    pub rect: Rect,
    pub label: &'static str,
    pub bg: Color,
    pub fg: Color,
}

impl Button {
    pub fn new(w: f32, h: f32, label: &'static str) -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, w, h),
            label,
            bg: BUTTON_BG,
            fg: WHITE,
        }
    }

    pub fn centered_at(mut self, center: Point) -> Self {
        self.rect.set_center(center);
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// True only for a primary-button press inside the rectangle.
    pub fn handle_event(&self, event: &InputEvent) -> bool {
        matches!(
            event,
            InputEvent::MouseDown { button: MouseButton::Left, pos } if self.rect.contains(*pos)
        )
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.fill_rect(self.rect, self.bg);
        surface.text(self.label, self.rect.center(), Align::Center, self.fg);
    }
}

/// Every button the shell shows, laid out on the 640x480 canvas.
#[derive(Clone, Debug)]
pub struct Buttons {
    pub play: Button,
    pub resume: Button,
    pub restart: Button,
    pub menu: Button,
    pub hud_pause: Button,
    pub hud_restart: Button,
    pub hud_menu: Button,
}

impl Buttons {
    pub fn layout() -> Self {
        let cx = WIDTH / 2.0;
        let cy = HEIGHT / 2.0;
        let hud_y = 19.0;
        Self {
            play: Button::new(180.0, 50.0, "Play").centered_at(Point::new(cx, cy)),
            resume: Button::new(200.0, 50.0, "Resume").centered_at(Point::new(cx, cy)),
            restart: Button::new(200.0, 50.0, "Restart").centered_at(Point::new(cx, cy + 60.0)),
            menu: Button::new(200.0, 50.0, "Main Menu").centered_at(Point::new(cx, cy + 120.0)),
            hud_pause: Button::new(72.0, 26.0, "Pause")
                .with_bg(Color::Rgb(59, 130, 246))
                .centered_at(Point::new(WIDTH - 206.0, hud_y)),
            hud_restart: Button::new(72.0, 26.0, "Restart")
                .with_bg(Color::Rgb(248, 113, 113))
                .centered_at(Point::new(WIDTH - 126.0, hud_y)),
            hud_menu: Button::new(72.0, 26.0, "Menu")
                .with_bg(Color::Rgb(30, 41, 59))
                .centered_at(Point::new(WIDTH - 46.0, hud_y)),
        }
    }
}

pub fn draw_menu(surface: &mut dyn Surface, title: &str, last: Option<Outcome>, play: &Button) {
    let cx = WIDTH / 2.0;
    let cy = HEIGHT / 2.0;
    surface.clear(MENU_BG);
    surface.text(title, Point::new(cx, cy - 80.0), Align::Center, WHITE);
    surface.text("Click Play to start", Point::new(cx, cy - 30.0), Align::Center, WHITE);
    play.draw(surface);
    if let Some(outcome) = last {
        surface.text(
            &format!("{} Score: {}", outcome.headline(), outcome.score()),
            Point::new(cx, cy + 60.0),
            Align::Center,
            Color::Rgb(248, 113, 113),
        );
    }
    surface.text(
        "Enter: play   Esc/P: pause   R: restart   M: menu   Q: quit",
        Point::new(cx, HEIGHT - 20.0),
        Align::Center,
        Color::Rgb(100, 116, 139),
    );
}

pub fn draw_hud(surface: &mut dyn Surface, buttons: &Buttons) {
    buttons.hud_pause.draw(surface);
    buttons.hud_restart.draw(surface);
    buttons.hud_menu.draw(surface);
}

/// Dim the last frame, then the buttons, then the title on top.
pub fn draw_pause_overlay(surface: &mut dyn Surface, buttons: &Buttons) {
    surface.dim();
    buttons.resume.draw(surface);
    buttons.restart.draw(surface);
    buttons.menu.draw(surface);
    surface.text("Paused", Point::new(WIDTH / 2.0, HEIGHT / 2.0 - 80.0), Align::Center, WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{DrawOp, Recorder};

    fn press(x: f32, y: f32) -> InputEvent {
        InputEvent::MouseDown {
            button: MouseButton::Left,
            pos: Point::new(x, y),
        }
    }

    #[test]
    fn test_hit_test_boundary_and_interior() {
        let b = Button::new(180.0, 50.0, "Play").centered_at(Point::new(320.0, 240.0));
        let r = b.rect;
        assert!(b.handle_event(&press(r.x, r.y)));
        assert!(b.handle_event(&press(r.right(), r.bottom())));
        assert!(b.handle_event(&press(r.x, r.bottom())));
        assert!(b.handle_event(&press(320.0, 240.0)));
    }

    #[test]
    fn test_hit_test_one_pixel_outside() {
        let b = Button::new(180.0, 50.0, "Play").centered_at(Point::new(320.0, 240.0));
        let r = b.rect;
        let mid = r.center();
        assert!(!b.handle_event(&press(r.x - 1.0, mid.y)));
        assert!(!b.handle_event(&press(r.right() + 1.0, mid.y)));
        assert!(!b.handle_event(&press(mid.x, r.y - 1.0)));
        assert!(!b.handle_event(&press(mid.x, r.bottom() + 1.0)));
    }

    #[test]
    fn test_only_primary_press_counts() {
        let b = Button::new(100.0, 100.0, "X").centered_at(Point::new(50.0, 50.0));
        let pos = Point::new(50.0, 50.0);
        assert!(!b.handle_event(&InputEvent::MouseDown { button: MouseButton::Right, pos }));
        assert!(!b.handle_event(&InputEvent::MouseUp { button: MouseButton::Left, pos }));
        assert!(!b.handle_event(&InputEvent::MouseMove { pos }));
    }

    #[test]
    fn test_pause_buttons_do_not_overlap() {
        let b = Buttons::layout();
        assert!(!b.resume.rect.intersects(&b.restart.rect));
        assert!(!b.restart.rect.intersects(&b.menu.rect));
        assert!(!b.hud_pause.rect.intersects(&b.hud_restart.rect));
        assert!(!b.hud_restart.rect.intersects(&b.hud_menu.rect));
        assert!(b.hud_menu.rect.right() <= WIDTH);
    }

    #[test]
    fn test_overlay_draw_order() {
        let buttons = Buttons::layout();
        let mut rec = Recorder::default();
        draw_pause_overlay(&mut rec, &buttons);

        let dim = rec.position(&DrawOp::Dim).unwrap();
        let resume = rec.position(&DrawOp::Rect(buttons.resume.rect)).unwrap();
        let menu = rec.position(&DrawOp::Rect(buttons.menu.rect)).unwrap();
        let title = rec.position(&DrawOp::Text("Paused".into())).unwrap();
        assert_eq!(dim, 0);
        assert!(dim < resume && resume < menu && menu < title);
    }

    #[test]
    fn test_menu_shows_last_outcome() {
        let buttons = Buttons::layout();
        let mut rec = Recorder::default();
        draw_menu(&mut rec, "Brick Breaker", Some(Outcome::Lost { score: 70 }), &buttons.play);
        let texts = rec.texts();
        assert!(texts.contains(&"Brick Breaker"));
        assert!(texts.contains(&"Play"));
        assert!(texts.contains(&"Game Over! Score: 70"));
    }
}
