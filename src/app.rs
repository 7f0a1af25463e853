use tracing::{debug, info};

use crate::event::{InputEvent, InputSnapshot, Key};
use crate::games::{GameSession, Outcome, Step};
use crate::surface::Surface;
use crate::ui::{self, Buttons};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Playing,
    Paused,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

enum Routed {
    Consumed,
    Unhandled,
    Quit,
}

/// Menu / playing / paused state machine around one game session.
pub struct App {
    state: AppState,
    session: Box<dyn GameSession>,
    last_outcome: Option<Outcome>,
    buttons: Buttons,
}

impl App {
    pub fn new(mut session: Box<dyn GameSession>) -> Self {
        session.init();
        Self {
            state: AppState::Menu,
            session,
            last_outcome: None,
            buttons: Buttons::layout(),
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn session(&self) -> &dyn GameSession {
        self.session.as_ref()
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Route the whole event queue, then simulate if still playing.
    pub fn step(&mut self, dt: f32, input: &InputSnapshot) -> Flow {
        let mut forwarded = Vec::new();
        for event in input.events() {
            let was_playing = self.state == AppState::Playing;
            match self.route(event) {
                Routed::Quit => return Flow::Quit,
                Routed::Consumed => {}
                Routed::Unhandled => {
                    if was_playing {
                        forwarded.push(*event);
                    }
                }
            }
        }

        if self.state == AppState::Playing {
            let game_input = input.with_events(forwarded);
            if let Step::Over(outcome) = self.session.update(dt, &game_input) {
                info!(
                    game = self.session.title(),
                    score = outcome.score(),
                    "{}",
                    outcome.headline()
                );
                self.last_outcome = Some(outcome);
                self.transition(AppState::Menu);
            }
        }
        Flow::Continue
    }

    fn route(&mut self, event: &InputEvent) -> Routed {
        if *event == InputEvent::Quit {
            return Routed::Quit;
        }
        match self.state {
            AppState::Menu => {
                if *event == InputEvent::KeyDown(Key::Char('q')) {
                    return Routed::Quit;
                }
                let confirm = self.buttons.play.handle_event(event)
                    || matches!(event, InputEvent::KeyDown(Key::Enter | Key::Space));
                if confirm {
                    self.start_over();
                    return Routed::Consumed;
                }
                Routed::Unhandled
            }
            AppState::Playing => {
                let b = &self.buttons;
                if b.hud_pause.handle_event(event)
                    || matches!(event, InputEvent::KeyDown(Key::Escape | Key::Char('p')))
                {
                    self.transition(AppState::Paused);
                } else if b.hud_restart.handle_event(event)
                    || *event == InputEvent::KeyDown(Key::Char('r'))
                {
                    self.start_over();
                } else if b.hud_menu.handle_event(event)
                    || *event == InputEvent::KeyDown(Key::Char('m'))
                {
                    self.transition(AppState::Menu);
                } else {
                    return Routed::Unhandled;
                }
                Routed::Consumed
            }
            AppState::Paused => {
                let b = &self.buttons;
                if b.resume.handle_event(event)
                    || matches!(
                        event,
                        InputEvent::KeyDown(Key::Escape | Key::Char('p') | Key::Enter)
                    )
                {
                    self.transition(AppState::Playing);
                } else if b.restart.handle_event(event)
                    || *event == InputEvent::KeyDown(Key::Char('r'))
                {
                    self.start_over();
                } else if b.menu.handle_event(event)
                    || *event == InputEvent::KeyDown(Key::Char('m'))
                {
                    self.transition(AppState::Menu);
                } else {
                    return Routed::Unhandled;
                }
                Routed::Consumed
            }
        }
    }

    fn start_over(&mut self) {
        self.session.reset();
        self.last_outcome = None;
        self.transition(AppState::Playing);
    }

    fn transition(&mut self, to: AppState) {
        if self.state != to {
            debug!(from = ?self.state, to = ?to, "state change");
            self.state = to;
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        match self.state {
            AppState::Menu => ui::draw_menu(
                surface,
                self.session.title(),
                self.last_outcome,
                &self.buttons.play,
            ),
            AppState::Playing => {
                self.session.draw(surface);
                ui::draw_hud(surface, &self.buttons);
            }
            AppState::Paused => {
                self.session.draw(surface);
                ui::draw_pause_overlay(surface, &self.buttons);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::event::MouseButton;
    use crate::geometry::Point;
    use crate::surface::testing::{DrawOp, Recorder};

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Init,
        Reset,
        Update(f32, Vec<InputEvent>),
        Draw,
    }

    /// Session double that logs every call and can be told to end the game.
    pub struct Spy {
        pub calls: Rc<RefCell<Vec<Call>>>,
        pub ticks: u32,
        pub end_after: Option<u32>,
    }

    impl Spy {
        pub fn new() -> (Self, Rc<RefCell<Vec<Call>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    ticks: 0,
                    end_after: None,
                },
                calls,
            )
        }
    }

    impl GameSession for Spy {
        fn title(&self) -> &'static str {
            "Spy"
        }

        fn init(&mut self) {
            self.calls.borrow_mut().push(Call::Init);
        }

        fn reset(&mut self) {
            self.ticks = 0;
            self.calls.borrow_mut().push(Call::Reset);
        }

        fn update(&mut self, dt: f32, input: &InputSnapshot) -> Step {
            self.ticks += 1;
            self.calls
                .borrow_mut()
                .push(Call::Update(dt, input.events().to_vec()));
            match self.end_after {
                Some(n) if self.ticks >= n => Step::Over(Outcome::Lost { score: self.ticks }),
                _ => Step::Continue,
            }
        }

        fn draw(&self, _surface: &mut dyn Surface) {
            self.calls.borrow_mut().push(Call::Draw);
        }

        fn score(&self) -> u32 {
            self.ticks
        }
    }

    fn key(k: Key) -> InputSnapshot {
        InputSnapshot::from_events(vec![InputEvent::KeyDown(k)])
    }

    fn click(p: Point) -> InputEvent {
        InputEvent::MouseDown {
            button: MouseButton::Left,
            pos: p,
        }
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    fn updates(calls: &Rc<RefCell<Vec<Call>>>) -> usize {
        calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Update(..)))
            .count()
    }

    #[test]
    fn test_starts_in_menu_after_init() {
        let (spy, calls) = Spy::new();
        let app = App::new(Box::new(spy));
        assert_eq!(app.state(), AppState::Menu);
        assert_eq!(*calls.borrow(), vec![Call::Init]);
    }

    #[test]
    fn test_menu_ignores_everything_but_confirm() {
        let (spy, calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        let noise = InputSnapshot::from_events(vec![
            InputEvent::KeyDown(Key::Char('p')),
            InputEvent::KeyDown(Key::Char('r')),
            InputEvent::KeyDown(Key::Escape),
            InputEvent::MouseMove { pos: Point::new(320.0, 240.0) },
            click(Point::new(5.0, 5.0)),
        ]);
        for _ in 0..5 {
            assert_eq!(app.step(0.016, &noise), Flow::Continue);
        }
        assert_eq!(app.state(), AppState::Menu);
        assert_eq!(*calls.borrow(), vec![Call::Init]);
    }

    #[test]
    fn test_confirm_resets_once_before_first_update() {
        let (spy, calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        let play = app.buttons.play.rect.center();
        app.step(0.016, &InputSnapshot::from_events(vec![click(play)]));
        assert_eq!(app.state(), AppState::Playing);
        app.step(0.016, &idle());

        let log = calls.borrow();
        assert_eq!(log[0], Call::Init);
        assert_eq!(log[1], Call::Reset);
        // The confirming click is consumed, not forwarded to the game.
        assert_eq!(log[2], Call::Update(0.016, vec![]));
        assert_eq!(log.iter().filter(|c| **c == Call::Reset).count(), 1);
    }

    #[test]
    fn test_enter_also_confirms() {
        let (spy, _calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        assert_eq!(app.state(), AppState::Playing);
    }

    #[test]
    fn test_paused_never_updates() {
        let (spy, calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        app.step(0.016, &idle());
        app.step(0.016, &key(Key::Escape));
        assert_eq!(app.state(), AppState::Paused);
        let before = updates(&calls);
        let score = app.session().score();

        let mut rec = Recorder::default();
        let game_keys = InputSnapshot::from_events(vec![
            InputEvent::KeyDown(Key::Space),
            InputEvent::KeyDown(Key::Left),
        ])
        .hold(Key::Right);
        for _ in 0..30 {
            app.step(0.016, &game_keys);
            app.draw(&mut rec);
        }
        assert_eq!(updates(&calls), before);
        assert_eq!(app.session().score(), score);
        // Paused still renders the frozen game beneath the overlay.
        assert!(calls.borrow().iter().any(|c| *c == Call::Draw));
        assert!(rec.ops.contains(&DrawOp::Dim));
    }

    #[test]
    fn test_resume_and_restart_from_pause() {
        let (spy, calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        app.step(0.016, &key(Key::Char('p')));
        assert_eq!(app.state(), AppState::Paused);

        let resume = app.buttons.resume.rect.center();
        app.step(0.016, &InputSnapshot::from_events(vec![click(resume)]));
        assert_eq!(app.state(), AppState::Playing);
        let resets = || calls.borrow().iter().filter(|c| **c == Call::Reset).count();
        assert_eq!(resets(), 1);

        app.step(0.016, &key(Key::Escape));
        let restart = app.buttons.restart.rect.center();
        app.step(0.016, &InputSnapshot::from_events(vec![click(restart)]));
        assert_eq!(app.state(), AppState::Playing);
        assert_eq!(resets(), 2);
    }

    #[test]
    fn test_pause_menu_returns_to_menu_without_reset() {
        let (spy, calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        app.step(0.016, &key(Key::Escape));
        let menu = app.buttons.menu.rect.center();
        app.step(0.016, &InputSnapshot::from_events(vec![click(menu)]));
        assert_eq!(app.state(), AppState::Menu);
        assert_eq!(calls.borrow().iter().filter(|c| **c == Call::Reset).count(), 1);

        // Next entry resets again.
        app.step(0.016, &key(Key::Enter));
        assert_eq!(calls.borrow().iter().filter(|c| **c == Call::Reset).count(), 2);
    }

    #[test]
    fn test_game_over_returns_to_menu_with_outcome() {
        let (mut spy, calls) = Spy::new();
        spy.end_after = Some(3);
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        app.step(0.016, &idle());
        app.step(0.016, &idle());
        assert_eq!(app.state(), AppState::Menu);
        assert_eq!(app.last_outcome(), Some(Outcome::Lost { score: 3 }));

        // Menu frames freeze the session.
        let before = updates(&calls);
        app.step(0.016, &idle());
        assert_eq!(updates(&calls), before);

        let mut rec = Recorder::default();
        app.draw(&mut rec);
        assert!(rec.texts().contains(&"Game Over! Score: 3"));
    }

    #[test]
    fn test_whole_queue_is_processed_in_order() {
        let (spy, calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        let input = InputSnapshot::from_events(vec![
            InputEvent::KeyDown(Key::Enter),
            InputEvent::KeyDown(Key::Left),
            InputEvent::KeyDown(Key::Up),
        ]);
        app.step(0.016, &input);
        let log = calls.borrow();
        assert_eq!(
            log.last(),
            Some(&Call::Update(
                0.016,
                vec![InputEvent::KeyDown(Key::Left), InputEvent::KeyDown(Key::Up)]
            ))
        );
    }

    #[test]
    fn test_pause_mid_queue_freezes_this_frame() {
        let (spy, calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        let before = updates(&calls);
        let input = InputSnapshot::from_events(vec![
            InputEvent::KeyDown(Key::Left),
            InputEvent::KeyDown(Key::Escape),
        ]);
        app.step(0.016, &input);
        assert_eq!(app.state(), AppState::Paused);
        assert_eq!(updates(&calls), before);
    }

    #[test]
    fn test_quit_from_any_state() {
        for setup in [vec![], vec![Key::Enter], vec![Key::Enter, Key::Escape]] {
            let (spy, _calls) = Spy::new();
            let mut app = App::new(Box::new(spy));
            for k in setup {
                app.step(0.016, &key(k));
            }
            let quit = InputSnapshot::from_events(vec![InputEvent::Quit]);
            assert_eq!(app.step(0.016, &quit), Flow::Quit);
        }
    }

    #[test]
    fn test_q_quits_only_from_menu() {
        let (spy, _calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        assert_eq!(app.step(0.016, &key(Key::Char('q'))), Flow::Continue);
        app.step(0.016, &key(Key::Char('m')));
        assert_eq!(app.state(), AppState::Menu);
        assert_eq!(app.step(0.016, &key(Key::Char('q'))), Flow::Quit);
    }

    #[test]
    fn test_restart_while_playing() {
        let resets = |calls: &Rc<RefCell<Vec<Call>>>| {
            calls.borrow().iter().filter(|c| **c == Call::Reset).count()
        };
        let (spy, calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        assert_eq!(resets(&calls), 1);

        app.step(0.016, &key(Key::Char('r')));
        assert_eq!(app.state(), AppState::Playing);
        assert_eq!(resets(&calls), 2);

        let hud_restart = app.buttons.hud_restart.rect.center();
        app.step(0.016, &InputSnapshot::from_events(vec![click(hud_restart)]));
        assert_eq!(app.state(), AppState::Playing);
        assert_eq!(resets(&calls), 3);
        // The click restarted the game and was not passed on to it.
        assert_eq!(calls.borrow().last(), Some(&Call::Update(0.016, vec![])));
    }

    #[test]
    fn test_menu_while_playing() {
        let (spy, calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        app.step(0.016, &key(Key::Char('m')));
        assert_eq!(app.state(), AppState::Menu);

        app.step(0.016, &key(Key::Enter));
        let before = updates(&calls);
        let hud_menu = app.buttons.hud_menu.rect.center();
        app.step(0.016, &InputSnapshot::from_events(vec![click(hud_menu)]));
        assert_eq!(app.state(), AppState::Menu);
        assert_eq!(updates(&calls), before);
        // Only the two confirms reset; leaving for the menu does not.
        assert_eq!(calls.borrow().iter().filter(|c| **c == Call::Reset).count(), 2);
    }

    #[test]
    fn test_hud_pause_button() {
        let (spy, _calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        let hud_pause = app.buttons.hud_pause.rect.center();
        app.step(0.016, &InputSnapshot::from_events(vec![click(hud_pause)]));
        assert_eq!(app.state(), AppState::Paused);
    }

    #[test]
    fn test_hud_drawn_while_playing() {
        let (spy, _calls) = Spy::new();
        let mut app = App::new(Box::new(spy));
        app.step(0.016, &key(Key::Enter));
        let mut rec = Recorder::default();
        app.draw(&mut rec);
        let texts = rec.texts();
        assert!(texts.contains(&"Pause"));
        assert!(texts.contains(&"Menu"));
        assert!(!rec.ops.contains(&DrawOp::Dim));
    }
}
