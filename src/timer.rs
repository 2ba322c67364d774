use std::time::Instant;

/// The deferred-timer lines a session uses. Countdown runs alone; Game and
/// Light run together while a round is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerLine {
    Countdown,
    Game,
    Light,
}

const POLL_ORDER: [TimerLine; 3] = [TimerLine::Countdown, TimerLine::Game, TimerLine::Light];

/// Deadline registry for the session's timer lines. Arming and cancelling
/// are explicit; `fire_due` pops every elapsed deadline in a fixed order
/// (Countdown, Game, Light) so tick handling stays deterministic. Each fired
/// line returns its deadline so periodic lines can re-arm without drift.
#[derive(Debug, Clone, Default)]
pub struct Timers {
    countdown: Option<Instant>,
    game: Option<Instant>,
    light: Option<Instant>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, line: TimerLine, at: Instant) {
        *self.slot_mut(line) = Some(at);
    }

    pub fn cancel(&mut self, line: TimerLine) {
        *self.slot_mut(line) = None;
    }

    pub fn cancel_all(&mut self) {
        self.countdown = None;
        self.game = None;
        self.light = None;
    }

    pub fn is_armed(&self, line: TimerLine) -> bool {
        self.slot(line).is_some()
    }

    /// Pops every deadline at or before `now`, in poll order.
    pub fn fire_due(&mut self, now: Instant) -> Vec<(TimerLine, Instant)> {
        let mut fired = Vec::new();
        for line in POLL_ORDER {
            let slot = self.slot_mut(line);
            if let Some(at) = *slot {
                if at <= now {
                    *slot = None;
                    fired.push((line, at));
                }
            }
        }
        fired
    }

    fn slot(&self, line: TimerLine) -> &Option<Instant> {
        match line {
            TimerLine::Countdown => &self.countdown,
            TimerLine::Game => &self.game,
            TimerLine::Light => &self.light,
        }
    }

    fn slot_mut(&mut self, line: TimerLine) -> &mut Option<Instant> {
        match line {
            TimerLine::Countdown => &mut self.countdown,
            TimerLine::Game => &mut self.game,
            TimerLine::Light => &mut self.light,
        }
    }
}
