//! The password puzzle that ties the prop together.
//!
//! Each call to [`PasswordGame::step`] is one iteration of the prop's main
//! loop:
//!
//! 1. Poll the trigger button.
//! 2. Show the prompt on row 0.
//! 3. Scan the keypad once.
//! 4. If the button was pressed, flash the Morse hint on the signal LED.
//! 5. If a key came in, append it and show the entry on row 1. Once the
//!    entry is as long as the secret, judge it, pause, and start over.
//! 6. Wait the poll interval.
//!
//! A failed display write does not cut a step short. The step finishes,
//! judging and resetting the entry as usual, and then reports the first
//! display error. [`PasswordGame::run`] logs those and keeps polling.
//!
//! # Example
//!
//! ```rust
//! use escape_prop::config::{DisplayConfig, GameConfig};
//! use escape_prop::game::{PasswordGame, PropIo};
//! use escape_prop::hal::{MockClock, MockDelay, MockI2c, MockPin, ScriptedKeys};
//! use escape_prop::button::PushButton;
//! use escape_prop::indicator::Indicator;
//! use escape_prop::lcd::Lcd;
//! use escape_prop::morse::SignalEncoder;
//!
//! let clock = MockClock::new();
//! let delay = MockDelay::with_clock(clock.clone());
//! let bus = MockI2c::new();
//! let mut lcd = Lcd::new(bus.clone(), delay.clone(), &DisplayConfig::default());
//! lcd.init().unwrap();
//!
//! let io = PropIo {
//!     display: lcd,
//!     keypad: ScriptedKeys::from_keys("B947D"),
//!     button: PushButton::active_high(MockPin::new()),
//!     success: Indicator::new(MockPin::new(), "success").unwrap(),
//!     signal: Indicator::new(MockPin::new(), "signal").unwrap(),
//!     error: Indicator::new(MockPin::new(), "error").unwrap(),
//!     encoder: SignalEncoder::new(delay.clone()),
//!     delay,
//! };
//! let mut game = PasswordGame::new(io, GameConfig::default());
//!
//! game.run().unwrap();
//! assert!(game.is_solved());
//! assert_eq!(bus.screen().row_text(0, 9), "Reussite!");
//! ```

use crate::config::{GameConfig, ShortString};
use crate::error::GameError;
use crate::indicator::Indicator;
use crate::morse::SignalEncoder;
use crate::traits::{CharacterDisplay, KeySource, TriggerButton};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

// ============================================================================
// Code Entry
// ============================================================================

/// Keys typed since the last verdict.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeEntry {
    keys: ShortString,
}

impl CodeEntry {
    /// Creates an empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key`. Returns false if the buffer is full.
    pub fn push(&mut self, key: char) -> bool {
        self.keys.push(key).is_ok()
    }

    /// Keys typed so far.
    pub fn as_str(&self) -> &str {
        self.keys.as_str()
    }

    /// Number of keys typed.
    pub fn len(&self) -> usize {
        self.keys.chars().count()
    }

    /// True if nothing has been typed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True once at least `code_len` keys are in.
    pub fn is_complete(&self, code_len: usize) -> bool {
        self.len() >= code_len
    }

    /// Forgets every key.
    pub fn reset(&mut self) {
        self.keys.clear();
    }
}

// ============================================================================
// Game
// ============================================================================

/// Everything the game drives, already initialised.
///
/// The display must have had its init sequence run. `encoder` and `delay`
/// are separate so each can own its delay source.
pub struct PropIo<Disp, K, B, L, SD, D> {
    /// Two-row character display.
    pub display: Disp,
    /// Key source polled once per step.
    pub keypad: K,
    /// Button that requests the Morse hint.
    pub button: B,
    /// Lit when the code is solved.
    pub success: Indicator<L>,
    /// Carries the Morse hint.
    pub signal: Indicator<L>,
    /// Lit while a wrong code is shown.
    pub error: Indicator<L>,
    /// Morse player for the signal LED.
    pub encoder: SignalEncoder<SD>,
    /// Pacing between steps and verdict stages.
    pub delay: D,
}

/// Outcome of one [`PasswordGame::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// No key this step.
    Waiting,
    /// A key was added; the entry is not complete yet.
    KeyEntered(char),
    /// A complete entry was wrong; a new attempt has started.
    Rejected,
    /// The secret was entered.
    Solved,
}

/// Error type of [`PasswordGame::step`].
pub type StepError<Disp, L> =
    GameError<<Disp as CharacterDisplay>::Error, <L as ErrorType>::Error>;

/// Password puzzle state machine.
pub struct PasswordGame<Disp, K, B, L, SD, D> {
    io: PropIo<Disp, K, B, L, SD, D>,
    config: GameConfig,
    entry: CodeEntry,
    solved: bool,
}

impl<Disp, K, B, L, SD, D> PasswordGame<Disp, K, B, L, SD, D>
where
    Disp: CharacterDisplay,
    K: KeySource,
    B: TriggerButton,
    L: OutputPin,
    SD: DelayNs,
    D: DelayNs,
{
    /// Creates a game that has not been solved yet.
    pub fn new(io: PropIo<Disp, K, B, L, SD, D>, config: GameConfig) -> Self {
        Self {
            io,
            config,
            entry: CodeEntry::new(),
            solved: false,
        }
    }

    /// Runs steps until the code is solved.
    ///
    /// Display errors are logged and the loop carries on; the next step
    /// redraws the prompt. Indicator errors end the run.
    pub fn run(&mut self) -> Result<(), StepError<Disp, L>> {
        log::info!("Game started, {} key code", self.config.code_len());
        loop {
            match self.step() {
                Ok(GameStatus::Solved) => return Ok(()),
                Ok(_) => {}
                Err(GameError::Display(e)) => {
                    log::warn!("Display write dropped: {:?}", e);
                    if self.solved {
                        return Ok(());
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs one iteration of the main loop.
    ///
    /// A display error is held until the step is over, so a complete entry
    /// is still judged and reset. Check [`is_solved`](Self::is_solved) and
    /// [`entry`](Self::entry) for the state it left behind.
    ///
    /// Once solved, further calls do nothing and return
    /// [`GameStatus::Solved`].
    pub fn step(&mut self) -> Result<GameStatus, StepError<Disp, L>> {
        if self.solved {
            return Ok(GameStatus::Solved);
        }

        let mut fault = None;
        let hint_requested = self.io.button.is_pressed();

        hold(&mut fault, show(&mut self.io.display, 0, &self.config.prompt));
        let key = self.io.keypad.scan();

        if hint_requested {
            self.io
                .encoder
                .play(&mut self.io.signal, self.config.morse_hint.as_str())
                .map_err(Self::indicator_failed)?;
        }

        let mut status = GameStatus::Waiting;
        if let Some(key) = key {
            status = self.enter(key, &mut fault)?;
        }

        self.io.delay.delay_ms(self.config.poll_interval_ms);
        match fault {
            Some(e) => Err(GameError::Display(e)),
            None => Ok(status),
        }
    }

    fn enter(
        &mut self,
        key: char,
        fault: &mut Option<Disp::Error>,
    ) -> Result<GameStatus, StepError<Disp, L>> {
        if !self.entry.push(key) {
            log::warn!("Code entry full, dropping '{}'", key);
        }
        log::debug!("Entry now {:?}", self.entry.as_str());

        hold(fault, self.io.display.clear());
        hold(fault, show(&mut self.io.display, 1, &self.entry.keys));

        if !self.entry.is_complete(self.config.code_len()) {
            return Ok(GameStatus::KeyEntered(key));
        }

        let status = if self.entry.as_str() == self.config.secret_code.as_str() {
            self.accept(fault)?
        } else {
            self.reject(fault)?
        };

        self.io.delay.delay_ms(self.config.retry_delay_ms);
        self.entry.reset();
        Ok(status)
    }

    fn accept(&mut self, fault: &mut Option<Disp::Error>) -> Result<GameStatus, StepError<Disp, L>> {
        log::info!("Code accepted");
        self.solved = true;
        self.io.success.on().map_err(Self::indicator_failed)?;
        self.io.delay.delay_ms(self.config.verdict_delay_ms);

        hold(fault, show(&mut self.io.display, 0, &self.config.success_line1));
        hold(fault, show(&mut self.io.display, 1, &self.config.success_line2));
        self.io.delay.delay_ms(self.config.verdict_delay_ms);

        Ok(GameStatus::Solved)
    }

    fn reject(&mut self, fault: &mut Option<Disp::Error>) -> Result<GameStatus, StepError<Disp, L>> {
        log::info!("Code {:?} rejected", self.entry.as_str());
        self.io.error.on().map_err(Self::indicator_failed)?;
        self.io.delay.delay_ms(self.config.verdict_delay_ms);

        hold(fault, show(&mut self.io.display, 0, &self.config.failure_message));
        self.io.delay.delay_ms(self.config.failure_hold_ms);

        self.io.error.off().map_err(Self::indicator_failed)?;
        hold(fault, self.io.display.clear());
        Ok(GameStatus::Rejected)
    }

    fn indicator_failed(e: L::Error) -> StepError<Disp, L> {
        GameError::Indicator(e)
    }

    /// True once the secret has been entered.
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Keys typed in the current attempt.
    pub fn entry(&self) -> &CodeEntry {
        &self.entry
    }

    /// Active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Shared access to the peripherals.
    pub fn io(&self) -> &PropIo<Disp, K, B, L, SD, D> {
        &self.io
    }

    /// Gives back the peripherals.
    pub fn release(self) -> PropIo<Disp, K, B, L, SD, D> {
        self.io
    }
}

/// Keeps the first error of a step.
fn hold<E>(fault: &mut Option<E>, result: Result<(), E>) {
    if let Err(e) = result {
        if fault.is_none() {
            *fault = Some(e);
        }
    }
}

/// Writes `text` at the start of `row`.
fn show<Disp: CharacterDisplay>(display: &mut Disp, row: u8, text: &str) -> Result<(), Disp::Error> {
    display.set_cursor(row, 0)?;
    display.print(text)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::PushButton;
    use crate::hal::{MockClock, MockDelay, MockPin, ScriptedKeys};
    use alloc::string::String;
    use alloc::vec::Vec;

    /// Records what was printed where.
    #[derive(Default)]
    struct TextLog {
        ops: Vec<String>,
        fail: bool,
    }

    impl CharacterDisplay for TextLog {
        type Error = &'static str;

        fn clear(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err("nack");
            }
            self.ops.push(String::from("clear"));
            Ok(())
        }

        fn set_cursor(&mut self, row: u8, column: u8) -> Result<(), Self::Error> {
            if self.fail {
                return Err("nack");
            }
            self.ops.push(alloc::format!("at {},{}", row, column));
            Ok(())
        }

        fn print(&mut self, text: &str) -> Result<(), Self::Error> {
            if self.fail {
                return Err("nack");
            }
            self.ops.push(String::from(text));
            Ok(())
        }
    }

    type TestGame = PasswordGame<
        TextLog,
        ScriptedKeys,
        PushButton<MockPin>,
        MockPin,
        MockDelay,
        MockDelay,
    >;

    struct Rig {
        clock: MockClock,
        button: MockPin,
        success: MockPin,
        signal: MockPin,
        error: MockPin,
    }

    fn game(keys: &str) -> (TestGame, Rig) {
        let clock = MockClock::new();
        let rig = Rig {
            button: MockPin::new(),
            success: MockPin::new().with_clock(clock.clone()),
            signal: MockPin::new().with_clock(clock.clone()),
            error: MockPin::new().with_clock(clock.clone()),
            clock,
        };
        let io = PropIo {
            display: TextLog::default(),
            keypad: ScriptedKeys::from_keys(keys),
            button: PushButton::active_high(rig.button.clone()),
            success: Indicator::new(rig.success.clone(), "success").unwrap(),
            signal: Indicator::new(rig.signal.clone(), "signal").unwrap(),
            error: Indicator::new(rig.error.clone(), "error").unwrap(),
            encoder: SignalEncoder::new(MockDelay::with_clock(rig.clock.clone())),
            delay: MockDelay::with_clock(rig.clock.clone()),
        };
        (PasswordGame::new(io, GameConfig::default()), rig)
    }

    // =========================================================================
    // CodeEntry Tests
    // =========================================================================

    #[test]
    fn code_entry_push_and_reset() {
        let mut entry = CodeEntry::new();
        assert!(entry.is_empty());
        assert!(entry.push('B'));
        assert!(entry.push('9'));
        assert_eq!(entry.as_str(), "B9");
        assert_eq!(entry.len(), 2);
        assert!(entry.is_complete(2));
        assert!(!entry.is_complete(3));

        entry.reset();
        assert!(entry.is_empty());
    }

    #[test]
    fn code_entry_bounded() {
        let mut entry = CodeEntry::new();
        for _ in 0..crate::config::MAX_SHORT_STRING {
            assert!(entry.push('1'));
        }
        assert!(!entry.push('2'));
        assert_eq!(entry.len(), crate::config::MAX_SHORT_STRING);
    }

    // =========================================================================
    // Step Tests
    // =========================================================================

    #[test]
    fn idle_step_shows_prompt_and_waits() {
        let (mut game, rig) = game("");
        assert_eq!(game.step().unwrap(), GameStatus::Waiting);

        assert_eq!(game.io().display.ops, vec!["at 0,0", "Entrez le code:"]);
        assert_eq!(rig.clock.now_ms(), 100);
    }

    #[test]
    fn key_is_echoed_on_second_row() {
        let (mut game, _) = game("B");
        assert_eq!(game.step().unwrap(), GameStatus::KeyEntered('B'));

        assert_eq!(
            game.io().display.ops,
            vec!["at 0,0", "Entrez le code:", "clear", "at 1,0", "B"]
        );
        assert_eq!(game.entry().as_str(), "B");
    }

    #[test]
    fn correct_code_solves() {
        let (mut game, rig) = game("B947D");
        for key in ['B', '9', '4', '7'] {
            assert_eq!(game.step().unwrap(), GameStatus::KeyEntered(key));
        }
        let before = rig.clock.now_ms();
        assert_eq!(game.step().unwrap(), GameStatus::Solved);

        // verdict 500 + 500, retry 1000, poll 100
        assert_eq!(rig.clock.now_ms() - before, 2100);
        assert!(rig.success.level());
        assert!(!rig.error.level());
        assert!(game.is_solved());
        assert!(game.entry().is_empty());

        let ops = &game.io().display.ops;
        assert!(ops.ends_with(&[
            String::from("at 0,0"),
            String::from("Reussite!"),
            String::from("at 1,0"),
            String::from("Wait for part 2!"),
        ]));
    }

    #[test]
    fn solved_game_stays_solved() {
        let (mut game, rig) = game("B947D1");
        game.run().unwrap();
        let t = rig.clock.now_ns();

        assert_eq!(game.step().unwrap(), GameStatus::Solved);
        assert_eq!(rig.clock.now_ns(), t);
        assert_eq!(game.io().keypad.remaining(), 1);
    }

    #[test]
    fn wrong_code_flashes_error_and_restarts() {
        let (mut game, rig) = game("12345");
        for _ in 0..4 {
            game.step().unwrap();
        }
        let before = rig.clock.now_ms();
        assert_eq!(game.step().unwrap(), GameStatus::Rejected);

        // verdict 500, hold 1000, retry 1000, poll 100
        assert_eq!(rig.clock.now_ms() - before, 2600);
        let pulses = rig.error.pulses();
        assert_eq!(pulses.len(), 1);
        assert_eq!(pulses[0].width_ms(), 1500);
        assert!(!game.is_solved());
        assert!(game.entry().is_empty());

        let ops = &game.io().display.ops;
        assert!(ops.ends_with(&[
            String::from("at 0,0"),
            String::from("Nope!"),
            String::from("clear"),
        ]));
    }

    #[test]
    fn button_plays_hint_on_signal_led() {
        let (mut game, rig) = game("");
        rig.button.set_level(true);
        game.step().unwrap();

        // b947d: 4 + 5 + 5 + 5 + 3 marks
        assert_eq!(rig.signal.pulses().len(), 22);
        assert_eq!(
            rig.clock.now_ms(),
            crate::morse::duration_ms("b947d") + 100
        );
        assert!(!rig.signal.level());
    }

    #[test]
    fn display_error_is_reported_after_the_step() {
        let (mut game, rig) = game("1");
        game.io.display.fail = true;
        assert_eq!(game.step(), Err(GameError::Display("nack")));

        assert_eq!(game.entry().as_str(), "1");
        assert_eq!(rig.clock.now_ms(), 100);
    }

    #[test]
    fn wrong_code_is_judged_despite_display_error() {
        let (mut game, rig) = game("12345");
        for _ in 0..4 {
            game.step().unwrap();
        }
        game.io.display.fail = true;
        assert_eq!(game.step(), Err(GameError::Display("nack")));

        assert!(game.entry().is_empty());
        assert_eq!(rig.error.pulses().len(), 1);
        assert!(!game.is_solved());
    }

    #[test]
    fn run_survives_dead_display() {
        let (mut game, rig) = game("B947D");
        game.io.display.fail = true;

        game.run().unwrap();

        assert!(game.is_solved());
        assert!(rig.success.level());
        assert!(game.io().display.ops.is_empty());
    }

    #[test]
    fn custom_secret_length() {
        let (game, _) = game("");
        let io = game.release();
        let config = GameConfig::default().with_secret_code("42");
        let mut game = PasswordGame::new(io, config);
        game.io.keypad.push_key('4');
        game.io.keypad.push_key('2');

        game.step().unwrap();
        assert_eq!(game.step().unwrap(), GameStatus::Solved);
    }
}
