//! The collaborator contracts the interpreter calls out to, plus the
//! headless implementations used for testing and as building blocks for
//! hosts.
//!
//! The buzzer contract is the sound timer's transition handler, so it lives
//! with the timer and is re-exported here under its device name.
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::{
    definitions::{display, keyboard},
    shutdown::{Cancelled, Shutdown},
};

pub use crate::timer::{NoCallback as NullBuzzer, TimerCallback as BuzzerCommands};

/// How often a blocked key wait rechecks the shutdown token. The wait
/// itself sits on a condition variable, this is only the cancellation
/// granularity.
const WAIT_RECHECK: std::time::Duration = std::time::Duration::from_millis(5);

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the display based code
pub trait DisplayCommands {
    /// Will clear the display
    fn clear(&mut self);

    /// Draws the sprite with its top left corner at `(x, y)`, one byte per
    /// row, most significant bit first, XOR composited onto the grid.
    ///
    /// Reports if any pixel went from lit to unlit.
    fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool;
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard state
pub trait KeyboardCommands {
    /// If the given key (`0x0` - `0xF`) is currently held down.
    fn is_pressed(&self, key: u8) -> bool;

    /// Blocks until the given key is observed pressed, or until the
    /// shutdown token fires.
    ///
    /// Implementations have to block cooperatively, busy waiting here
    /// would burn a host core for the whole wait.
    fn wait_pressed(&self, key: u8, cancel: &Shutdown) -> Result<(), Cancelled>;
}

/// A 64x32 monochrome surface implementing the draw contract.
///
/// The grid is toroidal, sprite pixels falling off one edge reappear on the
/// opposite one.
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: [[bool; display::WIDTH]; display::HEIGHT],
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pixel rows, `pixels()[y][x]`.
    pub fn pixels(&self) -> &[[bool; display::WIDTH]; display::HEIGHT] {
        &self.pixels
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.pixels[y % display::HEIGHT][x % display::WIDTH]
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: [[false; display::WIDTH]; display::HEIGHT],
        }
    }
}

impl DisplayCommands for FrameBuffer {
    fn clear(&mut self) {
        self.pixels = [[false; display::WIDTH]; display::HEIGHT];
    }

    fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;

        for (row, byte) in sprite.iter().enumerate() {
            let py = (y as usize + row) % display::HEIGHT;

            for bit in 0..8 {
                let mask = 0x80 >> bit;
                if byte & mask == 0 {
                    continue;
                }

                let px = (x as usize + bit) % display::WIDTH;
                let lit = self.pixels[py][px];

                self.pixels[py][px] = !lit;
                if lit {
                    collision = true;
                }
            }
        }

        collision
    }
}

/// The shared 16-key state a host writes into from its input thread.
///
/// Cloning hands out another handle onto the same state, so one clone can
/// live inside the machine while the host keeps another for key updates.
/// The blocking wait sits on a condition variable that every key update
/// notifies, the original implementation's busy loop has no place here.
#[derive(Clone, Default)]
pub struct Keypad {
    inner: Arc<KeypadInner>,
}

#[derive(Default)]
struct KeypadInner {
    keys: Mutex<[bool; keyboard::SIZE]>,
    condvar: Condvar,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates a single key and wakes up any pending wait.
    pub fn set_key(&self, key: u8, pressed: bool) {
        let mut keys = self.inner.keys.lock();
        keys[key as usize % keyboard::SIZE] = pressed;
        self.inner.condvar.notify_all();
    }

    /// Replaces the whole keyboard state at once.
    pub fn set_all(&self, state: &[bool; keyboard::SIZE]) {
        let mut keys = self.inner.keys.lock();
        keys.copy_from_slice(state);
        self.inner.condvar.notify_all();
    }
}

impl KeyboardCommands for Keypad {
    fn is_pressed(&self, key: u8) -> bool {
        self.inner.keys.lock()[key as usize % keyboard::SIZE]
    }

    fn wait_pressed(&self, key: u8, cancel: &Shutdown) -> Result<(), Cancelled> {
        let key = key as usize % keyboard::SIZE;
        let mut keys = self.inner.keys.lock();
        loop {
            if keys[key] {
                return Ok(());
            }
            if cancel.is_triggered() {
                return Err(Cancelled);
            }
            // the shutdown token has its own condition variable, so the
            // wait is bounded to observe a trigger in time
            self.inner.condvar.wait_for(&mut keys, WAIT_RECHECK);
        }
    }
}

/// A display that swallows everything, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplayCommands for NullDisplay {
    fn clear(&mut self) {}

    fn draw(&mut self, _x: u8, _y: u8, _sprite: &[u8]) -> bool {
        false
    }
}

/// A keyboard with no keys ever pressed. A wait on it blocks until the
/// shutdown token fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullKeyboard;

impl KeyboardCommands for NullKeyboard {
    fn is_pressed(&self, _key: u8) -> bool {
        false
    }

    fn wait_pressed(&self, _key: u8, cancel: &Shutdown) -> Result<(), Cancelled> {
        cancel.wait();
        Err(Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};

    #[test]
    fn test_framebuffer_draw_and_clear() {
        let mut fb = FrameBuffer::new();

        // a 2 row sprite: a full row and a single leading pixel
        assert!(!fb.draw(4, 2, &[0xFF, 0x80]));
        for x in 4..12 {
            assert!(fb.is_lit(x, 2));
        }
        assert!(fb.is_lit(4, 3));
        assert!(!fb.is_lit(5, 3));

        fb.clear();
        assert!(!fb.is_lit(4, 2));
    }

    #[test]
    fn test_framebuffer_xor_self_cancels() {
        let mut fb = FrameBuffer::new();
        let sprite = [0x3C, 0x42, 0x42, 0x3C];

        assert!(!fb.draw(10, 10, &sprite));
        // drawing the same sprite again erases it and reports the collision
        assert!(fb.draw(10, 10, &sprite));
        assert!(!fb.is_lit(12, 10));

        // the surface is blank again, so a third draw sees no collision
        assert!(!fb.draw(10, 10, &sprite));
    }

    #[test]
    fn test_framebuffer_wraps_around() {
        let mut fb = FrameBuffer::new();

        // a full 8 pixel row in the bottom right corner, twice
        fb.draw(62, 31, &[0xFF, 0xFF]);
        assert!(fb.is_lit(62, 31));
        assert!(fb.is_lit(63, 31));
        // the overhang reappears at the left edge and the top row
        assert!(fb.is_lit(0, 31));
        assert!(fb.is_lit(5, 31));
        assert!(fb.is_lit(62, 0));
        assert!(fb.is_lit(1, 0));
        assert!(!fb.is_lit(6, 31));
    }

    #[test]
    fn test_keypad_shares_state_between_clones() {
        let keypad = Keypad::new();
        let clone = keypad.clone();

        keypad.set_key(0xA, true);
        assert!(clone.is_pressed(0xA));
        assert!(!clone.is_pressed(0xB));

        keypad.set_all(&[false; keyboard::SIZE]);
        assert!(!clone.is_pressed(0xA));
    }

    #[test]
    fn test_keypad_wait_wakes_on_press() {
        let keypad = Keypad::new();
        let shutdown = Shutdown::new();

        let waiter = keypad.clone();
        let cancel = shutdown.clone();
        let handle = thread::spawn(move || waiter.wait_pressed(0x5, &cancel));

        thread::sleep(Duration::from_millis(20));
        keypad.set_key(0x5, true);

        assert_eq!(handle.join().expect("waiter paniced"), Ok(()));
    }

    #[test]
    fn test_keypad_wait_honors_shutdown() {
        let keypad = Keypad::new();
        let shutdown = Shutdown::new();

        let waiter = keypad.clone();
        let cancel = shutdown.clone();
        let handle = thread::spawn(move || waiter.wait_pressed(0x5, &cancel));

        thread::sleep(Duration::from_millis(20));
        shutdown.trigger();

        assert_eq!(handle.join().expect("waiter paniced"), Err(Cancelled));
    }

    #[test]
    fn test_null_devices() {
        let mut display = NullDisplay;
        assert!(!display.draw(0, 0, &[0xFF]));

        let keyboard = NullKeyboard;
        assert!(!keyboard.is_pressed(0x0));

        let shutdown = Shutdown::new();
        shutdown.trigger();
        assert_eq!(keyboard.wait_pressed(0x0, &shutdown), Err(Cancelled));
    }
}
