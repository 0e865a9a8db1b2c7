use std::fmt;
use std::thread;

use rdev::{EventType, Key};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

use crate::error::HotkeyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl Modifier {
    const ALL: [Modifier; 4] = [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Meta];

    fn of(key: Key) -> Option<Self> {
        match key {
            Key::ControlLeft | Key::ControlRight => Some(Modifier::Ctrl),
            Key::Alt | Key::AltGr => Some(Modifier::Alt),
            Key::ShiftLeft | Key::ShiftRight => Some(Modifier::Shift),
            Key::MetaLeft | Key::MetaRight => Some(Modifier::Meta),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Meta => "meta",
        }
    }
}

/// A global key combination: zero or more modifiers plus one trigger key.
#[derive(Debug, Clone, PartialEq)]
pub struct HotkeyCombo {
    modifiers: [bool; 4],
    key: Key,
    key_name: String,
}

impl HotkeyCombo {
    /// Parse a `+`-separated combination such as `alt+q` or `Ctrl+Shift+F9`.
    pub fn parse(combo: &str) -> Result<Self, HotkeyError> {
        let fail = |reason: &str| HotkeyError::Parse {
            combo: combo.to_string(),
            reason: reason.to_string(),
        };

        let mut modifiers = [false; 4];
        let mut trigger = None;
        for part in combo.split('+').map(|p| p.trim().to_lowercase()) {
            if part.is_empty() {
                return Err(fail("empty key name"));
            }
            if let Some(modifier) = parse_modifier(&part) {
                modifiers[modifier.index()] = true;
                continue;
            }
            let key = parse_key(&part).ok_or_else(|| fail(&format!("unknown key {part:?}")))?;
            if trigger.replace((key, part)).is_some() {
                return Err(fail("more than one non-modifier key"));
            }
        }

        let (key, key_name) = trigger.ok_or_else(|| fail("no trigger key"))?;
        Ok(Self {
            modifiers,
            key,
            key_name,
        })
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn requires(&self, modifier: Modifier) -> bool {
        self.modifiers[modifier.index()]
    }
}

impl fmt::Display for HotkeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in Modifier::ALL.iter().filter(|m| self.requires(**m)) {
            write!(f, "{}+", modifier.name().to_uppercase())?;
        }
        f.write_str(&self.key_name.to_uppercase())
    }
}

fn parse_modifier(name: &str) -> Option<Modifier> {
    match name {
        "ctrl" | "control" => Some(Modifier::Ctrl),
        "alt" | "option" => Some(Modifier::Alt),
        "shift" => Some(Modifier::Shift),
        "meta" | "super" | "win" | "cmd" | "command" => Some(Modifier::Meta),
        _ => None,
    }
}

fn parse_key(name: &str) -> Option<Key> {
    let key = match name {
        "a" => Key::KeyA,
        "b" => Key::KeyB,
        "c" => Key::KeyC,
        "d" => Key::KeyD,
        "e" => Key::KeyE,
        "f" => Key::KeyF,
        "g" => Key::KeyG,
        "h" => Key::KeyH,
        "i" => Key::KeyI,
        "j" => Key::KeyJ,
        "k" => Key::KeyK,
        "l" => Key::KeyL,
        "m" => Key::KeyM,
        "n" => Key::KeyN,
        "o" => Key::KeyO,
        "p" => Key::KeyP,
        "q" => Key::KeyQ,
        "r" => Key::KeyR,
        "s" => Key::KeyS,
        "t" => Key::KeyT,
        "u" => Key::KeyU,
        "v" => Key::KeyV,
        "w" => Key::KeyW,
        "x" => Key::KeyX,
        "y" => Key::KeyY,
        "z" => Key::KeyZ,
        "0" => Key::Num0,
        "1" => Key::Num1,
        "2" => Key::Num2,
        "3" => Key::Num3,
        "4" => Key::Num4,
        "5" => Key::Num5,
        "6" => Key::Num6,
        "7" => Key::Num7,
        "8" => Key::Num8,
        "9" => Key::Num9,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        "space" => Key::Space,
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "esc" | "escape" => Key::Escape,
        "printscreen" | "prtsc" => Key::PrintScreen,
        _ => return None,
    };
    Some(key)
}

/// Turns a raw key event stream into hotkey triggers.
///
/// Fires on the trigger key's press while exactly the combo's modifiers are
/// held. Auto-repeat presses are ignored until the key is released.
pub struct ComboTracker {
    combo: HotkeyCombo,
    held: [bool; 4],
    latched: bool,
}

impl ComboTracker {
    pub fn new(combo: HotkeyCombo) -> Self {
        Self {
            combo,
            held: [false; 4],
            latched: false,
        }
    }

    /// Feed one event; returns `true` when it completes the combination.
    pub fn on_event(&mut self, event: &EventType) -> bool {
        match event {
            &EventType::KeyPress(key) => {
                if let Some(modifier) = Modifier::of(key) {
                    self.held[modifier.index()] = true;
                    return false;
                }
                if key != self.combo.key || self.latched {
                    return false;
                }
                if self.held == self.combo.modifiers {
                    self.latched = true;
                    return true;
                }
                false
            }
            &EventType::KeyRelease(key) => {
                if let Some(modifier) = Modifier::of(key) {
                    self.held[modifier.index()] = false;
                } else if key == self.combo.key {
                    self.latched = false;
                }
                false
            }
            _ => false,
        }
    }
}

/// Listen for `combo` on a dedicated OS thread and send `()` per trigger.
///
/// The thread owns the platform event hook for the life of the process. If the
/// hook fails the sender is dropped, which the receiving side sees as a closed
/// channel.
pub fn spawn_listener(
    combo: HotkeyCombo,
    triggers: UnboundedSender<()>,
) -> Result<thread::JoinHandle<()>, HotkeyError> {
    thread::Builder::new()
        .name("hotkey-listener".to_string())
        .spawn(move || {
            let mut tracker = ComboTracker::new(combo);
            let result = rdev::listen(move |event| {
                if tracker.on_event(&event.event_type) {
                    debug!("Hotkey pressed");
                    let _ = triggers.send(());
                }
            });
            if let Err(e) = result {
                error!(error = ?e, "Hotkey listener failed");
            }
        })
        .map_err(HotkeyError::Spawn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: Key) -> EventType {
        EventType::KeyPress(key)
    }

    fn release(key: Key) -> EventType {
        EventType::KeyRelease(key)
    }

    #[test]
    fn parse_default_combo() {
        let combo = HotkeyCombo::parse("alt+q").unwrap();
        assert_eq!(combo.key(), Key::KeyQ);
        assert!(combo.requires(Modifier::Alt));
        assert!(!combo.requires(Modifier::Ctrl));
        assert_eq!(combo.to_string(), "ALT+Q");
    }

    #[test]
    fn parse_is_case_and_space_insensitive() {
        let combo = HotkeyCombo::parse(" Ctrl + Shift + F9 ").unwrap();
        assert_eq!(combo.key(), Key::F9);
        assert!(combo.requires(Modifier::Ctrl));
        assert!(combo.requires(Modifier::Shift));
        assert_eq!(combo.to_string(), "CTRL+SHIFT+F9");
    }

    #[test]
    fn parse_rejects_bad_combos() {
        for bad in ["", "alt+", "alt+shift", "alt+q+w", "alt+banana"] {
            assert!(HotkeyCombo::parse(bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn tracker_fires_with_modifier_held() {
        let mut tracker = ComboTracker::new(HotkeyCombo::parse("alt+q").unwrap());
        assert!(!tracker.on_event(&press(Key::KeyQ)));
        assert!(!tracker.on_event(&release(Key::KeyQ)));

        assert!(!tracker.on_event(&press(Key::Alt)));
        assert!(tracker.on_event(&press(Key::KeyQ)));
    }

    #[test]
    fn tracker_ignores_autorepeat_until_release() {
        let mut tracker = ComboTracker::new(HotkeyCombo::parse("alt+q").unwrap());
        tracker.on_event(&press(Key::Alt));
        assert!(tracker.on_event(&press(Key::KeyQ)));
        assert!(!tracker.on_event(&press(Key::KeyQ)));
        assert!(!tracker.on_event(&press(Key::KeyQ)));
        tracker.on_event(&release(Key::KeyQ));
        assert!(tracker.on_event(&press(Key::KeyQ)));
    }

    #[test]
    fn tracker_requires_exact_modifiers() {
        let mut tracker = ComboTracker::new(HotkeyCombo::parse("alt+q").unwrap());
        tracker.on_event(&press(Key::ControlLeft));
        tracker.on_event(&press(Key::Alt));
        assert!(!tracker.on_event(&press(Key::KeyQ)));

        tracker.on_event(&release(Key::KeyQ));
        tracker.on_event(&release(Key::ControlLeft));
        assert!(tracker.on_event(&press(Key::KeyQ)));
    }

    #[test]
    fn either_side_modifier_counts() {
        let mut tracker = ComboTracker::new(HotkeyCombo::parse("ctrl+shift+s").unwrap());
        tracker.on_event(&press(Key::ControlRight));
        tracker.on_event(&press(Key::ShiftLeft));
        assert!(tracker.on_event(&press(Key::KeyS)));
    }
}
