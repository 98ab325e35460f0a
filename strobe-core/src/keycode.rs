//! Names for payload values.
//!
//! Keyboard payloads are USB HID usage codes (Keyboard/Keypad page 0x07).
//! The other ranges get generated names such as `Mouse1` or `Layer2`.

/// (code, name) pairs for the keyboard range.
pub static KEY_NAMES: &[(u8, &str)] = &[
    (0x04, "A"), (0x05, "B"), (0x06, "C"), (0x07, "D"), (0x08, "E"), (0x09, "F"),
    (0x0A, "G"), (0x0B, "H"), (0x0C, "I"), (0x0D, "J"), (0x0E, "K"), (0x0F, "L"),
    (0x10, "M"), (0x11, "N"), (0x12, "O"), (0x13, "P"), (0x14, "Q"), (0x15, "R"),
    (0x16, "S"), (0x17, "T"), (0x18, "U"), (0x19, "V"), (0x1A, "W"), (0x1B, "X"),
    (0x1C, "Y"), (0x1D, "Z"),
    (0x1E, "1"), (0x1F, "2"), (0x20, "3"), (0x21, "4"), (0x22, "5"),
    (0x23, "6"), (0x24, "7"), (0x25, "8"), (0x26, "9"), (0x27, "0"),
    (0x28, "Enter"), (0x29, "Escape"), (0x2A, "Backspace"), (0x2B, "Tab"),
    (0x2C, "Space"), (0x2D, "Minus"), (0x2E, "Equal"), (0x2F, "LBracket"),
    (0x30, "RBracket"), (0x31, "Backslash"), (0x33, "Semicolon"), (0x34, "Quote"),
    (0x35, "Grave"), (0x36, "Comma"), (0x37, "Dot"), (0x38, "Slash"),
    (0x39, "CapsLock"),
    (0x3A, "F1"), (0x3B, "F2"), (0x3C, "F3"), (0x3D, "F4"), (0x3E, "F5"),
    (0x3F, "F6"), (0x40, "F7"), (0x41, "F8"), (0x42, "F9"), (0x43, "F10"),
    (0x44, "F11"), (0x45, "F12"),
    (0x46, "PrintScreen"), (0x47, "ScrollLock"), (0x48, "Pause"), (0x49, "Insert"),
    (0x4A, "Home"), (0x4B, "PageUp"), (0x4C, "Delete"), (0x4D, "End"),
    (0x4E, "PageDown"), (0x4F, "Right"), (0x50, "Left"), (0x51, "Down"), (0x52, "Up"),
    (0x64, "NonUsBackslash"),
    (0xE0, "LCtrl"), (0xE1, "LShift"), (0xE2, "LAlt"), (0xE3, "LGui"),
    (0xE4, "RCtrl"), (0xE5, "RShift"), (0xE6, "RAlt"), (0xE7, "RGui"),
];

/// HID name of a keyboard payload.
pub fn key_name(code: u8) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Parse a payload name, case-insensitively.
///
/// Accepts HID key names plus `MouseN` (0-5), `JoyN` (0-31), `LayerN`
/// (0-15) and `Lock`.
pub fn parse(name: &str) -> Option<u8> {
    if let Some((code, _)) = KEY_NAMES.iter().find(|(_, n)| n.eq_ignore_ascii_case(name)) {
        return Some(*code);
    }
    if name.eq_ignore_ascii_case("lock") {
        return Some(0xFF);
    }
    for (prefix, base, count) in [("mouse", 0xA5u8, 6u8), ("joy", 0xB0, 32), ("layer", 0xD0, 16)] {
        let Some(head) = name.get(..prefix.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(prefix) && name.len() > prefix.len() {
            let index: u8 = name[prefix.len()..].parse().ok()?;
            return (index < count).then(|| base + index);
        }
    }
    None
}
