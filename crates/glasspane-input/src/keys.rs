//! Human-readable key names.
//!
//! Pure, stateless helpers mapping the 0–255 keycode space (Win32 virtual
//! key layout) to display strings for shortcut UIs.

/// Display name for a keycode, or `""` for codes without one.
pub fn key_name(keycode: u32) -> &'static str {
    match keycode {
        0x01 => "Left Mouse",
        0x02 => "Right Mouse",
        0x03 => "Cancel",
        0x04 => "Middle Mouse",
        0x05 => "X1 Mouse",
        0x06 => "X2 Mouse",
        0x08 => "Backspace",
        0x09 => "Tab",
        0x0C => "Clear",
        0x0D => "Enter",
        0x10 => "Shift",
        0x11 => "Control",
        0x12 => "Alt",
        0x13 => "Pause",
        0x14 => "Caps Lock",
        0x1B => "Escape",
        0x20 => "Space",
        0x21 => "Page Up",
        0x22 => "Page Down",
        0x23 => "End",
        0x24 => "Home",
        0x25 => "Left Arrow",
        0x26 => "Up Arrow",
        0x27 => "Right Arrow",
        0x28 => "Down Arrow",
        0x29 => "Select",
        0x2A => "Print",
        0x2C => "Print Screen",
        0x2D => "Insert",
        0x2E => "Delete",
        0x2F => "Help",
        0x30 => "0",
        0x31 => "1",
        0x32 => "2",
        0x33 => "3",
        0x34 => "4",
        0x35 => "5",
        0x36 => "6",
        0x37 => "7",
        0x38 => "8",
        0x39 => "9",
        0x41 => "A",
        0x42 => "B",
        0x43 => "C",
        0x44 => "D",
        0x45 => "E",
        0x46 => "F",
        0x47 => "G",
        0x48 => "H",
        0x49 => "I",
        0x4A => "J",
        0x4B => "K",
        0x4C => "L",
        0x4D => "M",
        0x4E => "N",
        0x4F => "O",
        0x50 => "P",
        0x51 => "Q",
        0x52 => "R",
        0x53 => "S",
        0x54 => "T",
        0x55 => "U",
        0x56 => "V",
        0x57 => "W",
        0x58 => "X",
        0x59 => "Y",
        0x5A => "Z",
        0x5B => "Left Windows",
        0x5C => "Right Windows",
        0x5D => "Apps",
        0x5F => "Sleep",
        0x60 => "Numpad 0",
        0x61 => "Numpad 1",
        0x62 => "Numpad 2",
        0x63 => "Numpad 3",
        0x64 => "Numpad 4",
        0x65 => "Numpad 5",
        0x66 => "Numpad 6",
        0x67 => "Numpad 7",
        0x68 => "Numpad 8",
        0x69 => "Numpad 9",
        0x6A => "Numpad *",
        0x6B => "Numpad +",
        0x6D => "Numpad -",
        0x6E => "Numpad Decimal",
        0x6F => "Numpad /",
        0x70 => "F1",
        0x71 => "F2",
        0x72 => "F3",
        0x73 => "F4",
        0x74 => "F5",
        0x75 => "F6",
        0x76 => "F7",
        0x77 => "F8",
        0x78 => "F9",
        0x79 => "F10",
        0x7A => "F11",
        0x7B => "F12",
        0x7C => "F13",
        0x7D => "F14",
        0x7E => "F15",
        0x7F => "F16",
        0x80 => "F17",
        0x81 => "F18",
        0x82 => "F19",
        0x83 => "F20",
        0x84 => "F21",
        0x85 => "F22",
        0x86 => "F23",
        0x87 => "F24",
        0x90 => "Num Lock",
        0x91 => "Scroll Lock",
        0xA0 => "Left Shift",
        0xA1 => "Right Shift",
        0xA2 => "Left Control",
        0xA3 => "Right Control",
        0xA4 => "Left Alt",
        0xA5 => "Right Alt",
        0xA6 => "Browser Back",
        0xA7 => "Browser Forward",
        0xAD => "Volume Mute",
        0xAE => "Volume Down",
        0xAF => "Volume Up",
        0xBA => "OEM ;",
        0xBB => "OEM +",
        0xBC => "OEM ,",
        0xBD => "OEM -",
        0xBE => "OEM .",
        0xBF => "OEM /",
        0xC0 => "OEM ~",
        0xDB => "OEM [",
        0xDC => "OEM \\",
        0xDD => "OEM ]",
        0xDE => "OEM '",
        0xE2 => "OEM <",
        _ => "",
    }
}

/// Display name for a keycode plus modifier combination, in the
/// "Ctrl + Shift + F10" style. Codes with no name render as hex.
pub fn shortcut_name(keycode: u32, ctrl: bool, shift: bool, alt: bool) -> String {
    let mut name = String::new();
    if ctrl {
        name.push_str("Ctrl + ");
    }
    if shift {
        name.push_str("Shift + ");
    }
    if alt {
        name.push_str("Alt + ");
    }

    match key_name(keycode) {
        "" => name.push_str(&format!("0x{keycode:02X}")),
        key => name.push_str(key),
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(0x79), "F10");
        assert_eq!(key_name(0x20), "Space");
        assert_eq!(key_name(0x41), "A");
        assert_eq!(key_name(0x25), "Left Arrow");
        assert_eq!(key_name(0x07), "");
        assert_eq!(key_name(0xFF), "");
    }

    #[test]
    fn test_shortcut_names() {
        assert_eq!(shortcut_name(0x79, false, false, false), "F10");
        assert_eq!(shortcut_name(0x79, true, false, false), "Ctrl + F10");
        assert_eq!(
            shortcut_name(0x79, true, true, true),
            "Ctrl + Shift + Alt + F10"
        );
        assert_eq!(shortcut_name(0x07, true, false, false), "Ctrl + 0x07");
    }
}
