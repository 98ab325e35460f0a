//! Payload range taxonomy.
//!
//! A payload byte addresses exactly one output domain, chosen by numeric
//! range. The ranges live in an ordered table so they can be inspected and
//! tested independently of the dispatcher. They must stay disjoint.

/// Output domain tag, without the element index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainKind {
    Keyboard,
    MouseButton,
    Joystick,
    Layer,
    Lock,
}

/// Inclusive payload range mapped onto a domain. Element index is
/// `payload - base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub low: u8,
    pub high: u8,
    pub base: u8,
    pub kind: DomainKind,
}

const fn range(low: u8, high: u8, base: u8, kind: DomainKind) -> Range {
    Range {
        low,
        high,
        base,
        kind,
    }
}

/// Checked in order; the first match wins.
pub static RANGES: [Range; 6] = [
    range(0x00, 0xA4, 0x00, DomainKind::Keyboard),
    range(0xE0, 0xE7, 0x00, DomainKind::Keyboard),
    range(0xA5, 0xAA, 0xA5, DomainKind::MouseButton),
    range(0xB0, 0xCF, 0xB0, DomainKind::Joystick),
    range(0xD0, 0xDF, 0xD0, DomainKind::Layer),
    range(0xFF, 0xFF, 0xFF, DomainKind::Lock),
];

/// Where a fired payload goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// HID keyboard usage code.
    Keyboard(u8),
    /// Mouse button index.
    MouseButton(u8),
    /// Joystick button/element index.
    Joystick(u8),
    /// Layer index.
    Layer(u8),
    /// Keyboard lock (placeholder).
    Lock,
    /// 0xAB-0xAF and 0xE8-0xFE.
    Unassigned,
}

impl Domain {
    pub fn classify(payload: u8) -> Self {
        let Some(r) = RANGES
            .iter()
            .find(|r| (r.low..=r.high).contains(&payload))
        else {
            return Domain::Unassigned;
        };
        let index = payload - r.base;
        match r.kind {
            DomainKind::Keyboard => Domain::Keyboard(index),
            DomainKind::MouseButton => Domain::MouseButton(index),
            DomainKind::Joystick => Domain::Joystick(index),
            DomainKind::Layer => Domain::Layer(index),
            DomainKind::Lock => Domain::Lock,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Domain::Keyboard(_) => "keyboard",
            Domain::MouseButton(_) => "mouse",
            Domain::Joystick(_) => "joystick",
            Domain::Layer(_) => "layer",
            Domain::Lock => "lock",
            Domain::Unassigned => "unassigned",
        }
    }
}

/// Continuous target of an `Analog` route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogTarget {
    /// Mouse analog element, index = payload.
    Mouse(u8),
    /// Joystick analog element, index = payload - 0x20.
    Joystick(u8),
}

impl AnalogTarget {
    pub fn classify(payload: u8) -> Option<Self> {
        match payload {
            0x00..=0x0F => Some(AnalogTarget::Mouse(payload)),
            0x20..=0x2F => Some(AnalogTarget::Joystick(payload - 0x20)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_examples() {
        assert_eq!(Domain::classify(0x04), Domain::Keyboard(0x04));
        assert_eq!(Domain::classify(0xE1), Domain::Keyboard(0xE1));
        assert_eq!(Domain::classify(0xA6), Domain::MouseButton(1));
        assert_eq!(Domain::classify(0xB3), Domain::Joystick(3));
        assert_eq!(Domain::classify(0xD2), Domain::Layer(2));
        assert_eq!(Domain::classify(0xFF), Domain::Lock);
        assert_eq!(Domain::classify(0xAC), Domain::Unassigned);
        assert_eq!(Domain::classify(0xE8), Domain::Unassigned);
        assert_eq!(Domain::classify(0xFE), Domain::Unassigned);
    }

    #[test]
    fn test_range_edges() {
        assert_eq!(Domain::classify(0xA4), Domain::Keyboard(0xA4));
        assert_eq!(Domain::classify(0xA5), Domain::MouseButton(0));
        assert_eq!(Domain::classify(0xAA), Domain::MouseButton(5));
        assert_eq!(Domain::classify(0xAF), Domain::Unassigned);
        assert_eq!(Domain::classify(0xB0), Domain::Joystick(0));
        assert_eq!(Domain::classify(0xCF), Domain::Joystick(31));
        assert_eq!(Domain::classify(0xD0), Domain::Layer(0));
        assert_eq!(Domain::classify(0xDF), Domain::Layer(15));
        assert_eq!(Domain::classify(0xE7), Domain::Keyboard(0xE7));
    }

    #[test]
    fn test_ranges_disjoint() {
        for (i, a) in RANGES.iter().enumerate() {
            for b in &RANGES[i + 1..] {
                assert!(a.high < b.low || b.high < a.low, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_analog_targets() {
        assert_eq!(AnalogTarget::classify(0x00), Some(AnalogTarget::Mouse(0)));
        assert_eq!(AnalogTarget::classify(0x0F), Some(AnalogTarget::Mouse(15)));
        assert_eq!(AnalogTarget::classify(0x10), None);
        assert_eq!(AnalogTarget::classify(0x20), Some(AnalogTarget::Joystick(0)));
        assert_eq!(AnalogTarget::classify(0x2F), Some(AnalogTarget::Joystick(15)));
        assert_eq!(AnalogTarget::classify(0x30), None);
    }

    proptest! {
        #[test]
        fn prop_every_payload_has_one_outcome(payload in any::<u8>()) {
            let matches = RANGES
                .iter()
                .filter(|r| (r.low..=r.high).contains(&payload))
                .count();
            let domain = Domain::classify(payload);
            if domain == Domain::Unassigned {
                prop_assert_eq!(matches, 0);
            } else {
                prop_assert_eq!(matches, 1);
            }
        }
    }
}
