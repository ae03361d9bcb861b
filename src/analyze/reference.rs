//! Reference documents cited at the bottom of problem reports.

use std::ops::{BitOr, BitOrAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Reference(u8);

impl Reference {
    pub const NONE: Reference = Reference(0);
    pub const WEEKLY_PRACTICE: Reference = Reference(1);
    pub const SUBJECT_LINE: Reference = Reference(1 << 1);
    pub const OUTPOST_CONFIG: Reference = Reference(1 << 2);
    pub const FORM_ROUTING: Reference = Reference(1 << 3);
    pub const PACKET_GROUP: Reference = Reference(1 << 4);

    /// Canonical citation order.
    pub const ALL: [Reference; 5] = [
        Reference::WEEKLY_PRACTICE,
        Reference::SUBJECT_LINE,
        Reference::OUTPOST_CONFIG,
        Reference::FORM_ROUTING,
        Reference::PACKET_GROUP,
    ];

    pub fn contains(self, other: Reference) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Report text for a single reference.
    pub fn text(self) -> &'static str {
        match self {
            Reference::WEEKLY_PRACTICE => WEEKLY_PRACTICE_TEXT,
            Reference::SUBJECT_LINE => SUBJECT_LINE_TEXT,
            Reference::OUTPOST_CONFIG => OUTPOST_CONFIG_TEXT,
            Reference::FORM_ROUTING => FORM_ROUTING_TEXT,
            Reference::PACKET_GROUP => PACKET_GROUP_TEXT,
            _ => "",
        }
    }

    /// Text of every reference in the set, in canonical order.
    pub fn texts(self) -> impl Iterator<Item = &'static str> {
        Reference::ALL
            .into_iter()
            .filter(move |r| self.contains(*r))
            .map(Reference::text)
    }
}

impl BitOr for Reference {
    type Output = Reference;

    fn bitor(self, rhs: Reference) -> Reference {
        Reference(self.0 | rhs.0)
    }
}

impl BitOrAssign for Reference {
    fn bitor_assign(&mut self, rhs: Reference) {
        self.0 |= rhs.0;
    }
}

const WEEKLY_PRACTICE_TEXT: &str = "
  * The \"Weekly SPECS/SVECS Packet Practice\" page on the county ARES/RACES
    website gives details of the packet practice exercise, including the net
    practice schedules, the schedule of what type of message to send, the
    schedule of simulated \"down\" BBS systems, and the format of the subject
    line for practice messages.  It is available at
    https://www.scc-ares-races.org/data/packet/weekly-packet-practice.html";

const SUBJECT_LINE_TEXT: &str = "
  * The \"Standard Packet Message Subject Line\" document describes how to
    compose the subject line of a packet message following county standards.
    It is available from the \"Packet BBS Service\" page at
    https://www.scc-ares-races.org/data/packet/index.html";

const OUTPOST_CONFIG_TEXT: &str = "
  * The \"Standard Outpost Configuration Instructions\" document describes how
    to configure the Outpost messaging software to send messages following
    county standards.  It is available from the \"Packet BBS Service\" page at
    https://www.scc-ares-races.org/data/packet/index.html";

const FORM_ROUTING_TEXT: &str = "
  * The \"SCCo ARES/RACES Recommended Form Routing\" document gives
    recommendations for, among other things, what handling orders should be
    used for different types of forms, and what positions and locations they
    should be sent to.  It is available from the \"Go Kit Forms\" page at
    https://www.scc-ares-races.org/operations/go-kit-forms.html";

const PACKET_GROUP_TEXT: &str = "
  * If you need assistance, you can request it in the packet discussion group.
    To sign up for this group, see the Discussion Groups page at
    https://www.scc-ares-races.org/discuss-groups.html
";
