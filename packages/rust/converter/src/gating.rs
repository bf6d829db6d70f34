//! Role gating: which passes run for which content role.
//!
//! | role          | 1–4 | 5          | 6–9 | 10–11 | finish  |
//! |---------------|-----|------------|-----|-------|---------|
//! | story, body   | run | run        | run | run   | prose   |
//! | subtitle      | run | run        | run | skip  | heading |
//! | chapter       | run | run        | run | skip  | heading |
//! | introduction  | run | prose only | run | run   | prose   |
//! | postscript    | run | prose only | run | run   | prose   |

use aozorakit_shared::{ContentRole, Result};

use crate::pass::PassId;

/// How a single pass treats a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    Run,
    Skip,
    /// Run on each line that is not heading-like; leave the rest untouched.
    ProseLinesOnly,
}

/// Final cleanup applied after the last pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    /// Strip trailing whitespace per line and at the end of the text.
    Prose,
    /// Collapse to a single trimmed line.
    Heading,
}

/// One row of the gating table.
#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    pub role: ContentRole,
    pub modes: [PassMode; 11],
    pub finish: Finish,
}

impl RoleGate {
    pub fn mode(&self, id: PassId) -> PassMode {
        self.modes[id.index()]
    }
}

use PassMode::{ProseLinesOnly as Lines, Run, Skip};

const ALL_RUN: [PassMode; 11] = [Run; 11];
const HEADING: [PassMode; 11] = [Run, Run, Run, Run, Run, Run, Run, Run, Run, Skip, Skip];
const NOTE: [PassMode; 11] = [Run, Run, Run, Run, Lines, Run, Run, Run, Run, Run, Run];

/// The full gating table, one row per role.
pub const GATING_TABLE: [RoleGate; 6] = [
    RoleGate {
        role: ContentRole::Story,
        modes: ALL_RUN,
        finish: Finish::Prose,
    },
    RoleGate {
        role: ContentRole::Subtitle,
        modes: HEADING,
        finish: Finish::Heading,
    },
    RoleGate {
        role: ContentRole::Chapter,
        modes: HEADING,
        finish: Finish::Heading,
    },
    RoleGate {
        role: ContentRole::Body,
        modes: ALL_RUN,
        finish: Finish::Prose,
    },
    RoleGate {
        role: ContentRole::Introduction,
        modes: NOTE,
        finish: Finish::Prose,
    },
    RoleGate {
        role: ContentRole::Postscript,
        modes: NOTE,
        finish: Finish::Prose,
    },
];

/// Gate for a role. Every role has exactly one row.
pub fn gate_for(role: ContentRole) -> &'static RoleGate {
    let row = match role {
        ContentRole::Story => 0,
        ContentRole::Subtitle => 1,
        ContentRole::Chapter => 2,
        ContentRole::Body => 3,
        ContentRole::Introduction => 4,
        ContentRole::Postscript => 5,
    };
    &GATING_TABLE[row]
}

/// Gate for a role given as a string tag.
pub fn gate_for_tag(tag: &str) -> Result<&'static RoleGate> {
    let role: ContentRole = tag.parse()?;
    Ok(gate_for(role))
}
