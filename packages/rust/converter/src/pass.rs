//! The ordered pass table.

use crate::PassContext;
use crate::passes;

/// Identity of a converter pass. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassId {
    Extract,
    Symbols,
    Numerals,
    Spacing,
    Tatechuyoko,
    Orthography,
    Ellipsis,
    Gaiji,
    VerticalRule,
    LineJoin,
    BracketIndent,
}

impl PassId {
    pub const ALL: [PassId; 11] = [
        PassId::Extract,
        PassId::Symbols,
        PassId::Numerals,
        PassId::Spacing,
        PassId::Tatechuyoko,
        PassId::Orthography,
        PassId::Ellipsis,
        PassId::Gaiji,
        PassId::VerticalRule,
        PassId::LineJoin,
        PassId::BracketIndent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PassId::Extract => "extract",
            PassId::Symbols => "symbols",
            PassId::Numerals => "numerals",
            PassId::Spacing => "spacing",
            PassId::Tatechuyoko => "tatechuyoko",
            PassId::Orthography => "orthography",
            PassId::Ellipsis => "ellipsis",
            PassId::Gaiji => "gaiji",
            PassId::VerticalRule => "vertical_rule",
            PassId::LineJoin => "line_join",
            PassId::BracketIndent => "bracket_indent",
        }
    }

    /// Zero-based position in [`PASSES`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Passes that run with URLs, English runs and directives sheltered.
    pub fn is_shielded(self) -> bool {
        (PassId::Symbols..=PassId::VerticalRule).contains(&self)
    }

    pub fn pass(self) -> &'static Pass {
        &PASSES[self.index()]
    }
}

/// A named text rewrite.
#[derive(Debug, Clone, Copy)]
pub struct Pass {
    pub id: PassId,
    pub run: fn(&str, &PassContext<'_>) -> String,
}

/// Every pass, in execution order.
pub static PASSES: [Pass; 11] = [
    Pass {
        id: PassId::Extract,
        run: passes::extract::run,
    },
    Pass {
        id: PassId::Symbols,
        run: passes::symbols::run,
    },
    Pass {
        id: PassId::Numerals,
        run: passes::numerals::run,
    },
    Pass {
        id: PassId::Spacing,
        run: passes::spacing::run,
    },
    Pass {
        id: PassId::Tatechuyoko,
        run: passes::tatechuyoko::run,
    },
    Pass {
        id: PassId::Orthography,
        run: passes::orthography::run,
    },
    Pass {
        id: PassId::Ellipsis,
        run: passes::ellipsis::run,
    },
    Pass {
        id: PassId::Gaiji,
        run: passes::gaiji::run,
    },
    Pass {
        id: PassId::VerticalRule,
        run: passes::vertical_rule::run,
    },
    Pass {
        id: PassId::LineJoin,
        run: passes::line_join::run,
    },
    Pass {
        id: PassId::BracketIndent,
        run: passes::bracket_indent::run,
    },
];
