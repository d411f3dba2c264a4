//! The computed values the landmark scanner cares about.

use crate::css::ParseError;
use cssparser::Parser;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Display {
    None,
    Contents,
    Block,
    Inline,
    /// Any other box type. Only `none` affects landmark visibility.
    Other,
}

impl Display {
    pub fn parse<'i>(input: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        let ident = input.expect_ident()?;
        Ok(match_ignore_ascii_case! { &*ident,
            "none" => Display::None,
            "contents" => Display::Contents,
            "block" => Display::Block,
            "inline" => Display::Inline,
            _ => Display::Other,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    pub fn parse<'i>(input: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        let location = input.current_source_location();
        let ident = input.expect_ident()?.clone();
        Ok(match_ignore_ascii_case! { &*ident,
            "visible" => Visibility::Visible,
            "hidden" => Visibility::Hidden,
            "collapse" => Visibility::Collapse,
            _ => return Err(location.new_unexpected_token_error(cssparser::Token::Ident(ident))),
        })
    }
}

/// Style of a single element, without inheritance.
///
/// Descendants of hidden elements are never looked at by the scanner, so
/// there is no need to carry inherited values around.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
}

impl ComputedStyle {
    pub fn initial() -> Self {
        Self {
            display: Display::Inline,
            visibility: Visibility::Visible,
        }
    }

    pub fn is_display_none(&self) -> bool {
        self.display == Display::None
    }

    pub fn is_visibility_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::initial()
    }
}
