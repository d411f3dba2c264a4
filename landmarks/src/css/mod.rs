//! This implements a very basic style engine, just enough to answer "is this
//! element `display: none` or `visibility: hidden`?" the way a browser's
//! computed style would.
//!
//! There's no support for `!important`, at-rules, or any property other than
//! `display` and `visibility`. Unsupported declarations and rules are dropped
//! and logged.

use crate::dom;
use crate::style::{ComputedStyle, Display, Visibility};
use cssparser::{self, CowRcStr, Parser, ParserInput};
use kuchiki::{NodeData, NodeRef};
use smallvec::SmallVec;
use std::rc::Rc;

const UA_SHEET: &str = include_str!("res/ua.css");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyDeclaration {
    Display(Display),
    Visibility(Visibility),
}

impl PropertyDeclaration {
    fn apply(&self, style: &mut ComputedStyle) {
        match *self {
            PropertyDeclaration::Display(display) => style.display = display,
            PropertyDeclaration::Visibility(visibility) => style.visibility = visibility,
        }
    }
}

pub struct CssStyleRule {
    selectors: kuchiki::Selectors,
    declarations: Vec<PropertyDeclaration>,
}

/// A rule with a single selector, used for sorting by specificity and source
/// order.
pub struct Rule {
    /// The index of the original selector in the rule.
    selector_index: usize,
    original_rule: Rc<CssStyleRule>,
    specificity: kuchiki::Specificity,
    source_order: usize,
}

#[derive(Debug)]
pub enum Error<'i> {
    InvalidSelector,
    UnknownPropertyName(CowRcStr<'i>),
}

pub type ParseError<'i> = cssparser::ParseError<'i, Error<'i>>;

struct CssParser;
impl<'i> cssparser::AtRuleParser<'i> for CssParser {
    type PreludeBlock = ();
    type PreludeNoBlock = ();
    type AtRule = CssStyleRule;
    type Error = Error<'i>;

    // Default methods reject everything.
}

impl<'i> cssparser::QualifiedRuleParser<'i> for CssParser {
    type Prelude = kuchiki::Selectors;
    type QualifiedRule = CssStyleRule;
    type Error = Error<'i>;

    #[inline]
    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i>> {
        let location = input.current_source_location();
        let position = input.position();
        while input.next().is_ok() {}
        kuchiki::Selectors::compile(input.slice_from(position))
            .map_err(|()| location.new_custom_error(Error::InvalidSelector))
    }

    #[inline]
    fn parse_block<'t>(
        &mut self,
        selectors: Self::Prelude,
        _location: cssparser::SourceLocation,
        input: &mut Parser<'i, 't>,
    ) -> Result<CssStyleRule, ParseError<'i>> {
        Ok(CssStyleRule {
            selectors,
            declarations: parse_declarations(input),
        })
    }
}

struct PropertyDeclarationParser;
impl<'i> cssparser::DeclarationParser<'i> for PropertyDeclarationParser {
    type Declaration = SmallVec<[PropertyDeclaration; 1]>;
    type Error = Error<'i>;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i>> {
        let mut declarations = SmallVec::new();
        match_ignore_ascii_case! { &name,
            "display" => declarations.push(PropertyDeclaration::Display(Display::parse(input)?)),
            "visibility" => declarations.push(PropertyDeclaration::Visibility(Visibility::parse(input)?)),
            _ => return Err(input.new_custom_error(Error::UnknownPropertyName(name.clone()))),
        }
        Ok(declarations)
    }
}

impl<'i> cssparser::AtRuleParser<'i> for PropertyDeclarationParser {
    type PreludeBlock = ();
    type PreludeNoBlock = ();
    type AtRule = SmallVec<[PropertyDeclaration; 1]>;
    type Error = Error<'i>;
}

/// Parses a declaration block, dropping whatever we don't understand.
pub fn parse_declarations<'i>(input: &mut Parser<'i, '_>) -> Vec<PropertyDeclaration> {
    let mut declarations = Vec::new();
    let iter = cssparser::DeclarationListParser::new(input, PropertyDeclarationParser);
    for declaration_list in iter {
        let declaration_list = match declaration_list {
            Ok(l) => l,
            Err(e) => {
                trace!("CSS declaration dropped: {:?}", e);
                continue;
            }
        };
        declarations.extend(declaration_list);
    }
    declarations
}

/// Parses a style sheet into single-selector rules, sorted by specificity and
/// then source order, so that applying them in order gives the cascade.
pub fn parse_css(css: &str) -> Vec<Rule> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    let style_rules = cssparser::RuleListParser::new_for_stylesheet(&mut parser, CssParser)
        .filter_map(|result| match result {
            Ok(rule) => Some(Rc::new(rule)),
            Err((error, text)) => {
                debug!("Rule dropped: {:?}, {:?}", error, text);
                None
            },
        })
        .collect::<Vec<_>>();

    let mut rules = style_rules
        .iter()
        .enumerate()
        .flat_map(|(source_order, rule)| {
            rule.selectors.0.iter().enumerate().map(move |(selector_index, selector)| Rule {
                selector_index,
                original_rule: rule.clone(),
                specificity: selector.specificity(),
                source_order,
            })
        })
        .collect::<Vec<_>>();
    rules.sort_by_key(|rule| (rule.specificity, rule.source_order));
    rules
}

/// The text of every `<style>` element under `root`, in document order.
pub fn read_stylesheets(root: &NodeRef) -> String {
    let mut css = String::new();
    for node in root.descendants() {
        if !dom::has_local_name(&node, "style") {
            continue;
        }
        for child in node.children() {
            if let NodeData::Text(ref text) = *child.data() {
                css.push_str(&text.borrow());
                css.push('\n');
            }
        }
    }
    css
}

/// The user agent sheet followed by the author sheets of a document.
///
/// User agent rules always lose against author rules, so the two origins are
/// kept in separate, individually sorted lists.
pub struct StyleSheet {
    user_agent: Vec<Rule>,
    author: Vec<Rule>,
}

impl StyleSheet {
    pub fn user_agent() -> Self {
        Self {
            user_agent: parse_css(UA_SHEET),
            author: Vec::new(),
        }
    }

    pub fn for_document(document: &NodeRef) -> Self {
        let author = parse_css(&read_stylesheets(document));
        debug!("Read {} author style rules", author.len());
        Self {
            author,
            ..Self::user_agent()
        }
    }

    /// Computes the style of `node`. Non-element nodes get the initial style.
    pub fn compute(&self, node: &NodeRef) -> ComputedStyle {
        let mut style = ComputedStyle::initial();
        let element = match node.clone().into_element_ref() {
            Some(e) => e,
            None => return style,
        };

        for rule in self.user_agent.iter().chain(self.author.iter()) {
            if rule.original_rule.selectors.0[rule.selector_index].matches(&element) {
                for declaration in &rule.original_rule.declarations {
                    declaration.apply(&mut style);
                }
            }
        }

        let style_attr = element.attributes.borrow().get("style").map(|style_attr| {
            let mut input = ParserInput::new(style_attr);
            let mut input = Parser::new(&mut input);
            parse_declarations(&mut input)
        });

        for declaration in style_attr.iter().flatten() {
            declaration.apply(&mut style);
        }

        style
    }
}
