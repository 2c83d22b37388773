use crate::dom::element::Element;
use crate::error::FormStateError;

/// A parsed structural-match predicate (a subset of CSS selectors).
///
/// Supported: selector lists, type / universal selectors, `#id`, `.class`,
/// attribute tests (`[a]`, `=`, `~=`, `^=`, `$=`, `*=`, optional `i` flag),
/// `:checked`, `:disabled`, `:enabled`, `:not(...)`, and the descendant and
/// child combinators.
#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone)]
struct Complex {
    compounds: Vec<Compound>,
    // combinators[i] joins compounds[i] and compounds[i + 1]
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    tests: Vec<SimpleTest>,
}

#[derive(Debug, Clone)]
enum SimpleTest {
    Id(String),
    Class(String),
    Attr {
        name: String,
        op: AttrOp,
        case_insensitive: bool,
    },
    Checked,
    Disabled,
    Enabled,
    Not(Vec<Complex>),
}

#[derive(Debug, Clone)]
enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, FormStateError> {
        let mut parser = Parser {
            source,
            chars: source.chars().collect(),
            pos: 0,
        };
        let alternatives = parser.selector_list()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(Selector {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, el: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}

impl Complex {
    fn matches(&self, el: &Element) -> bool {
        self.matches_at(self.compounds.len() - 1, el)
    }

    fn matches_at(&self, idx: usize, el: &Element) -> bool {
        if !self.compounds[idx].matches(el) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => el.parent().is_some_and(|p| self.matches_at(idx - 1, &p)),
            Combinator::Descendant => {
                let mut current = el.parent();
                while let Some(ancestor) = current {
                    if self.matches_at(idx - 1, &ancestor) {
                        return true;
                    }
                    current = ancestor.parent();
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if tag != el.tag() {
                return false;
            }
        }
        self.tests.iter().all(|t| t.matches(el))
    }
}

impl SimpleTest {
    fn matches(&self, el: &Element) -> bool {
        match self {
            SimpleTest::Id(id) => el.id().as_deref() == Some(id.as_str()),
            SimpleTest::Class(class) => el.class_list().iter().any(|c| c == class),
            SimpleTest::Attr {
                name,
                op,
                case_insensitive,
            } => {
                let Some(actual) = el.attr(name) else {
                    return false;
                };
                // `type` is an enumerated attribute: HTML compares it case-insensitively.
                let fold = *case_insensitive || name == "type";
                let norm: fn(&str) -> String = if fold {
                    |s| s.to_ascii_lowercase()
                } else {
                    |s| s.to_string()
                };
                let actual = norm(&actual);
                match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals(v) => actual == norm(v),
                    AttrOp::Includes(v) => {
                        let v = norm(v);
                        !v.is_empty() && actual.split_whitespace().any(|w| w == v)
                    }
                    AttrOp::Prefix(v) => !v.is_empty() && actual.starts_with(&norm(v)),
                    AttrOp::Suffix(v) => !v.is_empty() && actual.ends_with(&norm(v)),
                    AttrOp::Substring(v) => !v.is_empty() && actual.contains(&norm(v)),
                }
            }
            SimpleTest::Checked => {
                if el.tag() == "option" {
                    el.selected()
                } else {
                    matches!(el.control_type().as_str(), "checkbox" | "radio") && el.checked()
                }
            }
            SimpleTest::Disabled => el.is_disabled(),
            SimpleTest::Enabled => {
                (el.is_form_associated() || el.tag() == "option") && !el.is_disabled()
            }
            SimpleTest::Not(inner) => !inner.iter().any(|c| c.matches(el)),
        }
    }
}

// =========================================================================
// Parser
// =========================================================================

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> FormStateError {
        FormStateError::invalid_selector(self.source, format!("{} at offset {}", reason, self.pos))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn selector_list(&mut self) -> Result<Vec<Complex>, FormStateError> {
        let mut list = vec![self.complex()?];
        while self.eat(',') {
            list.push(self.complex()?);
        }
        Ok(list)
    }

    fn complex(&mut self) -> Result<Complex, FormStateError> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_ws => combinators.push(Combinator::Descendant),
                Some(_) => return Err(self.error("expected combinator")),
            }
            compounds.push(self.compound()?);
        }

        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, FormStateError> {
        let mut compound = Compound::default();
        let start = self.pos;

        if self.eat('*') {
            // universal: no tag constraint
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.tests.push(SimpleTest::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.tests.push(SimpleTest::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.tests.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.tests.push(self.pseudo()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.error("expected selector"));
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String, FormStateError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> Result<SimpleTest, FormStateError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op_char = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(SimpleTest::Attr {
                    name,
                    op: AttrOp::Exists,
                    case_insensitive: false,
                });
            }
            Some('=') => None,
            Some(c @ ('~' | '^' | '$' | '*')) => {
                self.pos += 1;
                Some(c)
            }
            _ => return Err(self.error("expected attribute operator")),
        };
        if !self.eat('=') {
            return Err(self.error("expected '='"));
        }
        self.skip_ws();
        let value = self.attribute_value()?;
        self.skip_ws();

        let mut case_insensitive = false;
        if let Some(flag) = self.peek().filter(|c| c.is_ascii_alphabetic()) {
            match flag.to_ascii_lowercase() {
                'i' => case_insensitive = true,
                's' => {}
                _ => return Err(self.error("unknown attribute flag")),
            }
            self.pos += 1;
            self.skip_ws();
        }
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }

        let op = match op_char {
            None => AttrOp::Equals(value),
            Some('~') => AttrOp::Includes(value),
            Some('^') => AttrOp::Prefix(value),
            Some('$') => AttrOp::Suffix(value),
            _ => AttrOp::Substring(value),
        };
        Ok(SimpleTest::Attr {
            name,
            op,
            case_insensitive,
        })
    }

    fn attribute_value(&mut self) -> Result<String, FormStateError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.at_end() {
                    return Err(self.error("unterminated string"));
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(value)
            }
            _ => self.ident(),
        }
    }

    fn pseudo(&mut self) -> Result<SimpleTest, FormStateError> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "checked" => Ok(SimpleTest::Checked),
            "disabled" => Ok(SimpleTest::Disabled),
            "enabled" => Ok(SimpleTest::Enabled),
            "not" => {
                if !self.eat('(') {
                    return Err(self.error("expected '(' after :not"));
                }
                let inner = self.selector_list()?;
                self.skip_ws();
                if !self.eat(')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(SimpleTest::Not(inner))
            }
            _ => Err(self.error("unsupported pseudo-class")),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
