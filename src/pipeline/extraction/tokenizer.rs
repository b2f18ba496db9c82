//! Tokenizer and lenient parser for the quasi-JSON clinical note grammar.
//!
//! The notes look like JSON but are not: free text sits in parenthesized
//! blocks, trailing commas are common, and values are sometimes unquoted.
//! The parser never fails. Anything it cannot place is skipped, and an
//! unterminated group or list simply ends at end of input.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `"..."` with escapes resolved.
    Quoted(String),
    /// `( ... )` contents, trimmed. Nested parentheses are kept.
    Block(String),
    /// Any other run of non-structural characters.
    Word(String),
    Colon,
    Comma,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
}

pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            ':' => tokens.push(Token::Colon),
            ',' => tokens.push(Token::Comma),
            '{' => tokens.push(Token::OpenBrace),
            '}' => tokens.push(Token::CloseBrace),
            '[' => tokens.push(Token::OpenBracket),
            ']' => tokens.push(Token::CloseBracket),
            '"' => {
                let mut s = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some(other) => s.push(other),
                            None => break,
                        },
                        other => s.push(other),
                    }
                }
                tokens.push(Token::Quoted(s));
            }
            '(' => {
                let mut depth = 1usize;
                let mut s = String::new();
                for c in chars.by_ref() {
                    match c {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    s.push(c);
                }
                tokens.push(Token::Block(s.trim().to_string()));
            }
            ')' => {}
            other => {
                let mut s = String::from(other);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || is_structural(next) {
                        break;
                    }
                    s.push(next);
                    chars.next();
                }
                tokens.push(Token::Word(s));
            }
        }
    }

    tokens
}

fn is_structural(c: char) -> bool {
    matches!(c, ':' | ',' | '{' | '}' | '[' | ']' | '"' | '(' | ')')
}

/// A parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValue {
    /// Quoted string or a run of bare words.
    Text(String),
    /// Parenthesized free text.
    Block(String),
    List(Vec<String>),
    Group(Vec<(String, NoteValue)>),
}

impl NoteValue {
    /// Text content of a scalar value (`Text` or `Block`).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NoteValue::Text(s) | NoteValue::Block(s) => Some(s),
            _ => None,
        }
    }
}

/// Parsed note: top-level entries in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteTree {
    pub entries: Vec<(String, NoteValue)>,
}

impl NoteTree {
    /// Breadth-first lookup of a label, so shallower matches win.
    pub fn find(&self, label: &str) -> Option<&NoteValue> {
        let mut queue: VecDeque<&[(String, NoteValue)]> = VecDeque::new();
        queue.push_back(&self.entries);

        while let Some(level) = queue.pop_front() {
            if let Some((_, value)) = level.iter().find(|(k, _)| k.trim() == label) {
                return Some(value);
            }
            for (_, value) in level {
                if let NoteValue::Group(children) = value {
                    queue.push_back(children);
                }
            }
        }
        None
    }
}

pub fn parse_note(text: &str) -> NoteTree {
    let mut parser = Parser {
        tokens: tokenize(text),
        pos: 0,
    };
    NoteTree {
        entries: parser.entries(false),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse `"key": value` entries until end of input or, when `nested`,
    /// the closing brace. A brace where a key is expected opens an
    /// anonymous group whose entries merge into this level.
    fn entries(&mut self, nested: bool) -> Vec<(String, NoteValue)> {
        let mut out = Vec::new();

        while let Some(token) = self.advance() {
            match token {
                Token::CloseBrace if nested => break,
                Token::OpenBrace => {
                    let inner = self.entries(true);
                    out.extend(inner);
                }
                Token::Quoted(key) => {
                    if self.peek() != Some(&Token::Colon) {
                        continue;
                    }
                    self.advance();
                    if let Some(value) = self.value() {
                        out.push((key.trim().to_string(), value));
                    }
                }
                _ => {}
            }
        }

        out
    }

    fn value(&mut self) -> Option<NoteValue> {
        match self.peek()? {
            Token::Quoted(_) | Token::Block(_) => match self.advance()? {
                Token::Quoted(s) => Some(NoteValue::Text(s.trim().to_string())),
                Token::Block(s) => Some(NoteValue::Block(s)),
                _ => None,
            },
            Token::OpenBracket => {
                self.advance();
                Some(NoteValue::List(self.list()))
            }
            Token::OpenBrace => {
                self.advance();
                Some(NoteValue::Group(self.entries(true)))
            }
            Token::Word(_) => Some(NoteValue::Text(self.words())),
            _ => None,
        }
    }

    /// List items up to `]`. A `}` ends an unterminated list without being
    /// consumed so the enclosing group can close.
    fn list(&mut self) -> Vec<String> {
        let mut items = Vec::new();

        while let Some(token) = self.peek() {
            match token {
                Token::CloseBracket => {
                    self.advance();
                    break;
                }
                Token::CloseBrace => break,
                Token::Word(_) => {
                    let joined = self.words();
                    push_item(&mut items, &joined);
                }
                Token::Quoted(s) | Token::Block(s) => {
                    let s = s.clone();
                    self.advance();
                    push_item(&mut items, &s);
                }
                _ => {
                    self.advance();
                }
            }
        }

        items
    }

    fn words(&mut self) -> String {
        let mut parts = Vec::new();
        while let Some(Token::Word(w)) = self.peek() {
            parts.push(w.clone());
            self.advance();
        }
        parts.join(" ")
    }
}

/// Trim whitespace and stray quote characters; drop empty items.
fn push_item(items: &mut Vec<String>, raw: &str) {
    let cleaned = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    if !cleaned.is_empty() {
        items.push(cleaned.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =================================================================
    // TOKENIZER
    // =================================================================

    #[test]
    fn tokenizes_key_value_pair() {
        let tokens = tokenize(r#""DOB": "1980-02-14","#);
        assert_eq!(
            tokens,
            vec![
                Token::Quoted("DOB".into()),
                Token::Colon,
                Token::Quoted("1980-02-14".into()),
                Token::Comma,
            ]
        );
    }

    #[test]
    fn quoted_label_keeps_parentheses() {
        let tokens = tokenize(r#""Chief Complaint (CC)": "Knee pain""#);
        assert_eq!(tokens[0], Token::Quoted("Chief Complaint (CC)".into()));
    }

    #[test]
    fn escaped_quote_inside_string() {
        let tokens = tokenize(r#""Says \"ouch\" often""#);
        assert_eq!(tokens, vec![Token::Quoted("Says \"ouch\" often".into())]);
    }

    #[test]
    fn block_keeps_nested_parentheses() {
        let tokens = tokenize("(\n  Pain worse at night (rated 7/10).\n)");
        assert_eq!(
            tokens,
            vec![Token::Block("Pain worse at night (rated 7/10).".into())]
        );
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        let tokens = tokenize("( never closed");
        assert_eq!(tokens, vec![Token::Block("never closed".into())]);
    }

    #[test]
    fn bare_words_split_on_whitespace() {
        let tokens = tokenize("120/80 mmHg,");
        assert_eq!(
            tokens,
            vec![
                Token::Word("120/80".into()),
                Token::Word("mmHg".into()),
                Token::Comma,
            ]
        );
    }

    // =================================================================
    // PARSER
    // =================================================================

    #[test]
    fn parses_outer_braces_as_top_level() {
        let tree = parse_note(r#"{ "Patient Name": "John Smith", "DOB": "1975-06-01" }"#);
        assert_eq!(tree.entries.len(), 2);
        assert_eq!(
            tree.find("Patient Name"),
            Some(&NoteValue::Text("John Smith".into()))
        );
    }

    #[test]
    fn parses_lists_with_trailing_comma() {
        let tree = parse_note("\"Orders\": [\n  \"MRI left knee\",\n  \"Physical therapy\",\n]");
        assert_eq!(
            tree.find("Orders"),
            Some(&NoteValue::List(vec![
                "MRI left knee".into(),
                "Physical therapy".into()
            ]))
        );
    }

    #[test]
    fn parses_nested_groups() {
        let tree = parse_note(
            r#""Physical Examination": {
                "General": "Alert",
                "Left Knee": { "Inspection": "Swelling", "ROM": "Limited" }
            }"#,
        );
        let Some(NoteValue::Group(exam)) = tree.find("Physical Examination") else {
            panic!("expected group");
        };
        assert_eq!(exam.len(), 2);
        assert!(matches!(&exam[1].1, NoteValue::Group(knee) if knee.len() == 2));
    }

    #[test]
    fn find_descends_into_groups() {
        let tree = parse_note(
            r#""Assessment and Plan": { "Assessment": ( Meniscal tear ), "Plan": [ "Refer" ] }"#,
        );
        assert_eq!(
            tree.find("Assessment"),
            Some(&NoteValue::Block("Meniscal tear".into()))
        );
        assert_eq!(tree.find("Plan"), Some(&NoteValue::List(vec!["Refer".into()])));
    }

    #[test]
    fn shallower_label_wins() {
        let tree = parse_note(r#""Outer": { "Provider": "Nested" }, "Provider": "Top""#);
        assert_eq!(tree.find("Provider"), Some(&NoteValue::Text("Top".into())));
    }

    #[test]
    fn unquoted_value_joins_words() {
        let tree = parse_note(r#""Heart Rate": 72 bpm, "Temp": "98.6 F""#);
        assert_eq!(tree.find("Heart Rate"), Some(&NoteValue::Text("72 bpm".into())));
        assert_eq!(tree.find("Temp"), Some(&NoteValue::Text("98.6 F".into())));
    }

    #[test]
    fn unterminated_list_closes_with_group() {
        let tree = parse_note(r#"{ "Plan": [ "Rest", "Ice" }, "Provider": "Dr. Lee""#);
        assert_eq!(
            tree.find("Plan"),
            Some(&NoteValue::List(vec!["Rest".into(), "Ice".into()]))
        );
        assert_eq!(tree.find("Provider"), Some(&NoteValue::Text("Dr. Lee".into())));
    }

    #[test]
    fn garbage_input_parses_to_empty_tree() {
        let tree = parse_note("::: ]] } , random words )) ");
        assert!(tree.entries.is_empty());
    }

    #[test]
    fn key_without_colon_is_skipped() {
        let tree = parse_note(r#""Orphan" "DOB": "2000-01-01""#);
        assert_eq!(tree.entries.len(), 1);
        assert_eq!(tree.find("DOB"), Some(&NoteValue::Text("2000-01-01".into())));
    }
}
