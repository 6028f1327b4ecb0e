//! Lenient rewrite of almost-JSON into strict JSON.
//!
//! Handles what language models commonly get wrong: single-quoted strings,
//! bare keys and words, Python literals, trailing or missing commas, raw
//! newlines inside strings, and output cut off before the closing brackets.

/// Nesting depth after which the rest of the input is dropped.
const MAX_DEPTH: usize = 256;

/// Rewrite `text` into strict JSON text.
///
/// Returns `None` when `text` does not start with `{` or `[`; prose is not
/// turned into a JSON string. Anything after the first complete value is
/// ignored. The result is not guaranteed to parse, only far more likely to.
pub fn repair_json(text: &str) -> Option<String> {
    let trimmed = text.trim_start().trim_start_matches('\u{feff}');
    if !trimmed.starts_with(['{', '[']) {
        return None;
    }
    let mut repairer = Repairer::new(trimmed);
    repairer.value(0);
    Some(repairer.out)
}

struct Repairer {
    chars: Vec<char>,
    pos: usize,
    out: String,
}

impl Repairer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            out: String::with_capacity(text.len() + 16),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn skip_ws_and_commas(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace() || c == ',') {
            self.pos += 1;
        }
    }

    fn value(&mut self, depth: usize) {
        if depth >= MAX_DEPTH {
            self.out.push_str("null");
            self.pos = self.chars.len();
            return;
        }
        self.skip_ws();
        match self.peek() {
            None | Some(',' | '}' | ']') => self.out.push_str("null"),
            Some('{') => self.object(depth + 1),
            Some('[') => self.array(depth + 1),
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.string(quote);
            }
            Some(_) => self.bare_value(),
        }
    }

    fn object(&mut self, depth: usize) {
        self.pos += 1;
        self.out.push('{');
        let mut first = true;
        loop {
            self.skip_ws_and_commas();
            match self.peek() {
                None | Some(']') => break,
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }
            if !first {
                self.out.push(',');
            }
            first = false;

            self.key();
            self.skip_ws();
            if self.peek() == Some(':') {
                self.pos += 1;
            }
            self.out.push(':');
            self.skip_ws();
            match self.peek() {
                None | Some(',' | '}' | ']') => self.out.push_str("null"),
                _ => self.value(depth),
            }
        }
        self.out.push('}');
    }

    fn array(&mut self, depth: usize) {
        self.pos += 1;
        self.out.push('[');
        let mut first = true;
        loop {
            self.skip_ws_and_commas();
            match self.peek() {
                None | Some('}') => break,
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }
            if !first {
                self.out.push(',');
            }
            first = false;
            self.value(depth);
        }
        self.out.push(']');
    }

    fn key(&mut self) {
        if let Some(quote @ ('"' | '\'')) = self.peek() {
            self.pos += 1;
            self.string(quote);
            return;
        }
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && !matches!(c, ':' | ',' | '{' | '}' | '[' | ']'))
        {
            self.pos += 1;
        }
        let key: String = self.chars[start..self.pos].iter().collect();
        push_json_string(&mut self.out, &key);
    }

    /// Quoted string. A quote matching the opener only closes the string when
    /// what follows looks like JSON structure; otherwise it is kept as text.
    fn string(&mut self, quote: char) {
        self.out.push('"');
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => self.escape(),
                c if c == quote && self.closes_string() => break,
                c => push_escaped(&mut self.out, c),
            }
        }
        self.out.push('"');
    }

    fn escape(&mut self) {
        match self.peek() {
            Some(n @ ('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')) => {
                self.pos += 1;
                self.out.push('\\');
                self.out.push(n);
            }
            Some('u') if self.hex_follows() => {
                self.out.push('\\');
                for _ in 0..5 {
                    if let Some(c) = self.peek() {
                        self.out.push(c);
                    }
                    self.pos += 1;
                }
            }
            Some('\'') => {
                self.pos += 1;
                self.out.push('\'');
            }
            _ => self.out.push_str("\\\\"),
        }
    }

    fn hex_follows(&self) -> bool {
        self.chars
            .get(self.pos + 1..self.pos + 5)
            .is_some_and(|digits| digits.iter().all(char::is_ascii_hexdigit))
    }

    fn closes_string(&self) -> bool {
        let mut saw_newline = false;
        for &c in &self.chars[self.pos..] {
            if c == '\n' {
                saw_newline = true;
            } else if !c.is_whitespace() {
                return matches!(c, ',' | '}' | ']' | ':') || saw_newline;
            }
        }
        true
    }

    /// Unquoted token: a literal, a number, or text to be quoted.
    ///
    /// Number-like tokens end at whitespace so `[1 2]` reads as two values;
    /// words run to the next delimiter so `Music Videos` stays one string.
    fn bare_value(&mut self) {
        let start = self.pos;
        let numeric = self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
        while self.peek().is_some_and(|c| {
            !matches!(c, ',' | '}' | ']' | '"' | '\n' | '\r') && !(numeric && c.is_whitespace())
        }) {
            self.pos += 1;
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        let token = token.trim();
        match token {
            "" => self.out.push_str("null"),
            "true" | "True" | "TRUE" => self.out.push_str("true"),
            "false" | "False" | "FALSE" => self.out.push_str("false"),
            "null" | "Null" | "NULL" | "None" | "undefined" | "NaN" => self.out.push_str("null"),
            _ => match normalize_number(token) {
                Some(number) => self.out.push_str(&number),
                None => push_json_string(&mut self.out, token),
            },
        }
    }
}

/// `token` as a strict JSON number, fixing `+1`, `.5` and `1.` forms.
fn normalize_number(token: &str) -> Option<String> {
    let (sign, digits) = match token.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", token.strip_prefix('+').unwrap_or(token)),
    };
    let mut number = String::from(sign);
    if digits.starts_with('.') {
        number.push('0');
    }
    number.push_str(digits);
    if number.ends_with('.') {
        number.push('0');
    }
    serde_json::from_str::<serde_json::Number>(&number)
        .ok()
        .map(|_| number)
}

fn push_json_string(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        push_escaped(out, c);
    }
    out.push('"');
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => out.push(c),
    }
}

#[cfg(test)]
#[path = "tests/repair_tests.rs"]
mod tests;
