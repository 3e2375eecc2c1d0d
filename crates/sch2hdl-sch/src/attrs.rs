//! `key=value` attribute strings carried by schematic instances.

/// Parsed attribute string, in source order.
///
/// Values are either bare runs of non-whitespace characters or double-quoted
/// strings (quotes removed, `\"` unescaped). Tokens without `=` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        let mut chars = text.chars().peekable();

        loop {
            while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
            if chars.peek().is_none() {
                break;
            }

            let mut key = String::new();
            while let Some(ch) = chars.next_if(|ch| !ch.is_whitespace() && *ch != '=') {
                key.push(ch);
            }
            if chars.next_if_eq(&'=').is_none() {
                continue;
            }

            let mut value = String::new();
            if chars.next_if_eq(&'"').is_some() {
                while let Some(ch) = chars.next() {
                    match ch {
                        '"' => break,
                        '\\' if chars.peek() == Some(&'"') => {
                            value.push('"');
                            chars.next();
                        }
                        _ => value.push(ch),
                    }
                }
            } else {
                while let Some(ch) = chars.next_if(|ch| !ch.is_whitespace()) {
                    value.push(ch);
                }
            }

            if !key.is_empty() {
                entries.push((key, value));
            }
        }

        Self { entries }
    }

    /// First non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}
