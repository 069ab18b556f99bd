//! Tokenizer for provider command templates.
//!
//! A template is literal text interleaved with `{{ ... }}` blocks. Each block
//! holds exactly one call:
//!
//! ```text
//! sai_<kind>(<index>, '<field.path>'[, '<provider>'])
//! ```
//!
//! Quotes may be single or double and whitespace is free.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*sai_([a-z_]+)\s*\(\s*(\d+)\s*,\s*['"]([^'"]*)['"]\s*(?:,\s*['"]([^'"]*)['"]\s*)?\)\s*$"#,
    )
    .expect("call pattern is valid")
});

/// Entity kind addressed by a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `sai_package`
    Package,
    /// `sai_service`
    Service,
    /// `sai_file`
    File,
    /// `sai_directory`
    Directory,
    /// `sai_command`
    Command,
    /// `sai_port`
    Port,
    /// `sai_container`
    Container,
    /// `sai_source`
    Source,
    /// `sai_binary`
    Binary,
    /// `sai_script`
    Script,
}

impl Kind {
    /// All kinds.
    pub const ALL: [Kind; 10] = [
        Kind::Package,
        Kind::Service,
        Kind::File,
        Kind::Directory,
        Kind::Command,
        Kind::Port,
        Kind::Container,
        Kind::Source,
        Kind::Binary,
        Kind::Script,
    ];

    /// Name as used after the `sai_` prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Package => "package",
            Kind::Service => "service",
            Kind::File => "file",
            Kind::Directory => "directory",
            Kind::Command => "command",
            Kind::Port => "port",
            Kind::Container => "container",
            Kind::Source => "source",
            Kind::Binary => "binary",
            Kind::Script => "script",
        }
    }

    /// Parse a kind name.
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single `sai_*` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Entity kind.
    pub kind: Kind,
    /// Position in the entity sequence.
    pub index: usize,
    /// Dot-separated field path.
    pub field_path: String,
    /// Provider context overriding the engine's.
    pub provider: Option<String>,
}

impl Call {
    /// Field path split into components.
    pub fn path_components(&self) -> Vec<&str> {
        self.field_path.split('.').collect()
    }
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text copied verbatim.
    Literal(String),
    /// A call to resolve.
    Call(Call),
}

/// A parsed template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    /// Parse template text into tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for an unterminated block, a block that is not
    /// a single `sai_*` call, an unknown kind, or an empty field path.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut rest = text;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                tokens.push(Token::Literal(rest[..start].to_string()));
            }
            let body_start = start + OPEN.len();
            let Some(len) = rest[body_start..].find(CLOSE) else {
                return Err(Error::parse(offset + start, "unterminated '{{' block"));
            };
            let body = &rest[body_start..body_start + len];
            tokens.push(Token::Call(parse_call(body, offset + start)?));

            let consumed = body_start + len + CLOSE.len();
            rest = &rest[consumed..];
            offset += consumed;
        }

        if !rest.is_empty() {
            tokens.push(Token::Literal(rest.to_string()));
        }

        Ok(Self { tokens })
    }

    /// Tokens in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Calls in order of appearance.
    pub fn calls(&self) -> impl Iterator<Item = &Call> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Call(call) => Some(call),
            Token::Literal(_) => None,
        })
    }
}

fn parse_call(body: &str, offset: usize) -> Result<Call> {
    let caps = CALL_RE
        .captures(body)
        .ok_or_else(|| Error::parse(offset, format!("expected sai_<kind>(index, 'field'), got '{}'", body.trim())))?;

    let kind = Kind::from_name(&caps[1])
        .ok_or_else(|| Error::parse(offset, format!("unknown function 'sai_{}'", &caps[1])))?;
    let index = caps[2]
        .parse::<usize>()
        .map_err(|e| Error::parse(offset, format!("bad index '{}': {e}", &caps[2])))?;
    let field_path = caps[3].trim().to_string();
    if field_path.is_empty() || field_path.split('.').any(str::is_empty) {
        return Err(Error::parse(offset, format!("bad field path '{field_path}'")));
    }
    let provider = caps
        .get(4)
        .map(|m| m.as_str().trim().to_string())
        .filter(|p| !p.is_empty());

    Ok(Call {
        kind,
        index,
        field_path,
        provider,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(kind: Kind, index: usize, path: &str, provider: Option<&str>) -> Token {
        Token::Call(Call {
            kind,
            index,
            field_path: path.to_string(),
            provider: provider.map(str::to_string),
        })
    }

    #[test]
    fn test_parse_literals_and_calls() {
        let template =
            Template::parse("apt-get install -y {{sai_package(0, 'package_name')}} && echo ok")
                .unwrap();
        assert_eq!(
            template.tokens(),
            &[
                Token::Literal("apt-get install -y ".to_string()),
                call(Kind::Package, 0, "package_name", None),
                Token::Literal(" && echo ok".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_whitespace_quotes_and_provider() {
        let template =
            Template::parse(r#"{{  sai_binary( 2 ,"archive.format" , 'brew' )  }}"#).unwrap();
        assert_eq!(
            template.tokens(),
            &[call(Kind::Binary, 2, "archive.format", Some("brew"))]
        );
    }

    #[test]
    fn test_parse_plain_text() {
        let template = Template::parse("systemctl daemon-reload").unwrap();
        assert_eq!(template.calls().count(), 0);
        assert!(Template::parse("").unwrap().tokens().is_empty());
    }

    #[test]
    fn test_parse_adjacent_calls() {
        let template =
            Template::parse("{{sai_source(0,'url')}}{{sai_source(0,'version')}}").unwrap();
        assert_eq!(template.calls().count(), 2);
        assert_eq!(template.tokens().len(), 2);
    }

    #[test]
    fn test_parse_errors() {
        for text in [
            "install {{sai_package(0, 'name')",
            "{{sai_widget(0, 'name')}}",
            "{{sai_package('x', 'name')}}",
            "{{sai_package(0, '')}}",
            "{{sai_package(0, 'a..b')}}",
            "{{ version }}",
            "{{sai_package(99999999999999999999999, 'name')}}",
        ] {
            let err = Template::parse(text).unwrap_err();
            assert!(matches!(err, Error::Parse { .. }), "{text}: {err}");
        }
    }

    #[test]
    fn test_parse_error_offset() {
        let err = Template::parse("abc {{nope}}").unwrap_err();
        assert_eq!(
            err,
            Error::Parse {
                offset: 4,
                message: "expected sai_<kind>(index, 'field'), got 'nope'".to_string(),
            }
        );
    }

    #[test]
    fn test_kind_names() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(Kind::from_name("widget"), None);
    }
}
