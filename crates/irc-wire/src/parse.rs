//! Command parser (§4.2): splits a trimmed line into an optional prefix, a verb, and up to four
//! parameters, honoring the trailing-parameter rule (a token starting with `:` absorbs the rest
//! of the line as one parameter).

pub const MAX_PARAMS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub prefix: Option<String>,
    pub verb: String,
    pub params: Vec<String>,
}

/// Parses a single line with no leading/trailing whitespace and no CRLF. The verb is upper-cased
/// for case-insensitive comparison; callers match on `verb.as_str()`.
pub fn parse_line(line: &str) -> ParsedLine {
    let mut rest = line.trim();

    let prefix = if let Some(stripped) = rest.strip_prefix(':') {
        match stripped.find(' ') {
            Some(idx) => {
                let pfx = stripped[..idx].to_owned();
                rest = stripped[idx + 1..].trim_start();
                Some(pfx)
            }
            None => {
                rest = "";
                Some(stripped.to_owned())
            }
        }
    } else {
        None
    };

    let (verb, params_str) = match rest.find(' ') {
        Some(idx) => (&rest[..idx], rest[idx + 1..].trim_start()),
        None => (rest, ""),
    };

    ParsedLine {
        prefix,
        verb: verb.to_ascii_uppercase(),
        params: parse_params(params_str),
    }
}

fn parse_params(mut rest: &str) -> Vec<String> {
    let mut params = Vec::new();
    while !rest.is_empty() && params.len() < MAX_PARAMS {
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing.to_owned());
            return params;
        }
        match rest.find(' ') {
            Some(idx) => {
                params.push(rest[..idx].to_owned());
                rest = rest[idx + 1..].trim_start();
            }
            None => {
                params.push(rest.to_owned());
                return params;
            }
        }
    }
    // At the param cap: whatever remains (including a leading ':') is one final token, matching
    // the trailing-parameter rule when the n-th token starts with ':'.
    if !rest.is_empty() {
        let last = rest.strip_prefix(':').unwrap_or(rest);
        params.push(last.to_owned());
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_command() {
        let p = parse_line("NICK john");
        assert_eq!(p.verb, "NICK");
        assert_eq!(p.params, vec!["john".to_string()]);
        assert_eq!(p.prefix, None);
    }

    #[test]
    fn trailing_parameter_absorbs_rest() {
        let p = parse_line("PRIVMSG #general :hello there world");
        assert_eq!(p.verb, "PRIVMSG");
        assert_eq!(
            p.params,
            vec!["#general".to_string(), "hello there world".to_string()]
        );
    }

    #[test]
    fn verb_is_case_folded() {
        let p = parse_line("nick john");
        assert_eq!(p.verb, "NICK");
    }

    #[test]
    fn prefixed_message() {
        let p = parse_line(":john!u@h JOIN #general");
        assert_eq!(p.prefix, Some("john!u@h".to_string()));
        assert_eq!(p.verb, "JOIN");
        assert_eq!(p.params, vec!["#general".to_string()]);
    }

    #[test]
    fn empty_line() {
        let p = parse_line("");
        assert_eq!(p.verb, "");
        assert!(p.params.is_empty());
    }

    #[test]
    fn at_most_four_params() {
        let p = parse_line("CMD a b c d e f");
        assert_eq!(p.params.len(), 4);
        assert_eq!(p.params[3], "d e f");
    }
}
