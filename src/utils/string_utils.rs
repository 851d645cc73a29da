use crate::core::error::UnescapeError;

/// Interprets backslash escape sequences embedded literally in query text
///
/// Dataset exports often store Cypher with `\n`, `\t` or `\'` written out as
/// two characters. Recognised escapes: `\\ \' \" \a \b \f \n \r \t \v`,
/// octal `\ooo`, `\xhh`, `\uhhhh`, `\Uhhhhhhhh` and backslash-newline
/// (removed). Unknown escapes such as `\d` are kept verbatim.
pub fn unescape_query(s: &str) -> Result<String, UnescapeError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices().peekable();

    while let Some((position, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some((_, escape)) = chars.next() else {
            return Err(UnescapeError::TrailingBackslash { position });
        };
        match escape {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code_point = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|(_, c)| c.to_digit(8)) {
                        Some(digit) => {
                            code_point = code_point * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(to_char(code_point, position)?);
            }
            'x' | 'u' | 'U' => {
                let width = match escape {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut code_point = 0u32;
                for _ in 0..width {
                    let digit = chars
                        .next()
                        .and_then(|(_, c)| c.to_digit(16))
                        .ok_or(UnescapeError::TruncatedEscape { escape, position })?;
                    code_point = code_point * 16 + digit;
                }
                out.push(to_char(code_point, position)?);
            }
            'N' => return Err(UnescapeError::NamedEscape { position }),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn to_char(code_point: u32, position: usize) -> Result<char, UnescapeError> {
    char::from_u32(code_point).ok_or(UnescapeError::InvalidCodePoint {
        code_point,
        position,
    })
}

/// Keeps only the text after the last `.` of a column or property key, trimmed
///
/// `"n.name"` becomes `"name"`, `"count(*)"` stays as is.
pub fn strip_namespace(key: &str) -> &str {
    match key.rsplit_once('.') {
        Some((_, last)) => last.trim(),
        None => key.trim(),
    }
}
