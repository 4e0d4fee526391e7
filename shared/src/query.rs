//! Minimal `key=value&key2=value2` query string reading.

/// Return the decoded value of the `key` pair in `raw`.
///
/// A leading `?` is ignored. A key given more than once is ambiguous and
/// counts as absent, as do pairs whose value fails to decode and empty values.
pub fn query_param(raw: &str, key: &str) -> Option<String> {
    let query = raw.trim().trim_start_matches('?');
    if query.is_empty() {
        return None;
    }

    let mut found: Option<&str> = None;
    for pair in query.split('&') {
        let mut kv = pair.splitn(2, '=');
        let raw_key = kv.next().unwrap_or("");
        let Some(decoded_key) = decode_component(raw_key) else {
            continue;
        };
        if decoded_key != key {
            continue;
        }
        if found.is_some() {
            return None;
        }
        found = Some(kv.next().unwrap_or(""));
    }

    let value = decode_component(found?)?;
    if value.is_empty() {
        return None;
    }
    Some(value)
}

/// Form-style decoding: `+` is a space, `%XX` is a raw byte.
fn decode_component(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hi = hex_value(*bytes.get(i + 1)?)?;
                let lo = hex_value(*bytes.get(i + 2)?)?;
                out.push((hi << 4) | lo);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_value_with_or_without_leading_question_mark() {
        assert_eq!(query_param("?id=sf", "id").as_deref(), Some("sf"));
        assert_eq!(query_param("id=sf", "id").as_deref(), Some("sf"));
        assert_eq!(
            query_param("?lang=en&id=nyc&x=1", "id").as_deref(),
            Some("nyc")
        );
    }

    #[test]
    fn repeated_key_is_absent() {
        assert_eq!(query_param("?id=a&id=b", "id"), None);
        assert_eq!(query_param("?id=a&id=a", "id"), None);
        assert_eq!(query_param("?id=a&%69d=b", "id"), None);
        assert_eq!(query_param("?id=a&idx=b", "id").as_deref(), Some("a"));
    }

    #[test]
    fn missing_or_empty_values_are_absent() {
        assert_eq!(query_param("", "id"), None);
        assert_eq!(query_param("?", "id"), None);
        assert_eq!(query_param("?id=", "id"), None);
        assert_eq!(query_param("?id", "id"), None);
        assert_eq!(query_param("?identity=sf", "id"), None);
        assert_eq!(query_param("?ID=sf", "id"), None);
    }

    #[test]
    fn decodes_percent_escapes_and_plus() {
        assert_eq!(
            query_param("?id=s%C3%A3o+paulo", "id").as_deref(),
            Some("são paulo")
        );
        assert_eq!(query_param("?%69d=sf", "id").as_deref(), Some("sf"));
    }

    #[test]
    fn malformed_escapes_are_absent() {
        assert_eq!(query_param("?id=%zz", "id"), None);
        assert_eq!(query_param("?id=abc%4", "id"), None);
        assert_eq!(query_param("?id=%ff", "id"), None);
    }
}
