//! Tag encoding for hstore columns loaded through COPY.
//!
//! Tags are written in the quoted external hstore form (`"k"=>"v","k2"=>"v2"`)
//! and that text then travels inside a COPY text-format row, so escaping
//! happens at two levels: hstore escapes `\` and `"` with a backslash, and
//! COPY needs every backslash doubled and tab/CR/LF escaped.

/// Escape a key or value for quoted hstore inside a COPY field.
fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            // hstore `\\`, each backslash doubled for COPY
            '\\' => out.push_str("\\\\\\\\"),
            // hstore `\"`, backslash doubled for COPY
            '"' => out.push_str("\\\\\""),
            '\t' => out.push_str("\\\t"),
            '\r' => out.push_str("\\\r"),
            '\n' => out.push_str("\\\n"),
            c => out.push(c),
        }
    }
}

/// Encode a tag list, in input order. Empty input encodes to `""`.
pub fn encode<K, V>(tags: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::new();
    for (i, (k, v)) in tags.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        push_escaped(&mut out, k.as_ref());
        out.push_str("\"=>\"");
        push_escaped(&mut out, v.as_ref());
        out.push('"');
    }
    out
}

/// Escape free text (user names) for a COPY text-format field.
pub fn escape_copy(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}
