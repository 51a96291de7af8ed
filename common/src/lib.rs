pub mod common_error;
pub mod limites;
pub mod validacion;

pub type CommonResult<T> = Result<T, common_error::CommonError>;

/// Escapes control characters so a multi line payload can travel inside a
/// single newline terminated frame.
pub fn to_raw_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            '\\' => "\\\\".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Inverse of [`to_raw_string`].
pub fn from_raw_string(s: &str) -> String {
    let mut salida = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            salida.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => salida.push('\n'),
            Some('r') => salida.push('\r'),
            Some('t') => salida.push('\t'),
            Some('\\') => salida.push('\\'),
            Some(otro) => {
                salida.push('\\');
                salida.push(otro);
            }
            None => salida.push('\\'),
        }
    }
    salida
}
