/// Strips decorative parentheses from a track title.
///
/// Only titles that *start* with `(` are touched, and for those every `(` and
/// `)` in the string is removed, wherever it sits. `"(Echo) (Live)"` becomes
/// `"Echo Live"`, while `"Echo (Live)"` is returned as-is.
pub fn normalize_title(title: &str) -> String {
    if title.starts_with('(') {
        title.replace(['(', ')'], "")
    } else {
        title.to_string()
    }
}
