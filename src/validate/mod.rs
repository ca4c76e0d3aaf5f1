//! Input predicates checked before a request is built.

/// Loose e-mail address check.
///
/// An address passes when it contains an `@` that is neither its first nor
/// its last character, does not end with `.`, and has a `.` more than three
/// characters after the last `@`.
///
/// ```
/// use fakestore::validate::is_valid_email;
///
/// assert!(is_valid_email("baz@bar.foo"));
/// assert!(!is_valid_email("b@z"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    let chars: Vec<char> = email.chars().collect();
    let Some(at) = chars.iter().rposition(|&c| c == '@') else {
        return false;
    };
    if at == 0 || at == chars.len() - 1 || chars.last() == Some(&'.') {
        return false;
    }
    match chars.iter().rposition(|&c| c == '.') {
        Some(dot) => dot > at && dot - at > 3,
        None => false,
    }
}
