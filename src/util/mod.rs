#[macro_export]
#[cfg(debug_assertions)]
macro_rules! log_debug {
    ($($x:tt)*) => {{
        eprint!("[debug] ");
        eprintln!($($x)*);
    }}
}

#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! log_debug {
    ($($x:tt)*) => {}
}

#[inline]
pub fn is_letter(c: u8) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_uppercase() || c == b'_'
}

#[inline]
pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub fn is_whitespace(c: u8) -> bool {
    c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'
}
