// src/macros.rs

/// `s!()` is an empty `String`; `s!(x)` is `String::from(x)`.
#[macro_export]
macro_rules! s {
    () => {
        ::std::string::String::new()
    };
    ($v:expr) => {
        ::std::string::String::from($v)
    };
}

/// Concatenate string slices into a fresh `String`.
#[macro_export]
macro_rules! join {
    ($($part:expr),+ $(,)?) => {{
        let mut out = ::std::string::String::new();
        $( out.push_str($part); )+
        out
    }};
}
