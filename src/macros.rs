//===========================================================================//

macro_rules! unsupported {
    ($e:expr) => {
        return Err($crate::error::Error::FileUnsupported(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::FileUnsupported(
            format!($fmt, $($arg)+)))
    };
}

macro_rules! malformed_config {
    ($e:expr) => {
        return Err($crate::error::Error::Unknown(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::Unknown(format!($fmt, $($arg)+)))
    };
}

//===========================================================================//
