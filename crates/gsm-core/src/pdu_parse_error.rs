#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PduParseErr {
    BufferEnded { field: Option<&'static str> },
    InvalidValue { field: &'static str, value: u64 },
    InconsistentLength { expected: usize, found: usize },
    /// Frame uses an encoding this layer declines to handle (multi-octet fields, segmentation)
    UnsupportedFraming { field: &'static str },
    NotImplemented { field: Option<&'static str> },
}

/// Reads the next octet from an OctetBuffer into a binding of the same name,
/// returning PduParseErr::BufferEnded from the enclosing function if none is left
#[macro_export]
macro_rules! let_octet {
    ($buf:expr, $ident:ident) => {
        let $ident = $buf.read_field(stringify!($ident))?;
    };
}
