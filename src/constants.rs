// Constants for the front end

/// Longest identifier the scanner accepts
pub const MAX_IDENTIFIER_LENGTH: usize = 10;

/// Longest source line before a lexical diagnostic is raised
pub const MAX_LINE_LENGTH: usize = 72;

/// Longest digit run for an integer literal
pub const MAX_INTEGER_DIGITS: usize = 10;

/// Longest whole part of a real or long-real literal
pub const MAX_WHOLE_DIGITS: usize = 5;

/// Longest fractional part of a real or long-real literal
pub const MAX_FRACTION_DIGITS: usize = 5;

/// Longest exponent of a long-real literal
pub const MAX_EXPONENT_DIGITS: usize = 2;

/// Storage size of an `integer` variable in bytes
pub const INTEGER_SIZE: usize = 4;

/// Storage size of a `real` variable in bytes
pub const REAL_SIZE: usize = 8;

/// Printed in place of an offset for bindings that get their storage from the
/// calling convention (parameters, program and procedure names)
pub const OFFSET_SENTINEL: &str = "N/A";
