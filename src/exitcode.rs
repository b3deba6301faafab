//! Process exit codes, taken from BSD sysexits.h

/// Bad arguments or no command
pub const USAGE: i32 = 64;

/// Rejected topology edit, invalid store file
pub const DATAERR: i32 = 65;

/// Unknown line or station
pub const NOINPUT: i32 = 66;

/// Chain found inconsistent, other internal faults
pub const SOFTWARE: i32 = 70;

/// Store could not be read or written
pub const IOERR: i32 = 74;

/// Unreadable or malformed settings
pub const CONFIG: i32 = 78;
