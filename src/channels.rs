//! Channel names that cross the bridge.
//!
//! These strings are compatibility-significant: the sandboxed surface refers
//! to them literally.

/// Pick a directory. Replies with an array of absolute paths.
pub const SHOW_OPEN_DIRECTORY_DIALOG: &str = "showOpenDirectoryDialog";

/// Pick a `.png` file. Replies with an array of absolute paths.
pub const SHOW_OPEN_PNG_DIALOG: &str = "showOpenPngDialog";

/// Choose a `.png` save target. Replies with a single absolute path.
pub const SHOW_SAVE_PNG_DIALOG: &str = "showSavePngDialog";

/// Directory predicate. Argument: absolute path string. Replies with a bool.
pub const IS_DIRECTORY: &str = "is_directory";

/// Gated read. Argument: absolute path string. Replies with base64 bytes.
pub const READ_FILE: &str = "readFile";

/// Gated write. Argument: `{ "path": .., "data": <base64> }`. Replies with null.
pub const WRITE_FILE: &str = "writeFile";

/// Menu: File > Import PNG. No payload.
pub const IMPORT_PNG: &str = "import_png";

/// Menu: File > Export PNG. No payload.
pub const EXPORT_PNG: &str = "export_png";

/// Fired once after the surface is created. Payload: `{ "message": .. }`.
pub const TIMER_TICK: &str = "timer_tick";

/// Every request/response channel the standard surface may call.
pub const CALLS: &[&str] = &[
    SHOW_OPEN_DIRECTORY_DIALOG,
    SHOW_OPEN_PNG_DIALOG,
    SHOW_SAVE_PNG_DIALOG,
    IS_DIRECTORY,
    READ_FILE,
    WRITE_FILE,
];

/// Every broadcast channel the standard surface may subscribe to.
pub const BROADCASTS: &[&str] = &[IMPORT_PNG, EXPORT_PNG, TIMER_TICK];
