//! The command table the standard graph is built from.
//!
//! Each entry pairs a byte pattern with the handler its leaf dispatches.
//! Patterns are `u16` sequences: values up to `0xFF` are literal
//! codepoints, values above are in-band parameter markers. A `NUM` or
//! `TEXT` marker is followed by its terminator; `MULTI` is followed by its
//! separator and terminator. 8-bit C1 introducers are used throughout;
//! the runtime promotes 7-bit `ESC x` forms before the graph sees them.

/// Single numeric parameter (digits, default 0); next entry terminates.
pub(crate) const NUM: u16 = 0x0100;
/// Separator-delimited numeric list; next two entries are separator and
/// terminator.
pub(crate) const MULTI: u16 = 0x0101;
/// Free-text parameter; next entry terminates.
pub(crate) const TEXT: u16 = 0x0102;
/// One codepoint captured verbatim.
pub(crate) const CHAR: u16 = 0x0103;

const ESC: u16 = 0x1b;
const DCS: u16 = 0x90;
const CSI: u16 = 0x9b;
const OSC: u16 = 0x9d;
const PM: u16 = 0x9e;
const APC: u16 = 0x9f;
const ST: u16 = 0x9c;
const BEL: u16 = 0x07;

/// Named dispatch targets. The emulator owns the implementations; a leaf
/// node stores one of these instead of a function pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerId {
    /// Shared control/print leaf: execute a control code or print a cell.
    Process,
    Ignored,
    Disable8BitControls,
    Enable8BitControls,
    DecDoubleHeightTop,
    DecDoubleHeightBottom,
    DecSingleWidth,
    DecDoubleWidth,
    DecScreenAlignmentTest,
    DesignateCharset94,
    DesignateCharset96,
    SaveCursor,
    RestoreCursor,
    ApplicationKeypad,
    NormalKeypad,
    ResetEmulator,
    InvokeCharset,
    InsertCharacters,
    CursorUp,
    CursorDown,
    CursorForward,
    CursorBackward,
    CursorNextLine,
    CursorPreviousLine,
    CursorHorizontalAbsolute,
    CursorPosition,
    TabForward,
    EraseInDisplay,
    SelectiveEraseInDisplay,
    EraseInLine,
    SelectiveEraseInLine,
    InsertLines,
    DeleteLines,
    DeleteCharacters,
    ScrollUp,
    ScrollDown,
    ResetTitleModes,
    SetTitleModes,
    EraseCharacters,
    TabBackward,
    RepeatCharacter,
    SendDeviceAttributes,
    SendDeviceAttributes2,
    CursorVerticalAbsolute,
    TabClear,
    SetMode,
    ResetMode,
    DecPrivateModeSet,
    DecPrivateModeReset,
    DecPrivateModeSave,
    DecPrivateModeRestore,
    ModeRequest,
    DecPrivateModeRequest,
    CharacterAttributes,
    DeviceStatusReport,
    SetCursorStyle,
    ProtectionAttribute,
    SetTopBottomMargins,
    SetLeftRightMargins,
    WindowOps,
    DcsRequestStatusString,
    OscDispatch,
}

pub(crate) struct Command {
    pub pattern: &'static [u16],
    pub handler: HandlerId,
}

macro_rules! seq {
    ($($x:expr),+ $(,)?) => { &[$($x as u16),+] };
}

macro_rules! def {
    ($pattern:expr, $handler:ident) => {
        Command {
            pattern: $pattern,
            handler: HandlerId::$handler,
        }
    };
}

pub(crate) static COMMANDS: &[Command] = &[
    // ESC-level commands
    def!(seq![ESC, ' ', 'F'], Disable8BitControls),
    def!(seq![ESC, ' ', 'G'], Enable8BitControls),
    def!(seq![ESC, '#', '3'], DecDoubleHeightTop),
    def!(seq![ESC, '#', '4'], DecDoubleHeightBottom),
    def!(seq![ESC, '#', '5'], DecSingleWidth),
    def!(seq![ESC, '#', '6'], DecDoubleWidth),
    def!(seq![ESC, '#', '8'], DecScreenAlignmentTest),
    def!(seq![ESC, '%', CHAR], Ignored),
    def!(seq![ESC, '(', CHAR], DesignateCharset94),
    def!(seq![ESC, ')', CHAR], DesignateCharset94),
    def!(seq![ESC, '*', CHAR], DesignateCharset94),
    def!(seq![ESC, '+', CHAR], DesignateCharset94),
    def!(seq![ESC, '-', CHAR], DesignateCharset96),
    def!(seq![ESC, '.', CHAR], DesignateCharset96),
    def!(seq![ESC, '/', CHAR], DesignateCharset96),
    def!(seq![ESC, '7'], SaveCursor),
    def!(seq![ESC, '8'], RestoreCursor),
    def!(seq![ESC, '='], ApplicationKeypad),
    def!(seq![ESC, '>'], NormalKeypad),
    def!(seq![ESC, 'c'], ResetEmulator),
    def!(seq![ESC, 'n'], InvokeCharset),
    def!(seq![ESC, 'o'], InvokeCharset),
    def!(seq![ESC, '|'], InvokeCharset),
    def!(seq![ESC, '}'], InvokeCharset),
    def!(seq![ESC, '~'], InvokeCharset),
    // CSI commands
    def!(seq![CSI, NUM, '@'], InsertCharacters),
    def!(seq![CSI, NUM, 'A'], CursorUp),
    def!(seq![CSI, NUM, 'B'], CursorDown),
    def!(seq![CSI, NUM, 'C'], CursorForward),
    def!(seq![CSI, NUM, 'D'], CursorBackward),
    def!(seq![CSI, NUM, 'E'], CursorNextLine),
    def!(seq![CSI, NUM, 'F'], CursorPreviousLine),
    def!(seq![CSI, NUM, 'G'], CursorHorizontalAbsolute),
    def!(seq![CSI, MULTI, ';', 'H'], CursorPosition),
    def!(seq![CSI, NUM, 'I'], TabForward),
    def!(seq![CSI, NUM, 'J'], EraseInDisplay),
    def!(seq![CSI, '?', NUM, 'J'], SelectiveEraseInDisplay),
    def!(seq![CSI, NUM, 'K'], EraseInLine),
    def!(seq![CSI, '?', NUM, 'K'], SelectiveEraseInLine),
    def!(seq![CSI, NUM, 'L'], InsertLines),
    def!(seq![CSI, NUM, 'M'], DeleteLines),
    def!(seq![CSI, NUM, 'P'], DeleteCharacters),
    def!(seq![CSI, NUM, 'S'], ScrollUp),
    def!(seq![CSI, NUM, 'T'], ScrollDown),
    def!(seq![CSI, '>', MULTI, ';', 'T'], ResetTitleModes),
    def!(seq![CSI, NUM, 'X'], EraseCharacters),
    def!(seq![CSI, NUM, 'Z'], TabBackward),
    def!(seq![CSI, NUM, '`'], CursorHorizontalAbsolute),
    def!(seq![CSI, NUM, 'a'], CursorForward),
    def!(seq![CSI, NUM, 'b'], RepeatCharacter),
    def!(seq![CSI, NUM, 'c'], SendDeviceAttributes),
    def!(seq![CSI, '>', NUM, 'c'], SendDeviceAttributes2),
    def!(seq![CSI, NUM, 'd'], CursorVerticalAbsolute),
    def!(seq![CSI, NUM, 'e'], CursorDown),
    def!(seq![CSI, MULTI, ';', 'f'], CursorPosition),
    def!(seq![CSI, NUM, 'g'], TabClear),
    def!(seq![CSI, MULTI, ';', 'h'], SetMode),
    def!(seq![CSI, '?', MULTI, ';', 'h'], DecPrivateModeSet),
    def!(seq![CSI, MULTI, ';', 'l'], ResetMode),
    def!(seq![CSI, '?', MULTI, ';', 'l'], DecPrivateModeReset),
    def!(seq![CSI, MULTI, ';', 'm'], CharacterAttributes),
    def!(seq![CSI, NUM, 'n'], DeviceStatusReport),
    def!(seq![CSI, '!', 'p'], ResetEmulator),
    def!(seq![CSI, NUM, '$', 'p'], ModeRequest),
    def!(seq![CSI, '?', NUM, '$', 'p'], DecPrivateModeRequest),
    def!(seq![CSI, MULTI, ';', '"', 'p'], Ignored),
    def!(seq![CSI, NUM, '"', 'q'], ProtectionAttribute),
    def!(seq![CSI, NUM, ' ', 'q'], SetCursorStyle),
    def!(seq![CSI, MULTI, ';', 'r'], SetTopBottomMargins),
    def!(seq![CSI, '?', MULTI, ';', 'r'], DecPrivateModeRestore),
    def!(seq![CSI, MULTI, ';', 's'], SetLeftRightMargins),
    def!(seq![CSI, '?', MULTI, ';', 's'], DecPrivateModeSave),
    def!(seq![CSI, MULTI, ';', 't'], WindowOps),
    def!(seq![CSI, '>', MULTI, ';', 't'], SetTitleModes),
    def!(seq![CSI, 'u'], RestoreCursor),
    // DCS commands
    def!(seq![DCS, '+', 'p', TEXT, ST], Ignored),
    def!(seq![DCS, '+', 'q', TEXT, ST], Ignored),
    def!(seq![DCS, NUM, ';', NUM, '|', TEXT, ST], Ignored),
    def!(seq![DCS, '$', 'q', TEXT, ST], DcsRequestStatusString),
    // OSC in its four terminator forms
    def!(seq![OSC, NUM, BEL], OscDispatch),
    def!(seq![OSC, NUM, ST], OscDispatch),
    def!(seq![OSC, NUM, ';', TEXT, BEL], OscDispatch),
    def!(seq![OSC, NUM, ';', TEXT, ST], OscDispatch),
    // PM and APC bodies are consumed and dropped
    def!(seq![PM, TEXT, ST], Ignored),
    def!(seq![APC, TEXT, ST], Ignored),
];
