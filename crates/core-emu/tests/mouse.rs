//! Mouse tracking modes and wire encodings through the emulator surface.

use core_emu::mouse::{MouseEvent, MouseEventFlags};
use core_emu::Emulator;

fn emu_with(modes: &str) -> Emulator {
    let mut e = Emulator::new();
    e.process_str(modes);
    e
}

#[test]
fn no_tracking_no_bytes() {
    let mut e = Emulator::new();
    e.mouse_event(&MouseEvent::press(1), 3, 4);
    assert!(e.take_replies().is_empty());
}

#[test]
fn x10_mode_legacy_wire() {
    let mut e = emu_with("\x1b[?9h");
    e.mouse_event(&MouseEvent::press(1), 0, 0);
    assert_eq!(e.take_replies(), b"\x1b[M\x20\x21\x21");
    e.mouse_event(&MouseEvent::release(1), 0, 0);
    assert!(e.take_replies().is_empty());
}

#[test]
fn normal_mode_press_and_release() {
    let mut e = emu_with("\x1b[?1000h");
    e.mouse_event(&MouseEvent::press(3), 9, 19);
    e.mouse_event(&MouseEvent::release(3), 9, 19);
    // Press encodes button 2, release collapses to 3 on the legacy wire.
    assert_eq!(e.take_replies(), b"\x1b[M\x22\x2a\x34\x1b[M\x23\x2a\x34");
}

#[test]
fn sgr_wire_distinguishes_release() {
    let mut e = emu_with("\x1b[?1000h\x1b[?1006h");
    e.mouse_event(&MouseEvent::press(1), 4, 5);
    e.mouse_event(&MouseEvent::release(1), 4, 5);
    assert_eq!(e.take_replies(), b"\x1b[<0;5;6M\x1b[<0;5;6m");
}

#[test]
fn urxvt_wire() {
    let mut e = emu_with("\x1b[?1000h\x1b[?1015h");
    e.mouse_event(&MouseEvent::press(2), 0, 1);
    assert_eq!(e.take_replies(), b"\x1b[33;1;2M");
}

#[test]
fn button_event_mode_reports_drags() {
    let mut e = emu_with("\x1b[?1002h\x1b[?1006h");
    e.mouse_event(&MouseEvent::motion(1), 2, 2);
    assert_eq!(e.take_replies(), b"\x1b[<32;3;3M");
    // Motion without a held button stays silent in this mode.
    e.mouse_event(&MouseEvent::motion(0), 2, 2);
    assert!(e.take_replies().is_empty());
}

#[test]
fn any_event_mode_reports_plain_motion() {
    let mut e = emu_with("\x1b[?1003h\x1b[?1006h");
    e.mouse_event(&MouseEvent::motion(0), 2, 2);
    assert_eq!(e.take_replies(), b"\x1b[<35;3;3M");
}

#[test]
fn modifiers_or_into_codes() {
    let mut e = emu_with("\x1b[?1000h\x1b[?1006h");
    let ev = MouseEvent::press(1).with(MouseEventFlags::CONTROL | MouseEventFlags::META);
    e.mouse_event(&ev, 0, 0);
    assert_eq!(e.take_replies(), b"\x1b[<24;1;1M");
}

#[test]
fn wheel_presses_encode_high_buttons() {
    let mut e = emu_with("\x1b[?1000h\x1b[?1006h");
    e.mouse_event(&MouseEvent::press(4), 10, 10);
    e.mouse_event(&MouseEvent::press(5), 10, 10);
    assert_eq!(e.take_replies(), b"\x1b[<64;11;11M\x1b[<65;11;11M");
}

#[test]
fn events_outside_the_screen_are_dropped() {
    let mut e = emu_with("\x1b[?1000h\x1b[?1006h");
    e.mouse_event(&MouseEvent::press(1), 80, 0);
    e.mouse_event(&MouseEvent::press(1), 0, 24);
    assert!(e.take_replies().is_empty());
}

#[test]
fn highlight_mode_tracks_but_never_encodes() {
    let mut e = emu_with("\x1b[?1001h");
    e.mouse_event(&MouseEvent::press(1), 0, 0);
    assert!(e.take_replies().is_empty());
}

#[test]
fn disabling_encoding_falls_back_to_legacy() {
    let mut e = emu_with("\x1b[?1000h\x1b[?1006h\x1b[?1006l");
    e.mouse_event(&MouseEvent::press(1), 0, 0);
    assert_eq!(e.take_replies(), b"\x1b[M\x20\x21\x21");
}

#[test]
fn mode_reset_stops_reporting() {
    let mut e = emu_with("\x1b[?1000h\x1b[?1000l");
    e.mouse_event(&MouseEvent::press(1), 0, 0);
    assert!(e.take_replies().is_empty());
}
