// JDWP wire-level constants
//
// Reference: https://docs.oracle.com/javase/8/docs/platform/jpda/jdwp/jdwp-protocol.html

/// The 14 ASCII bytes exchanged in both directions before anything else.
pub const JDWP_HANDSHAKE: &[u8] = b"JDWP-Handshake";

/// Packet header layout:
///   +0  length (u32, BE) — total packet length including header
///   +4  id     (u32, BE)
///   +8  flags  (u8)       — 0x00 = command, 0x80 = reply
///   +9  command-set/command (command) or error code (reply)
///   +11 payload
pub const REPLY_FLAG: u8 = 0x80;

/// Maximum allowed JDWP packet length, header included.
pub const MAX_PACKET_SIZE: usize = 10 * 1024 * 1024;
