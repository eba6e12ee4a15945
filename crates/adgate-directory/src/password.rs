//! `unicodePwd` wire encoding
//!
//! Active Directory accepts password writes only as the new password
//! wrapped in double quotes and encoded as UTF-16LE, over a confidential
//! connection.

/// Encodes a password for a `unicodePwd` replace.
pub fn encode_password(password: &str) -> Vec<u8> {
    let quoted = format!("\"{password}\"");
    quoted
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}
