//! Combo command serialization
//!
//! Two textual renditions of a positioned cursor: the machine-readable
//! payload handed to the compiler dispatch (NUL-separated fields, closed by
//! a second trailing NUL) and a human-readable `fxc.exe` command line for
//! logs and diagnostics.

use crate::cursor::ComboCursor;
use crate::entry::CfgEntry;

/// Machine-readable payload, in field order: `command`, primary source path,
/// shader version, `SHADERCOMBO`, combo number in lowercase hex,
/// `SHADER_MODEL_<VERSION_UPPERCASE>`, `1`, then name and decimal value per
/// axis in slot order. Every field is NUL-terminated and the buffer ends
/// with two consecutive NULs.
pub(crate) fn format_command(entry: &CfgEntry, cursor: &ComboCursor, buffer: &mut Vec<u8>) {
    buffer.clear();
    let info = entry.info();

    push_field(buffer, "command");
    push_field(buffer, &info.shader_file_name);
    push_field(buffer, &info.shader_version);
    push_field(buffer, "SHADERCOMBO");
    push_field(buffer, &format!("{:x}", cursor.combo_num()));
    push_field(
        buffer,
        &format!("SHADER_MODEL_{}", info.shader_version.to_ascii_uppercase()),
    );
    push_field(buffer, "1");

    for (define, value) in entry.generator().defines().iter().zip(cursor.values()) {
        push_field(buffer, define.name());
        push_field(buffer, &value.to_string());
    }

    buffer.push(0);
}

fn push_field(buffer: &mut Vec<u8>, field: &str) {
    buffer.extend_from_slice(field.as_bytes());
    buffer.push(0);
}

/// Human-readable single-line `fxc.exe` command, ending with the primary
/// source path. Each `/D` flag keeps its trailing space.
pub(crate) fn format_command_human_readable(entry: &CfgEntry, cursor: &ComboCursor) -> String {
    let info = entry.info();
    let mut line = format!(
        "fxc.exe /DCENTROIDMASK={} /DSHADERCOMBO={:x} /DSHADER_MODEL_{}=1 /T{} /Emain ",
        info.centroid_mask,
        cursor.combo_num(),
        info.shader_version.to_ascii_uppercase(),
        info.shader_version,
    );
    for (define, value) in entry.generator().defines().iter().zip(cursor.values()) {
        line.push_str(&format!("/D{}={} ", define.name(), value));
    }
    line.push_str(&info.shader_file_name);
    line
}
