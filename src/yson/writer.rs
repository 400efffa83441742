//! Compact text YSON writer.

use std::fmt::Write;

use crate::yson::{Yson, YsonMap};

/// Render a value as compact text YSON.
pub fn to_string(value: &Yson) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

/// Render a map node without wrapping it in a [`Yson`] first.
pub fn map_to_string(map: &YsonMap) -> String {
    let mut out = String::new();
    write_map(map, &mut out);
    out
}

/// Append one list-fragment item (`<value>;`) followed by a newline.
pub fn write_fragment_item(value: &Yson, out: &mut String) {
    write_value(value, out);
    out.push_str(";\n");
}

fn write_value(value: &Yson, out: &mut String) {
    match value {
        Yson::Entity => out.push('#'),
        Yson::Bool(true) => out.push_str("%true"),
        Yson::Bool(false) => out.push_str("%false"),
        Yson::Int64(v) => {
            let _ = write!(out, "{v}");
        }
        Yson::Uint64(v) => {
            let _ = write!(out, "{v}u");
        }
        Yson::Double(v) => write_double(*v, out),
        Yson::String(s) => write_string(s, out),
        Yson::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Yson::Map(map) => write_map(map, out),
    }
}

fn write_map(map: &YsonMap, out: &mut String) {
    out.push('{');
    for (i, (key, item)) in map.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        write_string(key, out);
        out.push('=');
        write_value(item, out);
    }
    out.push('}');
}

fn write_double(v: f64, out: &mut String) {
    if v.is_nan() {
        out.push_str("%nan");
    } else if v.is_infinite() {
        out.push_str(if v > 0.0 { "%inf" } else { "%-inf" });
    } else {
        // Debug keeps a fractional part or exponent, so the literal reads back as a double.
        let _ = write!(out, "{v:?}");
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for byte in s.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\x{byte:02X}");
            }
        }
    }
    out.push('"');
}
