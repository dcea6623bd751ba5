//! Typed-value encoding for attributes and character content.
//!
//! A [`ValueEncoder`] turns a typed value into its lexical XML Schema form.
//! Encoders only produce ASCII that never needs escaping, so sinks can write
//! their output verbatim.

use jiff::Timestamp;
use std::fmt::Write as _;
use zmij::Buffer as ZmijBuffer;

/// Pluggable text-encoding strategy for typed values.
pub trait ValueEncoder {
    /// Appends the lexical form of the value to `out`. Must only append ASCII
    /// characters other than `<`, `&` and `"`.
    fn encode(&self, out: &mut String);

    fn encode_to_string(&self) -> String {
        let mut out = String::new();
        self.encode(&mut out);
        out
    }
}

/// Built-in encoders for the common XML Schema primitive types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedValue<'a> {
    Int(i64),
    UInt(u64),
    /// `xs:double`; non-finite values use `NaN`, `INF` and `-INF`.
    Float(f64),
    Bool(bool),
    /// `xs:hexBinary`, upper-case digits.
    HexBinary(&'a [u8]),
    /// Space separated `xs:int` list.
    IntList(&'a [i64]),
    /// `xs:dateTime` in UTC.
    Timestamp(Timestamp),
}

impl ValueEncoder for TypedValue<'_> {
    fn encode(&self, out: &mut String) {
        match *self {
            TypedValue::Int(v) => out.push_str(itoa::Buffer::new().format(v)),
            TypedValue::UInt(v) => out.push_str(itoa::Buffer::new().format(v)),
            TypedValue::Float(v) => encode_double(v, out),
            TypedValue::Bool(v) => out.push_str(if v { "true" } else { "false" }),
            TypedValue::HexBinary(bytes) => encode_hex_upper(bytes, out),
            TypedValue::IntList(items) => {
                let mut buf = itoa::Buffer::new();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(buf.format(*item));
                }
            }
            TypedValue::Timestamp(ts) => {
                let _ = write!(out, "{}", ts);
            }
        }
    }
}

fn encode_double(value: f64, out: &mut String) {
    if value.is_nan() {
        out.push_str("NaN");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "INF" } else { "-INF" });
    } else {
        out.push_str(ZmijBuffer::new().format(value));
    }
}

fn encode_hex_upper(bytes: &[u8], out: &mut String) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.reserve(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0F) as usize] as char);
    }
}

impl<T: ValueEncoder + ?Sized> ValueEncoder for &T {
    fn encode(&self, out: &mut String) {
        (**self).encode(out)
    }
}
