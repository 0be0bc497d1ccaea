// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Terminal presentation of a single record.
//!
//! Scalars print as `key: value`. Lists and mappings print the key alone and
//! then one tab-indented line per element or pair, with mapping keys dimmed.

use std::io::{self, Write};

use colored::Colorize;

use crate::record::{Record, Value};

/// Writes `record` to `out` in field order.
pub fn write_record<W: Write,>(out: &mut W, record: &Record,) -> io::Result<(),>
{
    for (key, value,) in record.iter() {
        match value {
            Value::Scalar(scalar,) => writeln!(out, "{}: {scalar}", key.cyan().bold())?,
            Value::List(items,) => {
                writeln!(out, "{}:", key.cyan().bold())?;
                for item in items {
                    writeln!(out, "\t{item}")?;
                }
            }
            Value::Mapping(mapping,) => {
                writeln!(out, "{}:", key.cyan().bold())?;
                for (name, entry,) in mapping.iter() {
                    writeln!(out, "\t{}: {entry}", name.dimmed())?;
                }
            }
        }
    }
    Ok((),)
}

/// Red one-line message for handled failures.
pub fn write_failure<W: Write,>(out: &mut W, message: &str,) -> io::Result<(),>
{
    writeln!(out, "{}", message.red())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::record::{Mapping, Scalar};

    fn plain(record: &Record,) -> String
    {
        colored::control::set_override(false,);
        let mut out = Vec::new();
        write_record(&mut out, record,).expect("write",);
        String::from_utf8(out,).expect("utf8",)
    }

    #[test]
    fn scalars_print_as_key_value_lines()
    {
        let record = Record::new().with("name", "Hello-World",).with("stars", 80_i64,).with("license", Scalar::Null,);
        assert_eq!(plain(&record), "name: Hello-World\nstars: 80\nlicense: \n");
    }

    #[test]
    fn collections_print_one_indented_line_per_element()
    {
        let languages: Mapping = [("Rust", Scalar::Float(75.5,),), ("C", Scalar::Float(24.5,),)].into_iter().collect();
        let record = Record::new()
            .with("branches", vec![Scalar::from("main"), Scalar::from("dev")],)
            .with("languages", languages,)
            .with("forks", 3_i64,);

        assert_eq!(
            plain(&record),
            "branches:\n\tmain\n\tdev\nlanguages:\n\tRust: 75.5\n\tC: 24.5\nforks: 3\n"
        );
    }

    #[test]
    fn failure_message_is_single_line()
    {
        colored::control::set_override(false,);
        let mut out = Vec::new();
        write_failure(&mut out, "Authorization token incorrect!",).expect("write",);
        assert_eq!(out, b"Authorization token incorrect!\n");
    }
}
