//! Subcommand implementations. Each returns the text to print.

use appmenu_variant::{WireType, WireValue, decode, encode, encode_with_schema, parse_text};
use tracing::debug;

use crate::{
    cli::{ConfigArgs, DecodeArgs, EncodeArgs, TypeArgs},
    error::{Error, Result},
};

/// Parse and decode variant text.
pub fn decode_text(args: &DecodeArgs) -> Result<String> {
    let wire = parse_text(&args.text)?;
    debug!(ty = %wire.wire_type(), "parsed");
    let value = decode(&wire);
    if args.json {
        return Ok(serde_json::to_string_pretty(&value)?);
    }
    Ok(format!("{value:#?}"))
}

/// Decode variant text and encode the result again.
pub fn encode_text(args: &EncodeArgs) -> Result<String> {
    let value = decode(&parse_text(&args.text)?);
    let wire = match &args.schema {
        Some(schema) => {
            if !WireType::is_valid(schema) {
                debug!(schema, "schema ignored");
            }
            encode_with_schema(&value, schema)
        }
        None => encode(&value),
    };
    let wire = wire.ok_or_else(|| Error::other("value has no wire encoding"))?;
    Ok(typed(&wire))
}

/// Normalize a type string.
pub fn type_info(args: &TypeArgs) -> Result<String> {
    let ty = WireType::parse(&args.signature)?;
    let mut notes = Vec::new();
    if ty.is_basic() {
        notes.push("basic");
    }
    if !ty.is_definite() {
        notes.push("indefinite");
    }
    if ty == WireType::vardict() {
        notes.push("vardict");
    }
    if notes.is_empty() {
        return Ok(ty.to_string());
    }
    Ok(format!("{ty} ({})", notes.join(", ")))
}

/// Load and render the effective configuration.
pub fn show_config(args: &ConfigArgs) -> Result<String> {
    if args.path {
        let path = args
            .file
            .clone()
            .or_else(appmenu_config::default_config_path);
        return Ok(match path {
            Some(p) => p.display().to_string(),
            None => "(built-in defaults)".to_string(),
        });
    }
    let (config, path) = appmenu_config::load(args.file.as_deref())?;
    let source = match path {
        Some(p) => p.display().to_string(),
        None => "built-in defaults".to_string(),
    };
    Ok(format!("// {source}\n{}", appmenu_config::to_ron(&config)?))
}

/// A wire value prefixed with its type string.
fn typed(wire: &WireValue) -> String {
    format!("{} {wire}", wire.wire_type())
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;

    fn enc(text: &str, schema: Option<&str>) -> String {
        encode_text(&EncodeArgs {
            text: text.into(),
            schema: schema.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn decode_dict_as_json() {
        let out = decode_text(&DecodeArgs {
            text: "{'a': <int32 5>}".into(),
            json: true,
        })
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["type"], "Dict");
        assert_eq!(json["value"]["a"]["type"], "Int32");
        assert_eq!(json["value"]["a"]["value"], 5);
    }

    #[test]
    fn decode_reports_parse_errors() {
        let err = decode_text(&DecodeArgs {
            text: "[1,".into(),
            json: false,
        })
        .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn encode_follows_schema() {
        assert_eq!(enc("[1, 2]", Some("ai")), "ai [1, 2]");
        assert_eq!(enc("[1, 2]", Some("at")), "at [uint64 1, uint64 2]");
        assert_eq!(enc("[1, -2]", Some("au")), "ai [1, -2]");
        assert_eq!(enc("[1, 2]", Some("bogus(")), "ai [1, 2]");
        assert_eq!(enc("('open', 3)", Some("(su)")), "(su) ('open', uint32 3)");
    }

    #[test]
    fn type_notes() {
        let info = |sig: &str| {
            type_info(&TypeArgs {
                signature: sig.into(),
            })
        };
        assert_eq!(info("a{sv}").unwrap(), "a{sv} (vardict)");
        assert_eq!(info("s").unwrap(), "s (basic)");
        assert_eq!(info("(i*)").unwrap(), "(i*) (indefinite)");
        assert_eq!(info("ai").unwrap(), "ai");
        assert!(matches!(info("a{vs}"), Err(Error::Signature(_))));
    }

    #[test]
    fn config_from_explicit_file() {
        let path = env::temp_dir().join(format!("appmenu-probe-{}.ron", process::id()));
        fs::write(&path, "(prefetch_submenus: false)").unwrap();
        let out = show_config(&ConfigArgs {
            file: Some(path.clone()),
            path: false,
        })
        .unwrap();
        fs::remove_file(&path).unwrap();
        assert!(out.starts_with(&format!("// {}", path.display())));
        assert!(out.contains("prefetch_submenus: false"));
    }

    #[test]
    fn config_errors_are_pretty() {
        let err = show_config(&ConfigArgs {
            file: Some("/nonexistent/appmenu.ron".into()),
            path: false,
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("Read error at /nonexistent/appmenu.ron"));
    }
}
