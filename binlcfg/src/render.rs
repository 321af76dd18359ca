//! Text rendering for terminal output.

use liblcfg::Lookup;

/// Replace every byte outside printable ASCII with `.`.
pub fn printable(value: &[u8]) -> String {
    value
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}

/// Status word printed for a typed tree lookup.
pub fn lookup_status(lookup: &Lookup<'_>) -> &'static str {
    match lookup {
        Lookup::NotFound => "not-found",
        Lookup::WrongKind(_) => "wrong-type",
        Lookup::Found(_) => "ok",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liblcfg::{build_tree, parse, NodeKind};

    #[test]
    fn test_printable() {
        assert_eq!(printable(b"plain text"), "plain text");
        assert_eq!(printable(b"\0\xff\r\nJ"), "....J");
        assert_eq!(printable("é".as_bytes()), "..");
    }

    #[test]
    fn test_lookup_status() {
        let root = build_tree(&parse(br#"m = { k = "v" }"#).unwrap());
        assert_eq!(lookup_status(&root.get("m", NodeKind::Map)), "ok");
        assert_eq!(lookup_status(&root.get("m", NodeKind::List)), "wrong-type");
        assert_eq!(lookup_status(&root.get("x", NodeKind::Map)), "not-found");
    }
}
