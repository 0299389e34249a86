//! Canonical FQN scheme.
//!
//! The upstream parser adapters we have seen mix `.` and `#` freely when
//! stitching together a method's fully-qualified name. Before anything in
//! this crate compares two FQNs, it runs through [`method_fqn`] /
//! [`split_method_fqn`] so every entity key is in one canonical shape:
//! `<type-fqn>#<simpleName>(<comma-separated-param-simple-names>)`.

/// Builds a canonical method FQN from its parts.
pub fn method_fqn(containing_type_fqn: &str, simple_name: &str, param_types: &[String]) -> String {
    format!(
        "{}#{}({})",
        containing_type_fqn,
        simple_name,
        param_types.join(",")
    )
}

/// Splits a canonical method FQN back into `(containing_type_fqn, simple_name, param_types)`.
///
/// Returns `None` if `fqn` is not in the canonical `<type>#<name>(<params>)` shape.
pub fn split_method_fqn(fqn: &str) -> Option<(&str, &str, Vec<&str>)> {
    let hash = fqn.find('#')?;
    let containing_type = &fqn[..hash];
    let rest = &fqn[hash + 1..];
    let open = rest.find('(')?;
    let close = rest.rfind(')')?;
    if close < open {
        return None;
    }
    let simple_name = &rest[..open];
    let params_str = &rest[open + 1..close];
    let params = if params_str.is_empty() {
        Vec::new()
    } else {
        params_str.split(',').map(str::trim).collect()
    };
    Some((containing_type, simple_name, params))
}

/// Normalizes a historical FQN that may use `.` before the method name
/// (e.g. `com.acme.Foo.bar(String)`) into the canonical `#`-separated form.
///
/// Already-canonical FQNs are returned unchanged.
pub fn canonicalize(raw: &str) -> String {
    if raw.contains('#') {
        return raw.to_string();
    }
    let Some(open) = raw.find('(') else {
        return raw.to_string();
    };
    let head = &raw[..open];
    let Some(dot) = head.rfind('.') else {
        return raw.to_string();
    };
    format!("{}#{}", &head[..dot], &raw[dot + 1..])
}

/// Returns the package portion of a dotted type FQN (`""` if the type is in the default package).
pub fn package_of(type_fqn: &str) -> &str {
    match type_fqn.rfind('.') {
        Some(idx) => &type_fqn[..idx],
        None => "",
    }
}

/// Returns the simple (unqualified) name of a dotted type FQN.
pub fn simple_name_of(type_fqn: &str) -> &str {
    match type_fqn.rfind('.') {
        Some(idx) => &type_fqn[idx + 1..],
        None => type_fqn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_canonical_method_fqn() {
        let fqn = method_fqn(
            "com.acme.TxService",
            "txMethod",
            &["String".to_string(), "int".to_string()],
        );
        assert_eq!(fqn, "com.acme.TxService#txMethod(String,int)");
    }

    #[test]
    fn splits_canonical_method_fqn() {
        let (ty, name, params) =
            split_method_fqn("com.acme.TxService#txMethod(String,int)").unwrap();
        assert_eq!(ty, "com.acme.TxService");
        assert_eq!(name, "txMethod");
        assert_eq!(params, vec!["String", "int"]);
    }

    #[test]
    fn splits_zero_arg_method() {
        let (ty, name, params) = split_method_fqn("com.acme.Caller#doTx()").unwrap();
        assert_eq!(ty, "com.acme.Caller");
        assert_eq!(name, "doTx");
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_non_canonical_shape() {
        assert!(split_method_fqn("com.acme.Caller.doTx").is_none());
    }

    #[test]
    fn canonicalizes_dotted_form() {
        assert_eq!(
            canonicalize("com.acme.Caller.doTx(String)"),
            "com.acme.Caller#doTx(String)"
        );
        assert_eq!(
            canonicalize("com.acme.Caller#doTx(String)"),
            "com.acme.Caller#doTx(String)"
        );
    }

    #[test]
    fn package_and_simple_name_extraction() {
        assert_eq!(package_of("com.acme.billing.TxService"), "com.acme.billing");
        assert_eq!(simple_name_of("com.acme.billing.TxService"), "TxService");
        assert_eq!(package_of("TopLevel"), "");
        assert_eq!(simple_name_of("TopLevel"), "TopLevel");
    }
}
